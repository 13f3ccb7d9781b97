//! Timestamp normalization.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Parse a timestamp with the first matching format.
///
/// Date-only formats yield midnight.
pub fn parse_datetime(value: &str, formats: &[String]) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    formats.iter().find_map(|format| {
        NaiveDateTime::parse_from_str(trimmed, format)
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(trimmed, format)
                    .ok()
                    .map(|date| date.and_time(NaiveTime::MIN))
            })
    })
}

/// Reformat a timestamp into `output`, or None if no input format matches.
pub fn normalize_datetime(value: &str, formats: &[String], output: &str) -> Option<String> {
    parse_datetime(value, formats).map(|dt| dt.format(output).to_string())
}
