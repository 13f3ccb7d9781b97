//! Cell conversions shared by the table and frame readers.
//!
//! The inspector reads every cell through its string form so that frames
//! built from typed CSV readers and frames of raw strings behave the same.

use polars::prelude::{AnyValue, DataFrame};

/// Converts a Polars AnyValue to a String representation.
/// Returns empty string for Null, properly formats numeric types.
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int8(v) => v.to_string(),
        AnyValue::Int16(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt8(v) => v.to_string(),
        AnyValue::UInt16(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Boolean(b) => if b { "1" } else { "0" }.to_string(),
        other => other.to_string(),
    }
}

/// Formats a floating-point number as a string without trailing zeros.
pub fn format_numeric(v: f64) -> String {
    if v.is_nan() {
        return "NaN".to_string();
    }
    let s = format!("{v}");
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}

/// Parses a string as f64, returning None for invalid, empty, or NaN strings.
pub fn parse_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses a string as i64. Accepts integral decimals such as `3.0`.
pub fn parse_i64(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(v) = trimmed.parse::<i64>() {
        return Some(v);
    }
    let v = parse_f64(trimmed)?;
    if v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
        Some(v as i64)
    } else {
        None
    }
}

/// Reads a column as strings, one per row. Returns None if the column is absent.
pub fn column_strings(df: &DataFrame, name: &str) -> Option<Vec<String>> {
    let column = df.column(name).ok()?;
    let values = (0..df.height())
        .map(|idx| any_to_string(column.get(idx).unwrap_or(AnyValue::Null)))
        .collect();
    Some(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_without_trailing_zeros() {
        assert_eq!(format_numeric(-99.0), "-99");
        assert_eq!(format_numeric(2.50), "2.5");
        assert_eq!(format_numeric(40.0), "40");
        assert_eq!(format_numeric(f64::NAN), "NaN");
    }

    #[test]
    fn parse_i64_accepts_integral_floats() {
        assert_eq!(parse_i64("3"), Some(3));
        assert_eq!(parse_i64("3.0"), Some(3));
        assert_eq!(parse_i64("3.5"), None);
        assert_eq!(parse_i64("abc"), None);
        assert_eq!(parse_f64("NaN"), None);
    }
}
