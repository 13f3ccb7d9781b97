//! Missing-value sentinels.
//!
//! Numeric questionnaire columns never hold blanks once cleaned; absent
//! answers are written as a reserved code instead.

use crate::polars_utils::parse_f64;

/// Missing or invalid answer.
pub const MISSING_CODE: i64 = -99;

/// Question not applicable to the respondent (skip logic).
pub const NOT_APPLICABLE_CODE: i64 = -88;

pub const KNOWN_SENTINELS: [i64; 2] = [MISSING_CODE, NOT_APPLICABLE_CODE];

/// Returns true for empty cells and the textual NaN spellings that spreadsheet
/// exports produce.
pub fn is_blank(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("nan")
        || trimmed.eq_ignore_ascii_case("na")
        || trimmed.eq_ignore_ascii_case("null")
}

/// Returns the sentinel the value encodes, if any (`-99`, `-99.0`, ...).
pub fn sentinel_code(value: &str) -> Option<i64> {
    let number = parse_f64(value)?;
    KNOWN_SENTINELS
        .iter()
        .copied()
        .find(|code| *code as f64 == number)
}

/// Returns true if the value is blank or a known sentinel.
pub fn is_missing_value(value: &str) -> bool {
    is_blank(value) || sentinel_code(value).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_sentinels() {
        assert_eq!(sentinel_code("-99"), Some(-99));
        assert_eq!(sentinel_code(" -88.0 "), Some(-88));
        assert_eq!(sentinel_code("-98"), None);
        assert_eq!(sentinel_code("abc"), None);
    }

    #[test]
    fn blanks_include_nan_spellings() {
        assert!(is_blank(""));
        assert!(is_blank("  "));
        assert!(is_blank("NaN"));
        assert!(is_blank("null"));
        assert!(!is_blank("0"));
        assert!(is_missing_value("-99"));
        assert!(!is_missing_value("Legal"));
    }
}
