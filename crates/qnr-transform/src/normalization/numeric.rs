//! Numeric normalization.

use qnr_ingest::{format_numeric, parse_f64};
use qnr_model::{FieldDefinition, FieldType};

/// Normalize a numeric answer for `field`.
///
/// Integer-like types are rounded; the result must fall inside the field's
/// domain. Returns None when the value must be replaced by the missing code,
/// including non-finite values and integers outside the `i64` range.
pub fn normalize_numeric(value: &str, field: &FieldDefinition) -> Option<String> {
    let number = parse_f64(value)?;
    let number = match field.field_type {
        FieldType::Float => number,
        _ => number.round(),
    };
    if !field.effective_domain().contains(number) {
        return None;
    }
    match field.field_type {
        FieldType::Float => Some(format_numeric(number)),
        _ => to_i64(number).map(|integer| integer.to_string()),
    }
}

/// Exact conversion of an already rounded value; `i64::MAX as f64` is 2^63,
/// one past the largest `i64`.
fn to_i64(number: f64) -> Option<i64> {
    ((i64::MIN as f64)..(i64::MAX as f64))
        .contains(&number)
        .then(|| number as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qnr_model::ValueDomain;

    #[test]
    fn integers_are_rounded_and_range_checked() {
        let age = FieldDefinition::new("age", FieldType::Integer)
            .with_domain(ValueDomain::range(18.0, 70.0));
        assert_eq!(normalize_numeric("34", &age).as_deref(), Some("34"));
        assert_eq!(normalize_numeric("34.0", &age).as_deref(), Some("34"));
        assert_eq!(normalize_numeric("150", &age), None);
        assert_eq!(normalize_numeric("17", &age), None);
        assert_eq!(normalize_numeric("abc", &age), None);
    }

    #[test]
    fn floats_keep_fractions() {
        let tenure = FieldDefinition::new("tenure_years", FieldType::Float)
            .with_domain(ValueDomain::range(0.0, 50.0));
        assert_eq!(normalize_numeric("2.5", &tenure).as_deref(), Some("2.5"));
        assert_eq!(normalize_numeric("20", &tenure).as_deref(), Some("20"));
        assert_eq!(normalize_numeric("-1", &tenure), None);
    }

    #[test]
    fn integers_outside_i64_become_missing() {
        let count = FieldDefinition::new("count", FieldType::Integer);
        assert_eq!(normalize_numeric("1e20", &count), None);
        assert_eq!(normalize_numeric("-1e20", &count), None);
        assert_eq!(normalize_numeric("inf", &count), None);
        assert_eq!(normalize_numeric("NaN", &count), None);
        assert_eq!(normalize_numeric("1e15", &count).as_deref(), Some("1000000000000000"));
    }

    #[test]
    fn binary_accepts_only_zero_and_one() {
        let flag = FieldDefinition::new("benefit_medical", FieldType::Binary);
        assert_eq!(normalize_numeric("1", &flag).as_deref(), Some("1"));
        assert_eq!(normalize_numeric("2", &flag), None);
    }
}
