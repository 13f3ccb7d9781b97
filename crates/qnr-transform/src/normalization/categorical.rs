//! Label-to-code mapping for single-choice answers.

use qnr_ingest::parse_i64;
use qnr_model::FieldDefinition;

use crate::recipe::LabelMap;

/// Code for a single-choice answer: a known label, or a numeric code already
/// inside the field's domain.
pub fn map_label(value: &str, labels: &LabelMap, field: &FieldDefinition) -> Option<i64> {
    if let Some(code) = labels.lookup(value) {
        return Some(code);
    }
    let code = parse_i64(value)?;
    field
        .effective_domain()
        .contains(code as f64)
        .then_some(code)
}

/// If `value` is an "other" answer (`Other: Legal`, `Other - Legal`,
/// `Other (Legal)`, `Other`), returns the specified text, possibly empty.
pub fn split_other<'a>(value: &'a str, prefixes: &[String]) -> Option<&'a str> {
    let trimmed = value.trim();
    prefixes.iter().find_map(|prefix| {
        let head = trimmed.get(..prefix.len())?;
        if !head.eq_ignore_ascii_case(prefix) {
            return None;
        }
        let rest = &trimmed[prefix.len()..];
        if rest.starts_with(|c: char| c.is_alphanumeric()) {
            return None;
        }
        let text = rest
            .trim_start_matches(|c: char| c.is_whitespace() || matches!(c, ':' | '-' | '–' | '(' | '='))
            .trim_end_matches(|c: char| c.is_whitespace() || c == ')');
        Some(text)
    })
}
