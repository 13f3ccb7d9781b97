//! Multi-choice answer splitting.

use qnr_ingest::is_blank;

use crate::recipe::MultiSelectSpec;

/// Output columns selected by a multi-choice answer.
///
/// Returns None for a blank answer. A none-label selects nothing and
/// unknown options are ignored.
pub fn split_multi_select<'a>(value: &str, spec: &'a MultiSelectSpec) -> Option<Vec<&'a str>> {
    if is_blank(value) {
        return None;
    }
    let mut tokens = vec![value.to_string()];
    for separator in &spec.separators {
        tokens = tokens
            .iter()
            .flat_map(|token| token.split(separator.as_str()))
            .map(str::to_string)
            .collect();
    }

    let mut selected = Vec::new();
    for token in tokens.iter().map(|token| token.trim()) {
        if token.is_empty()
            || spec
                .none_labels
                .iter()
                .any(|label| label.eq_ignore_ascii_case(token))
        {
            continue;
        }
        let column = spec
            .options
            .iter()
            .find(|(label, _)| label.eq_ignore_ascii_case(token))
            .map(|(_, column)| column.as_str());
        if let Some(column) = column
            && !selected.contains(&column)
        {
            selected.push(column);
        }
    }
    Some(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn spec() -> MultiSelectSpec {
        MultiSelectSpec {
            source: "benefits".to_string(),
            separators: [";", ",", "/", "|"].iter().map(|s| s.to_string()).collect(),
            none_labels: vec!["none".to_string()],
            options: BTreeMap::from([
                ("insurance".to_string(), "benefit_insurance".to_string()),
                ("vacation".to_string(), "benefit_vacation".to_string()),
                ("medical".to_string(), "benefit_medical".to_string()),
            ]),
        }
    }

    #[test]
    fn splits_on_any_separator() {
        let spec = spec();
        assert_eq!(
            split_multi_select("Insurance;Vacation", &spec),
            Some(vec!["benefit_insurance", "benefit_vacation"])
        );
        assert_eq!(
            split_multi_select("Insurance/Medical", &spec),
            Some(vec!["benefit_insurance", "benefit_medical"])
        );
        assert_eq!(
            split_multi_select("medical, medical | gym", &spec),
            Some(vec!["benefit_medical"])
        );
    }

    #[test]
    fn none_and_blank_differ() {
        let spec = spec();
        assert_eq!(split_multi_select("None", &spec), Some(vec![]));
        assert_eq!(split_multi_select("  ", &spec), None);
    }
}
