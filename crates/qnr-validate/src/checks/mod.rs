//! Inspection passes.
//!
//! Each module implements one pass over a cleaned dataset.

pub mod business_rules;
pub mod data_quality;
pub mod schema_compliance;

use std::collections::HashMap;

use polars::prelude::DataFrame;
use qnr_ingest::{column_strings, is_missing_value, parse_i64};
use qnr_model::{FieldDefinition, Issue, Severity};

use crate::util::CaseInsensitiveSet;

/// Offending rows and values kept per issue.
const MAX_SAMPLES: usize = 5;

/// String view of a frame with case-insensitive column lookup.
pub struct FrameView {
    lookup: CaseInsensitiveSet,
    columns: Vec<String>,
    values: HashMap<String, Vec<String>>,
    height: usize,
}

impl FrameView {
    pub fn new(df: &DataFrame) -> Self {
        let columns: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        let values = columns
            .iter()
            .filter_map(|name| column_strings(df, name).map(|values| (name.clone(), values)))
            .collect();
        Self {
            lookup: CaseInsensitiveSet::from_names(&columns),
            columns,
            values,
            height: df.height(),
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has(&self, name: &str) -> bool {
        self.lookup.contains(name)
    }

    /// Values of a column, looked up case-insensitively.
    pub fn column(&self, name: &str) -> Option<&[String]> {
        let original = self.lookup.get(name)?;
        self.values.get(original).map(Vec::as_slice)
    }

    /// Cells of one row in column order.
    pub fn row(&self, idx: usize) -> Vec<&str> {
        self.columns
            .iter()
            .map(|name| {
                self.values
                    .get(name)
                    .and_then(|values| values.get(idx))
                    .map(String::as_str)
                    .unwrap_or("")
            })
            .collect()
    }
}

/// Returns true if the value is blank, a known sentinel, or the field's own missing code.
pub fn is_missing_for(field: &FieldDefinition, value: &str) -> bool {
    is_missing_value(value)
        || field
            .missing_code
            .is_some_and(|code| parse_i64(value) == Some(code))
}

/// Offending rows collected for one aggregated issue.
#[derive(Debug, Default)]
pub struct Findings {
    count: u64,
    rows: Vec<usize>,
    samples: Vec<String>,
}

impl Findings {
    pub fn record(&mut self, row: usize, sample: impl Into<String>) {
        self.count += 1;
        if self.rows.len() < MAX_SAMPLES {
            self.rows.push(row);
            self.samples.push(sample.into());
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Build the issue, or None if nothing was recorded.
    pub fn into_issue(
        self,
        code: &str,
        severity: Severity,
        field: Option<&str>,
        message: impl Into<String>,
    ) -> Option<Issue> {
        if self.is_empty() {
            return None;
        }
        let mut message = message.into();
        let samples: Vec<&str> = self
            .samples
            .iter()
            .map(String::as_str)
            .filter(|sample| !sample.is_empty())
            .collect();
        if !samples.is_empty() {
            message.push_str(&format!(" (examples: {})", samples.join(", ")));
        }
        let mut issue = Issue::new(code, severity, message)
            .with_count(self.count)
            .with_rows(self.rows);
        if let Some(field) = field {
            issue = issue.with_field(field);
        }
        Some(issue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn findings_cap_samples() {
        let mut findings = Findings::default();
        for row in 0..8 {
            findings.record(row, format!("v{row}"));
        }
        let issue = findings
            .into_issue("SC004", Severity::Error, Some("age"), "8 values out of range")
            .expect("issue");
        assert_eq!(issue.count, Some(8));
        assert_eq!(issue.rows, vec![0, 1, 2, 3, 4]);
        assert!(issue.message.ends_with("(examples: v0, v1, v2, v3, v4)"));
        assert!(Findings::default()
            .into_issue("SC004", Severity::Error, None, "none")
            .is_none());
    }
}
