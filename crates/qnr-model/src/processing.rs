use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Counters collected while cleaning raw records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleaningStats {
    pub input_rows: usize,
    pub output_rows: usize,
    pub duplicates_removed: usize,
    /// Per output field: values replaced by the missing code.
    pub missing_recoded: BTreeMap<String, usize>,
}

impl CleaningStats {
    pub fn record_missing(&mut self, field: &str) {
        *self.missing_recoded.entry(field.to_string()).or_insert(0) += 1;
    }

    pub fn missing_for(&self, field: &str) -> usize {
        self.missing_recoded.get(field).copied().unwrap_or(0)
    }

    pub fn total_recoded(&self) -> usize {
        self.missing_recoded.values().sum()
    }
}
