//! Column-level statistics used for manifests and reports.

use std::collections::BTreeSet;

use crate::csv_table::CsvTable;
use crate::missing::is_missing_value;
use crate::polars_utils::parse_f64;

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnProfile {
    pub name: String,
    pub missing: usize,
    pub distinct: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
}

impl ColumnProfile {
    pub fn completeness(&self, rows: usize) -> f64 {
        if rows == 0 {
            1.0
        } else {
            (rows.saturating_sub(self.missing)) as f64 / rows as f64
        }
    }
}

/// Profile every column; sentinels and blanks count as missing and are
/// excluded from numeric summaries.
pub fn profile_columns(table: &CsvTable) -> Vec<ColumnProfile> {
    let mut profiles = Vec::with_capacity(table.headers.len());
    for (col_idx, header) in table.headers.iter().enumerate() {
        let mut missing = 0usize;
        let mut uniques = BTreeSet::new();
        let mut numbers = Vec::new();
        let mut all_numeric = true;
        for row in &table.rows {
            let value = row.get(col_idx).map(String::as_str).unwrap_or("");
            if is_missing_value(value) {
                missing += 1;
                continue;
            }
            uniques.insert(value.trim().to_string());
            match parse_f64(value) {
                Some(number) => numbers.push(number),
                None => all_numeric = false,
            }
        }
        let numeric = all_numeric && !numbers.is_empty();
        let (min, max, mean) = if numeric {
            let min = numbers.iter().copied().fold(f64::INFINITY, f64::min);
            let max = numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let mean = numbers.iter().sum::<f64>() / numbers.len() as f64;
            (Some(min), Some(max), Some(mean))
        } else {
            (None, None, None)
        };
        profiles.push(ColumnProfile {
            name: header.clone(),
            missing,
            distinct: uniques.len(),
            min,
            max,
            mean,
        });
    }
    profiles
}
