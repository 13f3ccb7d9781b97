//! Removal of repeated submissions.

use std::collections::HashSet;

use qnr_ingest::{CsvTable, is_blank};

/// Drop fully duplicated rows and rows repeating an already-seen id.
///
/// The first occurrence wins. Returns the kept rows and the number removed.
pub fn dedupe_rows(table: &CsvTable, id_column: Option<&str>) -> (CsvTable, usize) {
    let id_index = id_column.and_then(|name| table.column_index(name));
    let mut seen_rows: HashSet<&[String]> = HashSet::new();
    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut kept = CsvTable::new(table.headers.clone());
    let mut removed = 0;

    for row in &table.rows {
        let id = id_index
            .and_then(|idx| row.get(idx))
            .map(|value| value.trim())
            .filter(|value| !is_blank(value));
        let repeated_id = id.is_some_and(|id| seen_ids.contains(id));
        if repeated_id || !seen_rows.insert(row.as_slice()) {
            removed += 1;
            continue;
        }
        if let Some(id) = id {
            seen_ids.insert(id.to_string());
        }
        kept.rows.push(row.clone());
    }
    (kept, removed)
}
