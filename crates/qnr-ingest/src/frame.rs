//! DataFrame construction from CSV tables.

use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::{Column, DataFrame, NamedFrom, Series};

use crate::csv_table::{CsvTable, read_csv_table};

/// Build a DataFrame with one String column per CSV header.
///
/// Values keep their textual form; typing happens in the checks that read them.
pub fn table_to_frame(table: &CsvTable) -> Result<DataFrame> {
    let mut columns: Vec<Column> = Vec::with_capacity(table.headers.len());
    for (idx, header) in table.headers.iter().enumerate() {
        let values: Vec<String> = table
            .rows
            .iter()
            .map(|row| row.get(idx).cloned().unwrap_or_default())
            .collect();
        columns.push(Series::new(header.as_str().into(), values).into());
    }
    let data = DataFrame::new(columns).context("build dataframe from csv table")?;
    Ok(data)
}

pub fn read_csv_frame(path: &Path) -> Result<DataFrame> {
    let table = read_csv_table(path)?;
    table_to_frame(&table).with_context(|| format!("frame for {}", path.display()))
}
