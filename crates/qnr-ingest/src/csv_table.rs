use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use csv::{ReaderBuilder, WriterBuilder};
use tracing::debug;

/// A CSV file held as trimmed strings, header first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|header| header.eq_ignore_ascii_case(name))
    }

    /// Values of one column, or None if the column is absent.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(idx).map(String::as_str).unwrap_or(""))
                .collect(),
        )
    }

    pub fn value(&self, row: usize, name: &str) -> Option<&str> {
        let idx = self.column_index(name)?;
        self.rows.get(row)?.get(idx).map(String::as_str)
    }

    /// Appends a row, padding or truncating it to the header width.
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }
}

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    normalized
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

pub fn read_csv_table(path: &Path) -> Result<CsvTable> {
    let file = std::fs::File::open(path).with_context(|| format!("read csv: {}", path.display()))?;
    let table = read_csv_table_from_reader(file)
        .with_context(|| format!("parse csv: {}", path.display()))?;
    debug!(
        path = %path.display(),
        rows = table.row_count(),
        columns = table.headers.len(),
        "loaded csv table"
    );
    Ok(table)
}

/// Parses CSV from any reader. The first non-blank record is the header;
/// fully blank records are skipped. Short records are padded; values past the
/// last header column are an error unless blank.
pub fn read_csv_table_from_reader<R: Read>(reader: R) -> Result<CsvTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut headers: Option<Vec<String>> = None;
    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("read record {}", idx + 1))?;
        if record.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        match &headers {
            None => headers = Some(record.iter().map(normalize_header).collect()),
            Some(header_row) => {
                let mut row: Vec<String> = record.iter().map(normalize_cell).collect();
                if row.iter().skip(header_row.len()).any(|value| !value.is_empty()) {
                    bail!(
                        "record {} has {} values but the header has {} columns",
                        idx + 1,
                        row.len(),
                        header_row.len()
                    );
                }
                row.resize(header_row.len(), String::new());
                rows.push(row);
            }
        }
    }
    let headers = headers.unwrap_or_default();
    if let Some(duplicate) = first_duplicate(&headers) {
        bail!("duplicate column header: {duplicate}");
    }
    Ok(CsvTable { headers, rows })
}

fn first_duplicate(headers: &[String]) -> Option<&str> {
    for (idx, header) in headers.iter().enumerate() {
        if headers[..idx]
            .iter()
            .any(|other| other.eq_ignore_ascii_case(header))
        {
            return Some(header.as_str());
        }
    }
    None
}

pub fn write_csv_table(path: &Path, table: &CsvTable) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create directory: {}", parent.display()))?;
    }
    let mut writer = WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("write csv: {}", path.display()))?;
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer
        .flush()
        .with_context(|| format!("flush csv: {}", path.display()))?;
    debug!(path = %path.display(), rows = table.row_count(), "wrote csv table");
    Ok(())
}
