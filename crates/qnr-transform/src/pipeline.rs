//! Raw-to-cleaned record pipeline.

use std::collections::HashMap;
use std::time::Instant;

use anyhow::{Result, bail};
use qnr_ingest::{CsvTable, is_blank, sentinel_code};
use qnr_model::{CleaningStats, FieldDefinition, FieldType};
use qnr_standards::Plan;
use tracing::{debug, info, info_span, warn};

use crate::dedupe::dedupe_rows;
use crate::multi_select::split_multi_select;
use crate::normalization::{map_label, normalize_datetime, normalize_numeric, split_other};
use crate::recipe::CleaningRecipe;

/// Step names recorded in the cleaning manifest, in execution order.
pub const CLEANING_STEPS: [&str; 8] = [
    "deduplicate",
    "rename_columns",
    "normalize_datetime",
    "normalize_numeric",
    "map_labels",
    "split_other",
    "split_multi_select",
    "trim_text",
];

#[derive(Debug, Clone, PartialEq)]
pub struct CleaningOutcome {
    pub table: CsvTable,
    pub stats: CleaningStats,
}

/// Where an output field takes its value from.
enum Source<'a> {
    Column(usize),
    Specify,
    MultiSelect { column: usize, target: &'a str },
    Absent,
}

struct Cleaner<'a> {
    plan: &'a Plan,
    recipe: &'a CleaningRecipe,
}

/// Clean raw records into the plan's field layout.
///
/// Output columns follow the plan's field order. Values that are blank,
/// unparseable or outside their domain become the field's missing code.
pub fn clean_table(raw: &CsvTable, plan: &Plan, recipe: &CleaningRecipe) -> Result<CleaningOutcome> {
    let span = info_span!("clean", recipe = %recipe.recipe.name, rows = raw.row_count());
    let _guard = span.enter();
    let start = Instant::now();

    let mut stats = CleaningStats {
        input_rows: raw.row_count(),
        ..CleaningStats::default()
    };

    let id_raw = recipe
        .recipe
        .id_column
        .as_deref()
        .and_then(|id| raw_column_for(raw, recipe, id));
    let (deduped, removed) = dedupe_rows(raw, id_raw.as_deref());
    stats.duplicates_removed = removed;
    debug!(removed, "deduplicated rows");

    let mut by_target: HashMap<String, usize> = HashMap::new();
    for (idx, header) in deduped.headers.iter().enumerate() {
        by_target
            .entry(recipe.target_name(header).to_lowercase())
            .or_insert(idx);
    }

    let sources = resolve_sources(plan, recipe, &deduped, &by_target)?;
    let cleaner = Cleaner { plan, recipe };

    let headers = plan.fields.iter().map(|field| field.name.clone()).collect();
    let mut table = CsvTable::new(headers);
    for row in &deduped.rows {
        let cells = cleaner.clean_row(row, &sources, &mut stats);
        table.push_row(cells);
    }
    stats.output_rows = table.row_count();

    info!(
        input_rows = stats.input_rows,
        output_rows = stats.output_rows,
        duplicates_removed = stats.duplicates_removed,
        recoded = stats.total_recoded(),
        duration_ms = start.elapsed().as_millis(),
        "cleaning complete"
    );
    Ok(CleaningOutcome { table, stats })
}

fn raw_column_for(raw: &CsvTable, recipe: &CleaningRecipe, name: &str) -> Option<String> {
    raw.headers
        .iter()
        .find(|header| {
            header.eq_ignore_ascii_case(name) || recipe.target_name(header).eq_ignore_ascii_case(name)
        })
        .cloned()
}

fn resolve_sources<'a>(
    plan: &Plan,
    recipe: &'a CleaningRecipe,
    raw: &CsvTable,
    by_target: &HashMap<String, usize>,
) -> Result<Vec<Source<'a>>> {
    let multi_column = match &recipe.multi_select {
        Some(multi) => match by_target
            .get(&multi.source.to_lowercase())
            .copied()
            .or_else(|| raw.column_index(&multi.source))
        {
            Some(idx) => Some(idx),
            None => bail!("multi-select source column `{}` not found", multi.source),
        },
        None => None,
    };

    let mut sources = Vec::with_capacity(plan.fields.len());
    for field in &plan.fields {
        let name = field.name.as_str();
        let specify = recipe
            .other
            .as_ref()
            .is_some_and(|other| other.specify_field.eq_ignore_ascii_case(name));
        let option = recipe.multi_select.as_ref().and_then(|multi| {
            multi
                .options
                .values()
                .find(|target| target.eq_ignore_ascii_case(name))
        });
        let source = if specify {
            Source::Specify
        } else if let (Some(target), Some(column)) = (option, multi_column) {
            Source::MultiSelect {
                column,
                target: target.as_str(),
            }
        } else if let Some(idx) = by_target.get(&name.to_lowercase()) {
            Source::Column(*idx)
        } else {
            warn!(field = %name, "no raw column for field, filling with missing code");
            Source::Absent
        };
        sources.push(source);
    }
    Ok(sources)
}

impl Cleaner<'_> {
    fn missing_code(&self, field: &FieldDefinition) -> String {
        field
            .missing_code
            .unwrap_or(self.plan.default_missing_code)
            .to_string()
    }

    fn clean_row(&self, row: &[String], sources: &[Source<'_>], stats: &mut CleaningStats) -> Vec<String> {
        let mut cells = Vec::with_capacity(sources.len());
        let mut specify_text: Option<String> = None;
        let mut specify_slot: Option<usize> = None;

        for (position, (field, source)) in self.plan.fields.iter().zip(sources).enumerate() {
            let cell = match source {
                Source::Specify => {
                    specify_slot = Some(position);
                    String::new()
                }
                Source::Absent => {
                    stats.record_missing(&field.name);
                    self.missing_code(field)
                }
                Source::MultiSelect { column, target } => {
                    let value = row.get(*column).map(String::as_str).unwrap_or("");
                    match self
                        .recipe
                        .multi_select
                        .as_ref()
                        .and_then(|multi| split_multi_select(value, multi))
                    {
                        Some(selected) if selected.contains(target) => "1".to_string(),
                        Some(_) => "0".to_string(),
                        None => {
                            stats.record_missing(&field.name);
                            self.missing_code(field)
                        }
                    }
                }
                Source::Column(idx) => {
                    let value = row.get(*idx).map(String::as_str).unwrap_or("");
                    match self.clean_value(value, field, &mut specify_text) {
                        Some(cleaned) => cleaned,
                        None => {
                            stats.record_missing(&field.name);
                            self.missing_code(field)
                        }
                    }
                }
            };
            cells.push(cell);
        }

        if let Some(slot) = specify_slot {
            let field = &self.plan.fields[slot];
            cells[slot] = match specify_text {
                Some(text) if !text.is_empty() => text,
                _ => self.missing_code(field),
            };
        }
        cells
    }

    /// Clean one cell. None means the value is replaced by the missing code.
    fn clean_value(
        &self,
        value: &str,
        field: &FieldDefinition,
        specify_text: &mut Option<String>,
    ) -> Option<String> {
        if field.field_type.is_textual() {
            return Some(if is_blank(value) {
                String::new()
            } else {
                value.trim().to_string()
            });
        }
        if is_blank(value) {
            return None;
        }
        if let Some(code) = sentinel_code(value) {
            return Some(code.to_string());
        }

        if let Some(other) = &self.recipe.other
            && other.field.eq_ignore_ascii_case(&field.name)
            && let Some(text) = split_other(value, &other.prefixes)
        {
            *specify_text = Some(text.to_string());
            return Some(other.code.to_string());
        }
        if let Some(labels) = self.recipe.labels_for(&field.name) {
            return map_label(value, labels, field).map(|code| code.to_string());
        }

        match field.field_type {
            FieldType::Datetime => normalize_datetime(
                value,
                &self.recipe.recipe.datetime_formats,
                &self.recipe.recipe.output_datetime_format,
            ),
            _ => normalize_numeric(value, field),
        }
    }
}
