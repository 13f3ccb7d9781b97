//! Markdown cleaning report.

use qnr_ingest::{CsvTable, format_numeric, profile_columns};
use qnr_model::{CleaningStats, InspectionReport};
use qnr_standards::{Layout, PackageSettings, Plan};
use qnr_transform::{CLEANING_STEPS, CleaningRecipe};

/// Everything the report describes. Paths are taken from `layout`.
#[derive(Debug, Clone, Copy)]
pub struct ReportInput<'a> {
    pub package: &'a PackageSettings,
    pub created_at: &'a str,
    pub layout: &'a Layout,
    pub plan: &'a Plan,
    pub recipe: &'a CleaningRecipe,
    pub stats: &'a CleaningStats,
    pub table: &'a CsvTable,
    pub inspection: &'a InspectionReport,
}

struct Markdown {
    lines: Vec<String>,
}

impl Markdown {
    fn line(&mut self, text: impl Into<String>) {
        self.lines.push(text.into());
    }

    fn blank(&mut self) {
        self.lines.push(String::new());
    }

    fn heading(&mut self, text: &str) {
        self.line(format!("## {text}"));
        self.blank();
    }

    fn table(&mut self, headers: &[&str], rows: Vec<Vec<String>>) {
        self.line(format!("| {} |", headers.join(" | ")));
        let rule: Vec<String> = headers.iter().map(|h| "-".repeat(h.len() + 2)).collect();
        self.line(format!("|{}|", rule.join("|")));
        for row in rows {
            let cells: Vec<String> = row.iter().map(String::as_str).map(escape).collect();
            self.line(format!("| {} |", cells.join(" | ")));
        }
        self.blank();
    }
}

fn escape(cell: &str) -> String {
    if cell.is_empty() {
        "-".to_string()
    } else {
        cell.replace('|', "\\|")
    }
}

pub fn render_cleaning_report(input: &ReportInput<'_>) -> String {
    let mut md = Markdown { lines: Vec::new() };
    let title = input.plan.title.as_deref().unwrap_or("Questionnaire");
    md.line(format!("# Cleaning Report: {title}"));
    md.blank();
    md.line(format!(
        "Package `{}` version {}, generated {}.",
        input.package.name, input.package.version, input.created_at
    ));
    md.blank();

    overview(&mut md, input);
    data_overview(&mut md, input);
    field_definitions(&mut md, input);
    transformations(&mut md, input);
    missing_values(&mut md, input);
    statistics(&mut md, input);
    quality_checks(&mut md, input);
    deliverables(&mut md, input);

    while md.lines.last().is_some_and(String::is_empty) {
        md.lines.pop();
    }
    let mut text = md.lines.join("\n");
    text.push('\n');
    text
}

fn overview(md: &mut Markdown, input: &ReportInput<'_>) {
    md.heading("Overview");
    md.line(format!(
        "Raw questionnaire records (`{}`) were cleaned with recipe `{}` {} into `{}`.",
        input.layout.raw_records,
        input.recipe.recipe.name,
        input.recipe.recipe.version,
        input.layout.cleaned_records
    ));
    md.line(format!(
        "Overall inspection status: **{}**.",
        input.inspection.overall_status()
    ));
    md.blank();
}

fn data_overview(md: &mut Markdown, input: &ReportInput<'_>) {
    md.heading("Data Overview");
    let stats = input.stats;
    md.table(
        &["Measure", "Value"],
        vec![
            vec!["Input rows".into(), stats.input_rows.to_string()],
            vec!["Duplicates removed".into(), stats.duplicates_removed.to_string()],
            vec!["Output rows".into(), stats.output_rows.to_string()],
            vec!["Fields".into(), input.plan.fields.len().to_string()],
            vec!["Business rules".into(), input.plan.rules.len().to_string()],
        ],
    );
}

fn field_definitions(md: &mut Markdown, input: &ReportInput<'_>) {
    md.heading("Field Definitions");
    let rows = input
        .plan
        .fields
        .iter()
        .map(|field| {
            vec![
                field.name.clone(),
                field.field_type.to_string(),
                field.effective_domain().to_string(),
                field
                    .missing_code
                    .map_or_else(|| "required".to_string(), |code| code.to_string()),
                field.description.clone().unwrap_or_default(),
            ]
        })
        .collect();
    md.table(
        &["Field name", "Type", "Allowed values", "Missing code", "Description"],
        rows,
    );
}

fn transformations(md: &mut Markdown, input: &ReportInput<'_>) {
    md.heading("Data Transformations");
    let rows = input
        .recipe
        .transformations()
        .into_iter()
        .map(|transformation| {
            let mapping: Vec<String> = transformation
                .mapping
                .iter()
                .map(|(from, to)| format!("{from} -> {to}"))
                .collect();
            vec![
                transformation.name,
                transformation.source.unwrap_or_default(),
                transformation.targets.join(", "),
                mapping.join("; "),
            ]
        })
        .collect();
    md.table(&["Transformation", "Source", "Targets", "Mapping"], rows);
    md.line(format!("Steps, in order: {}.", CLEANING_STEPS.join(", ")));
    md.blank();
}

fn missing_values(md: &mut Markdown, input: &ReportInput<'_>) {
    md.heading("Missing Values");
    md.line(format!(
        "Absent or invalid answers are coded {}; a blank free-text answer stays blank.",
        input.plan.default_missing_code
    ));
    md.blank();
    let profiles = profile_columns(input.table);
    let rows = input
        .plan
        .fields
        .iter()
        .map(|field| {
            let in_output = profiles
                .iter()
                .find(|profile| profile.name == field.name)
                .map_or(0, |profile| profile.missing);
            vec![
                field.name.clone(),
                field
                    .missing_code
                    .map_or_else(|| "required".to_string(), |code| code.to_string()),
                input.stats.missing_for(&field.name).to_string(),
                in_output.to_string(),
            ]
        })
        .collect();
    md.table(
        &["Field", "Missing code", "Recoded in cleaning", "Missing in output"],
        rows,
    );
}

fn statistics(md: &mut Markdown, input: &ReportInput<'_>) {
    md.heading("Statistics");
    let rows = input.table.row_count();
    let numeric: Vec<Vec<String>> = profile_columns(input.table)
        .into_iter()
        .filter(|profile| {
            input
                .plan
                .field(&profile.name)
                .is_some_and(|field| field.field_type.is_numeric())
        })
        .filter_map(|profile| {
            let (min, max, mean) = (profile.min?, profile.max?, profile.mean?);
            Some(vec![
                profile.name.clone(),
                rows.saturating_sub(profile.missing).to_string(),
                format_numeric(min),
                format_numeric(max),
                format!("{mean:.2}"),
            ])
        })
        .collect();
    md.table(&["Field", "Present", "Min", "Max", "Mean"], numeric);
}

fn quality_checks(md: &mut Markdown, input: &ReportInput<'_>) {
    md.heading("Quality Checks");
    let rows = input
        .inspection
        .results()
        .iter()
        .map(|result| {
            vec![
                result.check.label().to_string(),
                result.status.to_string(),
                result.error_count().to_string(),
                result.warning_count().to_string(),
            ]
        })
        .collect();
    md.table(&["Check", "Status", "Errors", "Warnings"], rows);
    if let Some(score) = input.inspection.data_quality.quality_score {
        md.line(format!("Quality score: {score:.2}"));
        md.blank();
    }
    let issues: Vec<String> = input
        .inspection
        .results()
        .iter()
        .flat_map(|result| result.issues.iter())
        .map(|issue| format!("- `{}` ({}): {}", issue.code, issue.severity.as_str(), issue.message))
        .collect();
    if !issues.is_empty() {
        for issue in issues {
            md.line(issue);
        }
        md.blank();
    }
}

fn deliverables(md: &mut Markdown, input: &ReportInput<'_>) {
    let layout = input.layout;
    md.heading("Deliverables");
    md.line(format!("- Dataset: `{}`", layout.cleaned_records));
    md.line(format!("- Schema: `{}`", layout.schema));
    md.line(format!(
        "- Recipe: `{}` with plan `{}`",
        layout.recipe, layout.plan
    ));
    md.line(format!(
        "- Manifests: `{}`, `{}`, `{}`",
        layout.dataset_manifest, layout.cleaning_manifest, layout.recipe_manifest
    ));
    md.line(format!(
        "- Registry: `{}`, `{}`",
        layout.dataset_archive, layout.recipe_archive
    ));
}
