//! Deliverable build pipeline: clean, inspect, export, report, manifest, package.
//!
//! Each stage writes into the workspace before the next one runs, because
//! manifests and archives hash the files produced by earlier stages.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use qnr_ingest::{CsvTable, read_csv_table, table_to_frame, write_csv_table};
use qnr_model::{ArchiveManifest, CleaningStats, InspectionReport};
use qnr_report::{
    ReportInput, build_cleaning_manifest, build_dataset_manifest, build_field_spec,
    build_recipe_manifest, build_schema, render_cleaning_report, write_archive,
};
use qnr_standards::{DeliverableConfig, Layout, Plan, load_plan, write_json};
use qnr_transform::{CleaningRecipe, clean_table, load_recipe};
use qnr_validate::QuestionnaireInspector;
use tracing::{debug, info, info_span, warn};

#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Timestamp recorded in manifests and the report.
    pub created_at: String,
    /// Clean and inspect only; nothing is written.
    pub dry_run: bool,
}

#[derive(Debug)]
pub struct BuildResult {
    pub root: PathBuf,
    pub stats: CleaningStats,
    pub inspection: InspectionReport,
    /// Workspace-relative files written (or that would be written on a dry run).
    pub written: Vec<String>,
    pub archives: Vec<ArchiveManifest>,
}

/// Inputs read from the workspace before anything is produced.
struct Sources {
    plan: Plan,
    recipe: CleaningRecipe,
    raw: CsvTable,
}

fn load_sources(root: &Path, layout: &Layout) -> Result<Sources> {
    let plan_path = root.join(&layout.plan);
    let plan =
        load_plan(&plan_path).with_context(|| format!("load plan {}", plan_path.display()))?;
    if !plan.unparsed_rules.is_empty() {
        warn!(
            rules = plan.unparsed_rules.len(),
            "plan rules not understood; they will not be checked"
        );
    }
    let recipe = load_recipe(&root.join(&layout.recipe))?;
    let raw = read_csv_table(&root.join(&layout.raw_records))?;
    Ok(Sources { plan, recipe, raw })
}

/// Name under which the cleaned records are inspected.
pub fn dataset_name(layout: &Layout) -> String {
    Path::new(&layout.cleaned_records)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| layout.cleaned_records.clone())
}

/// Inspect an in-memory table against the plan.
pub fn inspect_table(
    plan: &Plan,
    table: &CsvTable,
    config: &DeliverableConfig,
    dataset: &str,
) -> Result<InspectionReport> {
    let frame = table_to_frame(table)?;
    let inspector =
        QuestionnaireInspector::from_plan(plan.clone()).with_settings(config.inspection.clone());
    Ok(inspector.inspect(dataset, &frame))
}

/// Build every generated artifact of the deliverable under `root`.
///
/// Plan, recipe and raw records are inputs and are never rewritten.
pub fn build_deliverable(
    root: &Path,
    config: &DeliverableConfig,
    options: &BuildOptions,
) -> Result<BuildResult> {
    let span = info_span!("build", root = %root.display(), dry_run = options.dry_run);
    let _guard = span.enter();
    let start = Instant::now();
    let layout = &config.layout;
    let package = &config.package;
    let created_at = options.created_at.as_str();

    let sources = load_sources(root, layout)?;
    let outcome = clean_table(&sources.raw, &sources.plan, &sources.recipe)?;
    let inspection = inspect_table(&sources.plan, &outcome.table, config, &dataset_name(layout))?;
    if inspection.overall_status().is_failed() {
        warn!(
            errors = inspection.error_count(),
            "cleaned records fail inspection"
        );
    }

    let planned = planned_outputs(layout);
    if options.dry_run {
        info!(
            files = planned.len(),
            duration_ms = start.elapsed().as_millis(),
            "dry run complete"
        );
        return Ok(BuildResult {
            root: root.to_path_buf(),
            stats: outcome.stats,
            inspection,
            written: planned,
            archives: Vec::new(),
        });
    }

    for dir in &layout.required_dirs {
        let path = root.join(dir);
        std::fs::create_dir_all(&path)
            .with_context(|| format!("create {}", path.display()))?;
    }

    write_csv_table(&root.join(&layout.cleaned_records), &outcome.table)?;
    write_json(&root.join(&layout.inspection_report), &inspection)?;
    write_json(
        &root.join(&layout.field_spec),
        &build_field_spec(&sources.plan),
    )?;
    write_json(
        &root.join(&layout.schema),
        &build_schema(&sources.plan, &sources.recipe, package),
    )?;
    debug!("wrote records, inspection, field spec and schema");

    let cleaning = build_cleaning_manifest(root, layout, package, created_at, &outcome.stats)?;
    write_json(&root.join(&layout.cleaning_manifest), &cleaning)?;

    let report = render_cleaning_report(&ReportInput {
        package,
        created_at,
        layout,
        plan: &sources.plan,
        recipe: &sources.recipe,
        stats: &outcome.stats,
        table: &outcome.table,
        inspection: &inspection,
    });
    let report_path = root.join(&layout.report);
    if let Some(parent) = report_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create {}", parent.display()))?;
    }
    std::fs::write(&report_path, report)
        .with_context(|| format!("write {}", report_path.display()))?;

    let dataset = build_dataset_manifest(
        root,
        layout,
        package,
        created_at,
        &sources.plan,
        &outcome.table,
        &inspection,
    )?;
    write_json(&root.join(&layout.dataset_manifest), &dataset)?;
    let recipe = build_recipe_manifest(root, layout, package, created_at)?;
    write_json(&root.join(&layout.recipe_manifest), &recipe)?;

    let archives = vec![
        write_archive(
            root,
            &layout.dataset_archive_entries(),
            &layout.dataset_archive,
            &package.name,
            &package.version,
            created_at,
        )?,
        write_archive(
            root,
            &layout.recipe_archive_entries(),
            &layout.recipe_archive,
            &package.name,
            &package.version,
            created_at,
        )?,
    ];

    info!(
        rows = outcome.stats.output_rows,
        files = planned.len(),
        duration_ms = start.elapsed().as_millis(),
        "deliverable built"
    );
    Ok(BuildResult {
        root: root.to_path_buf(),
        stats: outcome.stats,
        inspection,
        written: planned,
        archives,
    })
}

/// Generated files, in the order they are written.
fn planned_outputs(layout: &Layout) -> Vec<String> {
    vec![
        layout.cleaned_records.clone(),
        layout.inspection_report.clone(),
        layout.field_spec.clone(),
        layout.schema.clone(),
        layout.cleaning_manifest.clone(),
        layout.report.clone(),
        layout.dataset_manifest.clone(),
        layout.recipe_manifest.clone(),
        layout.dataset_archive.clone(),
        Layout::archive_manifest(&layout.dataset_archive),
        layout.recipe_archive.clone(),
        Layout::archive_manifest(&layout.recipe_archive),
    ]
}
