//! Report rendering, schema export, manifests and archives.

use std::collections::BTreeMap;
use std::fs;
use std::io::Read;

use qnr_ingest::{CsvTable, read_csv_table};
use qnr_model::{CheckKind, CheckResult, CleaningStats, FieldType, InspectionReport};
use qnr_report::{
    ReportInput, build_cleaning_manifest, build_field_spec, build_recipe_manifest, build_schema,
    render_cleaning_report, write_archive,
};
use qnr_standards::{
    DeliverableConfig, Layout, PackageSettings, fixtures_workspace, load_plan, parse_plan,
    schema_from_value, sha256_file,
};
use qnr_transform::{clean_table, load_recipe, parse_recipe};
use qnr_validate::QuestionnaireInspector;

const MINI_PLAN: &str = "\
# Mini Plan

## Data Model

| Field | Type | Range | Missing | Description |
|-------|------|-------|---------|-------------|
| `id` | integer | - | none | |
| `score` | integer | 1-5 | | Score |
";

fn passed_inspection(rows: usize) -> InspectionReport {
    InspectionReport {
        dataset: "mini.csv".to_string(),
        rows,
        columns: 2,
        schema_compliance: CheckResult::from_issues(CheckKind::SchemaCompliance, Vec::new()),
        data_quality: CheckResult::from_issues(CheckKind::DataQuality, Vec::new())
            .with_quality_score(75.0),
        business_rules: CheckResult::from_issues(CheckKind::BusinessRules, Vec::new()),
    }
}

#[test]
fn renders_mini_report() {
    let plan = parse_plan(MINI_PLAN).expect("plan");
    let recipe = parse_recipe("[recipe]\nname = \"mini\"\nversion = \"0.1\"\n").expect("recipe");
    let stats = CleaningStats {
        input_rows: 3,
        output_rows: 2,
        duplicates_removed: 1,
        missing_recoded: BTreeMap::from([("score".to_string(), 1)]),
    };
    let mut table = CsvTable::new(vec!["id".to_string(), "score".to_string()]);
    table.push_row(vec!["1".to_string(), "4".to_string()]);
    table.push_row(vec!["2".to_string(), "-99".to_string()]);
    let inspection = passed_inspection(2);

    let report = render_cleaning_report(&ReportInput {
        package: &PackageSettings::default(),
        created_at: "2026-01-16T09:00:00Z",
        layout: &Layout::default(),
        plan: &plan,
        recipe: &recipe,
        stats: &stats,
        table: &table,
        inspection: &inspection,
    });
    insta::assert_snapshot!(report, @r"
# Cleaning Report: Mini Plan

Package `questionnaire_cleaning` version 1.0.0, generated 2026-01-16T09:00:00Z.

## Overview

Raw questionnaire records (`catelog/record/questionnaire_raw.csv`) were cleaned with recipe `mini` 0.1 into `catelog/record/questionnaire_cleaned.csv`.
Overall inspection status: **passed**.

## Data Overview

| Measure | Value |
|---------|-------|
| Input rows | 3 |
| Duplicates removed | 1 |
| Output rows | 2 |
| Fields | 2 |
| Business rules | 0 |

## Field Definitions

| Field name | Type | Allowed values | Missing code | Description |
|------------|------|----------------|--------------|-------------|
| id | integer | - | required | - |
| score | integer | 1-5 | -99 | Score |

## Data Transformations

| Transformation | Source | Targets | Mapping |
|----------------|--------|---------|---------|
| normalize_datetime | - | - | - |

Steps, in order: deduplicate, rename_columns, normalize_datetime, normalize_numeric, map_labels, split_other, split_multi_select, trim_text.

## Missing Values

Absent or invalid answers are coded -99; a blank free-text answer stays blank.

| Field | Missing code | Recoded in cleaning | Missing in output |
|-------|--------------|---------------------|-------------------|
| id | required | 0 | 0 |
| score | -99 | 1 | 1 |

## Statistics

| Field | Present | Min | Max | Mean |
|-------|---------|-----|-----|------|
| id | 2 | 1 | 2 | 1.50 |
| score | 1 | 4 | 4 | 4.00 |

## Quality Checks

| Check | Status | Errors | Warnings |
|-------|--------|--------|----------|
| Schema compliance | passed | 0 | 0 |
| Data quality | passed | 0 | 0 |
| Business rules | passed | 0 | 0 |

Quality score: 75.00

## Deliverables

- Dataset: `catelog/record/questionnaire_cleaned.csv`
- Schema: `catelog/schema/questionnaire_schema.json`
- Recipe: `blueprint/processor/questionnaire_recipe.toml` with plan `blueprint/plan/questionnaire_cleaning_plan.md`
- Manifests: `factory/manifest/questionnaire_dataset_manifest.json`, `factory/manifest/questionnaire_cleaning_manifest.json`, `factory/manifest/questionnaire_cleaning_recipe_manifest.json`
- Registry: `registry/dataset/questionnaire_cleaning_20260116.zip`, `registry/recipe/questionnaire_cleaning_v1.0.zip`
");
}

#[test]
fn fixture_report_meets_deliverable_requirements() {
    let root = fixtures_workspace();
    let layout = Layout::default();
    let plan = load_plan(&root.join(&layout.plan)).expect("plan");
    let recipe = load_recipe(&root.join(&layout.recipe)).expect("recipe");
    let raw = read_csv_table(&root.join(&layout.raw_records)).expect("raw");
    let outcome = clean_table(&raw, &plan, &recipe).expect("clean");
    let frame = qnr_ingest::table_to_frame(&outcome.table).expect("frame");
    let inspection =
        QuestionnaireInspector::from_plan(plan.clone()).inspect("questionnaire_cleaned.csv", &frame);

    let report = render_cleaning_report(&ReportInput {
        package: &PackageSettings::default(),
        created_at: "2026-01-16T09:00:00Z",
        layout: &layout,
        plan: &plan,
        recipe: &recipe,
        stats: &outcome.stats,
        table: &outcome.table,
        inspection: &inspection,
    });

    let config = DeliverableConfig::default();
    let tables: String = report
        .lines()
        .filter(|line| line.starts_with('|'))
        .collect::<Vec<_>>()
        .join("\n");
    for requirement in config.report_sections.iter().chain(&config.report_deliverables) {
        assert!(requirement.is_satisfied_by(&report), "{}", requirement.name);
    }
    for requirement in &config.report_tables {
        assert!(requirement.is_satisfied_by(&tables), "{}", requirement.name);
    }
    assert!(report.contains("| split_multi_select | benefits |"));
    assert!(report.contains("Quality score: 81.41"));
    assert!(report.contains("| age | -99 | 3 | 3 |"));
}

#[test]
fn exported_schema_is_valid_and_matches_plan() {
    let root = fixtures_workspace();
    let layout = Layout::default();
    let plan = load_plan(&root.join(&layout.plan)).expect("plan");
    let recipe = load_recipe(&root.join(&layout.recipe)).expect("recipe");

    let schema = build_schema(&plan, &recipe, &PackageSettings::default());
    let value = serde_json::to_value(&schema).expect("json");
    let reparsed =
        schema_from_value(&root.join(&layout.schema), value).expect("exported schema validates");

    assert_eq!(reparsed.field_names(), plan.field_names());
    assert_eq!(reparsed.schema.primary_key.as_deref(), Some("respondent_id"));
    let medical = reparsed.field("benefit_medical").expect("benefit field");
    assert_eq!(medical.field_type, FieldType::Binary);
    let allowed = medical
        .constraints
        .as_ref()
        .and_then(|constraints| constraints.allowed.clone());
    assert_eq!(allowed, Some(vec![0, 1]));
    let age = reparsed.field("age").expect("age");
    let constraints = age.constraints.as_ref().expect("age constraints");
    assert_eq!((constraints.minimum, constraints.maximum), (Some(18.0), Some(70.0)));
    assert!(
        reparsed
            .quality_rules
            .iter()
            .any(|rule| rule.rule == "tenure_years <= age - 16")
    );

    let spec = build_field_spec(&plan);
    assert_eq!(spec.fields.len(), 13);
    assert_eq!(spec.rules.len(), 3);
}

#[test]
fn manifests_hash_their_components() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    let layout = Layout::default();
    for relative in [
        &layout.plan,
        &layout.field_spec,
        &layout.recipe,
        &layout.inspection_report,
        &layout.schema,
        &layout.raw_records,
        &layout.cleaned_records,
    ] {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(&path, relative.as_bytes()).expect("write");
    }
    let package = PackageSettings::default();

    let recipe_manifest =
        build_recipe_manifest(root, &layout, &package, "2026-01-16T09:00:00Z").expect("recipe");
    let plan = &recipe_manifest.components["plan"];
    assert_eq!(plan.path, layout.plan);
    assert_eq!(
        plan.sha256.as_deref(),
        Some(sha256_file(&root.join(&layout.plan)).expect("hash").as_str())
    );
    assert_eq!(recipe_manifest.components.len(), 5);

    let stats = CleaningStats {
        input_rows: 13,
        output_rows: 12,
        duplicates_removed: 1,
        ..CleaningStats::default()
    };
    let cleaning = build_cleaning_manifest(root, &layout, &package, "2026-01-16T09:00:00Z", &stats)
        .expect("cleaning");
    assert_eq!(cleaning.input.rows, 13);
    assert_eq!(cleaning.output.path, layout.cleaned_records);
    assert_eq!(cleaning.steps.first().map(String::as_str), Some("deduplicate"));

    fs::remove_file(root.join(&layout.schema)).expect("remove schema");
    assert!(build_recipe_manifest(root, &layout, &package, "2026-01-16T09:00:00Z").is_err());
}

#[test]
fn archive_round_trips_entries() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    fs::create_dir_all(root.join("catelog/record")).expect("mkdir");
    fs::write(root.join("catelog/record/a.csv"), "id\n1\n").expect("write");
    fs::write(root.join("notes.md"), "# Notes\n").expect("write");

    let manifest = write_archive(
        root,
        &["catelog/record/a.csv", "notes.md"],
        "registry/dataset/test.zip",
        "test",
        "1.0.0",
        "2026-01-16T09:00:00Z",
    )
    .expect("archive");

    let archive_path = root.join("registry/dataset/test.zip");
    assert_eq!(manifest.archive_checksum, sha256_file(&archive_path).expect("hash"));
    assert_eq!(manifest.files.len(), 2);
    assert_eq!(manifest.files[0].size, 5);
    assert!(root.join("registry/dataset/test.zip_manifest.json").is_file());

    let mut archive = zip::ZipArchive::new(fs::File::open(&archive_path).expect("open"))
        .expect("zip");
    let mut text = String::new();
    archive
        .by_name("catelog/record/a.csv")
        .expect("entry")
        .read_to_string(&mut text)
        .expect("read entry");
    assert_eq!(text, "id\n1\n");
}
