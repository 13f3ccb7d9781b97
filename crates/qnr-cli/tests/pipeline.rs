//! Integration tests for the deliverable build pipeline.

use std::fs;
use std::path::Path;

use qnr_cli::pipeline::{BuildOptions, build_deliverable, dataset_name};
use qnr_model::CheckStatus;
use qnr_standards::{DeliverableConfig, Layout, fixtures_workspace};
use qnr_validate::{VerifyArea, verify_deliverable};

fn copy_dir(from: &Path, to: &Path) {
    fs::create_dir_all(to).expect("create dir");
    for entry in fs::read_dir(from).expect("read dir") {
        let entry = entry.expect("entry");
        let target = to.join(entry.file_name());
        if entry.file_type().expect("file type").is_dir() {
            copy_dir(&entry.path(), &target);
        } else {
            fs::copy(entry.path(), &target).expect("copy file");
        }
    }
}

/// A workspace holding only the build inputs: plan, recipe and raw records.
fn inputs_only() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    let layout = Layout::default();
    let fixture = fixtures_workspace();
    for relative in [&layout.plan, &layout.recipe, &layout.raw_records] {
        let target = dir.path().join(relative);
        fs::create_dir_all(target.parent().expect("parent")).expect("create parent");
        fs::copy(fixture.join(relative), &target).expect("copy input");
    }
    dir
}

fn options(dry_run: bool) -> BuildOptions {
    BuildOptions {
        created_at: "2026-01-16T09:00:00Z".to_string(),
        dry_run,
    }
}

#[test]
fn built_workspace_verifies_cleanly() {
    let dir = inputs_only();
    let root = dir.path();
    let config = DeliverableConfig::default();

    let result = build_deliverable(root, &config, &options(false)).expect("build");
    assert_eq!(result.stats.input_rows, 13);
    assert_eq!(result.stats.output_rows, 12);
    assert_eq!(result.stats.duplicates_removed, 1);
    assert_eq!(result.inspection.overall_status(), CheckStatus::Passed);
    assert_eq!(result.archives.len(), 2);
    for path in &result.written {
        assert!(root.join(path).is_file(), "{path} not written");
    }

    let report = verify_deliverable(root, &config);
    let failures: Vec<_> = report.failures().collect();
    assert!(failures.is_empty(), "{failures:#?}");
    assert_eq!(report.count(CheckStatus::Warning), 0);
}

#[test]
fn build_reproduces_fixture_records() {
    let dir = inputs_only();
    let root = dir.path();
    let config = DeliverableConfig::default();
    build_deliverable(root, &config, &options(false)).expect("build");

    let layout = &config.layout;
    let built = fs::read_to_string(root.join(&layout.cleaned_records)).expect("built records");
    let fixture = fs::read_to_string(fixtures_workspace().join(&layout.cleaned_records))
        .expect("fixture records");
    assert_eq!(built, fixture);
}

#[test]
fn dry_run_writes_nothing() {
    let dir = inputs_only();
    let root = dir.path();
    let config = DeliverableConfig::default();

    let result = build_deliverable(root, &config, &options(true)).expect("dry run");
    assert!(result.archives.is_empty());
    assert_eq!(result.inspection.rows, 12);
    assert!(!result.written.is_empty());
    for path in &result.written {
        assert!(!root.join(path).exists(), "{path} written on dry run");
    }
}

#[test]
fn rebuilding_after_an_edit_restores_checksums() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    copy_dir(&fixtures_workspace(), root);
    let config = DeliverableConfig::default();
    let cleaned = root.join(&config.layout.cleaned_records);
    fs::write(&cleaned, "respondent_id\n1\n").expect("overwrite cleaned");
    assert!(verify_deliverable(root, &config).has_failures());

    build_deliverable(root, &config, &options(false)).expect("rebuild");
    let report = verify_deliverable(root, &config);
    assert!(
        report
            .area(VerifyArea::Manifest)
            .all(|check| check.status == CheckStatus::Passed)
    );
    assert!(!report.has_failures());
}

#[test]
fn missing_plan_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let error = build_deliverable(dir.path(), &DeliverableConfig::default(), &options(true))
        .expect_err("no plan");
    assert!(format!("{error:#}").contains("load plan"));
}

#[test]
fn dataset_name_is_the_records_file_name() {
    assert_eq!(
        dataset_name(&Layout::default()),
        "questionnaire_cleaned.csv"
    );
}
