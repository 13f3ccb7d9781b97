use qnr_standards::{
    CONFIG_FILE_NAME, DeliverableConfig, Layout, StandardsError, load_config, sha256_file,
    sha256_hex, verify_sha256,
};

#[test]
fn defaults_follow_workspace_layout() {
    let config = DeliverableConfig::default();
    assert!(config.layout.required_dirs.contains(&"catelog/record".to_string()));
    assert_eq!(config.inspection.datetime_format, "%Y-%m-%d %H:%M:%S");
    assert_eq!(config.inspection.missing_rate_threshold, 0.5);
    assert_eq!(
        Layout::archive_manifest(&config.layout.recipe_archive),
        "registry/recipe/questionnaire_cleaning_v1.0.zip_manifest.json"
    );
    assert!(
        config
            .layout
            .dataset_archive_entries()
            .contains(&config.layout.cleaned_records.as_str())
    );
}

#[test]
fn partial_config_keeps_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(
        &path,
        r###"
[inspection]
missing_rate_threshold = 0.3

[layout]
plan = "docs/plan.md"

[[plan_sections]]
name = "fields"
any_of = ["## Fields", "## Variables"]
"###,
    )
    .expect("write config");

    let config = load_config(&path).expect("load config");
    assert_eq!(config.inspection.missing_rate_threshold, 0.3);
    assert_eq!(config.inspection.datetime_format, "%Y-%m-%d %H:%M:%S");
    assert_eq!(config.layout.plan, "docs/plan.md");
    assert_eq!(config.layout.schema, Layout::default().schema);
    assert_eq!(config.plan_sections.len(), 1);
    assert!(config.plan_sections[0].is_satisfied_by("intro\n## Variables\n"));

    let loaded = DeliverableConfig::for_workspace(dir.path()).expect("workspace config");
    assert_eq!(loaded, config);
    let fallback = DeliverableConfig::for_workspace(&dir.path().join("nowhere")).expect("default");
    assert_eq!(fallback, DeliverableConfig::default());
}

#[test]
fn malformed_config_is_a_toml_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "[inspection\n").expect("write");
    assert!(matches!(
        load_config(&path).unwrap_err(),
        StandardsError::Toml { .. }
    ));
}

#[test]
fn file_hash_matches_in_memory_hash() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("data.csv");
    std::fs::write(&path, b"a,b\n1,2\n").expect("write");
    let expected = sha256_hex(b"a,b\n1,2\n");
    assert_eq!(sha256_file(&path).expect("hash"), expected);
    verify_sha256(&path, &expected.to_uppercase()).expect("case-insensitive match");
    assert!(matches!(
        verify_sha256(&path, "00").unwrap_err(),
        StandardsError::Sha256Mismatch { .. }
    ));
}
