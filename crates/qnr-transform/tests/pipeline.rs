use std::path::PathBuf;

use qnr_ingest::{read_csv_table, read_csv_table_from_reader, write_csv_table};
use qnr_standards::{fixtures_workspace, load_plan, parse_plan};
use qnr_transform::recipe::parse_recipe;
use qnr_transform::{CLEANING_STEPS, clean_table, load_recipe};

fn fixture(relative: &str) -> PathBuf {
    fixtures_workspace().join(relative)
}

#[test]
fn fixture_raw_records_clean_to_fixture_dataset() {
    let plan = load_plan(&fixture("blueprint/plan/questionnaire_cleaning_plan.md")).expect("plan");
    let recipe =
        load_recipe(&fixture("blueprint/processor/questionnaire_recipe.toml")).expect("recipe");
    let raw = read_csv_table(&fixture("catelog/record/questionnaire_raw.csv")).expect("raw");
    let expected =
        read_csv_table(&fixture("catelog/record/questionnaire_cleaned.csv")).expect("cleaned");

    let outcome = clean_table(&raw, &plan, &recipe).expect("clean");
    assert_eq!(outcome.table.headers, expected.headers);
    for (index, (actual, wanted)) in outcome.table.rows.iter().zip(&expected.rows).enumerate() {
        assert_eq!(actual, wanted, "row {index}");
    }
    assert_eq!(outcome.table.row_count(), expected.row_count());

    let stats = &outcome.stats;
    assert_eq!(stats.input_rows, 13);
    assert_eq!(stats.output_rows, 12);
    assert_eq!(stats.duplicates_removed, 1);
    assert_eq!(stats.missing_for("submit_time"), 1);
    assert_eq!(stats.missing_for("age"), 3);
    assert_eq!(stats.missing_for("gender"), 1);
    assert_eq!(stats.missing_for("tenure_years"), 2);
    assert_eq!(stats.missing_for("department"), 1);
    assert_eq!(stats.missing_for("satisfaction"), 2);
    assert_eq!(stats.missing_for("benefit_medical"), 1);
    assert_eq!(stats.missing_for("other_dept_specify"), 0);
    assert_eq!(stats.missing_for("comments"), 0);
}

#[test]
fn cleaned_output_round_trips_through_csv() {
    let plan = load_plan(&fixture("blueprint/plan/questionnaire_cleaning_plan.md")).expect("plan");
    let recipe =
        load_recipe(&fixture("blueprint/processor/questionnaire_recipe.toml")).expect("recipe");
    let raw = read_csv_table(&fixture("catelog/record/questionnaire_raw.csv")).expect("raw");
    let outcome = clean_table(&raw, &plan, &recipe).expect("clean");

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("out/cleaned.csv");
    write_csv_table(&path, &outcome.table).expect("write");
    let written = std::fs::read_to_string(&path).expect("read back");
    let fixture_text =
        std::fs::read_to_string(fixture("catelog/record/questionnaire_cleaned.csv")).expect("fixture");
    assert_eq!(written, fixture_text);
}

const PLAN: &str = "\
| Field | Type | Range | Missing |
|---|---|---|---|
| id | integer | - | none |
| score | integer | 1-5 | -88 |
| note | text | | |
| flag_a | binary | 0/1 | |
| flag_b | binary | 0/1 | |
";

const RECIPE: &str = r#"
[recipe]
name = "mini"
version = "0.1.0"
id_column = "id"

[rename]
rating = "score"

[multi_select]
source = "flags"
none_labels = ["none"]

[multi_select.options]
a = "flag_a"
b = "flag_b"
"#;

#[test]
fn field_specific_missing_codes_and_absent_columns() {
    let plan = parse_plan(PLAN).expect("plan");
    let recipe = parse_recipe(RECIPE).expect("recipe");
    let raw = read_csv_table_from_reader(
        "id,rating,flags\n1,4,a|b\n2,9,none\n3,,\n2,1,a\n".as_bytes(),
    )
    .expect("raw");

    let outcome = clean_table(&raw, &plan, &recipe).expect("clean");
    assert_eq!(outcome.stats.duplicates_removed, 1);
    assert_eq!(
        outcome.table.rows,
        vec![
            vec!["1", "4", "-99", "1", "1"],
            vec!["2", "-88", "-99", "0", "0"],
            vec!["3", "-88", "-99", "-99", "-99"],
        ]
    );
    assert_eq!(outcome.stats.missing_for("score"), 2);
    assert_eq!(outcome.stats.missing_for("note"), 3);
    assert_eq!(CLEANING_STEPS[0], "deduplicate");
}
