//! Inspector passes over synthetic frames and the fixture dataset.

use polars::prelude::*;
use proptest::prelude::*;
use qnr_ingest::{read_csv_table, table_to_frame};
use qnr_model::{CheckStatus, Issue, Severity};
use qnr_standards::{fixtures_workspace, parse_plan};
use qnr_validate::QuestionnaireInspector;

const PLAN: &str = r#"# Test Plan

Missing value code: -99

## Data Model

| Field | Type | Range | Missing | Description |
|-------|------|-------|---------|-------------|
| `respondent_id` | integer | - | none | Respondent identifier |
| `age` | integer | 18-70 | -99 | Age in years |
| `gender` | categorical | 1=Male; 2=Female | -99 | Gender |
| `tenure_years` | float | 0-50 | -99 | Years at the company |
| `department` | categorical | 1=Engineering; 5=Other | -99 | Department |
| `other_dept_specify` | string | - | -99 | Other department |
| `submit_time` | datetime | - | -99 | Submission time |

## Business Rules

- `respondent_id` is unique
- `other_dept_specify` is required only when `department` = 5
- `tenure_years` <= `age` - 16
"#;

fn inspector() -> QuestionnaireInspector {
    QuestionnaireInspector::from_plan(parse_plan(PLAN).expect("parse plan"))
}

fn frame(columns: &[(&str, &[&str])]) -> DataFrame {
    let columns = columns
        .iter()
        .map(|(name, values)| Series::new((*name).into(), values.to_vec()).into())
        .collect();
    DataFrame::new(columns).expect("frame")
}

fn valid_columns() -> Vec<(&'static str, Vec<&'static str>)> {
    vec![
        ("respondent_id", vec!["1", "2", "3"]),
        ("age", vec!["30", "40", "-99"]),
        ("gender", vec!["1", "2", "1"]),
        ("tenure_years", vec!["5", "10.5", "-99"]),
        ("department", vec!["1", "5", "-99"]),
        ("other_dept_specify", vec!["-99", "Legal", "-99"]),
        (
            "submit_time",
            vec!["2026-01-10 09:15:00", "2026-01-11 10:00:00", "-99"],
        ),
    ]
}

/// Valid frame with some cells replaced.
fn with_overrides(overrides: &[(&str, usize, &'static str)]) -> DataFrame {
    let mut columns = valid_columns();
    for (name, row, value) in overrides {
        let column = columns
            .iter_mut()
            .find(|(column, _)| column == name)
            .expect("known column");
        column.1[*row] = *value;
    }
    let borrowed: Vec<(&str, &[&str])> = columns
        .iter()
        .map(|(name, values)| (*name, values.as_slice()))
        .collect();
    frame(&borrowed)
}

fn codes(issues: &[Issue]) -> Vec<&str> {
    issues.iter().map(|issue| issue.code.as_str()).collect()
}

fn find<'a>(issues: &'a [Issue], code: &str) -> &'a Issue {
    issues
        .iter()
        .find(|issue| issue.code == code)
        .unwrap_or_else(|| panic!("expected {code} in {:?}", codes(issues)))
}

#[test]
fn valid_frame_passes_every_check() {
    let df = with_overrides(&[]);
    let report = inspector().inspect("valid.csv", &df);

    assert_eq!(report.rows, 3);
    assert_eq!(report.columns, 7);
    for result in report.results() {
        assert_eq!(result.status, CheckStatus::Passed, "{:?}", result.issues);
        assert!(result.passed);
    }
    assert_eq!(report.overall_status(), CheckStatus::Passed);
}

#[test]
fn quality_score_is_mean_completeness() {
    let df = with_overrides(&[]);
    let result = inspector().validate_data_quality(&df);
    // 5 present cells of 7 fields per row on average over 3 rows.
    assert_eq!(result.quality_score, Some(71.43));
}

#[test]
fn missing_and_undeclared_columns() {
    let df = frame(&[
        ("respondent_id", &["1", "2"]),
        ("age", &["30", "40"]),
        ("tenure_years", &["5", "6"]),
        ("department", &["1", "1"]),
        ("other_dept_specify", &["-99", "-99"]),
        ("submit_time", &["2026-01-10 09:15:00", "2026-01-10 09:16:00"]),
        ("extra", &["x", "y"]),
    ]);
    let result = inspector().validate_schema_compliance(&df);

    assert_eq!(result.status, CheckStatus::Failed);
    let missing = find(&result.issues, "SC001");
    assert_eq!(missing.severity, Severity::Error);
    assert_eq!(missing.field.as_deref(), Some("gender"));
    let extra = find(&result.issues, "SC002");
    assert_eq!(extra.severity, Severity::Warning);
    assert_eq!(extra.field.as_deref(), Some("extra"));
}

#[test]
fn column_lookup_ignores_case() {
    let df = frame(&[
        ("RESPONDENT_ID", &["1"]),
        ("Age", &["30"]),
        ("gender", &["1"]),
        ("tenure_years", &["5"]),
        ("department", &["1"]),
        ("other_dept_specify", &["-99"]),
        ("submit_time", &["2026-01-10 09:15:00"]),
    ]);
    let result = inspector().validate_schema_compliance(&df);
    assert!(result.issues.is_empty(), "{:?}", result.issues);
}

#[test]
fn type_domain_and_datetime_violations() {
    let df = with_overrides(&[
        ("age", 0, "15"),
        ("gender", 1, "3"),
        ("tenure_years", 0, "abc"),
        ("submit_time", 1, "10/01/2026"),
    ]);
    let result = inspector().validate_schema_compliance(&df);

    assert_eq!(result.status, CheckStatus::Failed);
    assert_eq!(codes(&result.issues), vec!["SC004", "SC005", "SC003", "SC006"]);

    let range = find(&result.issues, "SC004");
    assert_eq!(range.field.as_deref(), Some("age"));
    assert_eq!(range.count, Some(1));
    assert_eq!(range.rows, vec![0]);
    assert!(range.message.contains("(examples: 15)"), "{}", range.message);

    let code = find(&result.issues, "SC005");
    assert_eq!(code.rows, vec![1]);
    let datetime = find(&result.issues, "SC006");
    assert!(datetime.message.contains("%Y-%m-%d %H:%M:%S"));
}

#[test]
fn datetime_format_is_configurable() {
    let df = with_overrides(&[
        ("submit_time", 0, "10/01/2026 09:15"),
        ("submit_time", 1, "11/01/2026 10:00"),
    ]);
    let result = inspector()
        .with_datetime_format("%d/%m/%Y %H:%M")
        .validate_schema_compliance(&df);
    assert!(result.issues.is_empty(), "{:?}", result.issues);
}

#[test]
fn missing_value_conventions() {
    let df = with_overrides(&[
        ("respondent_id", 2, ""),
        ("age", 0, ""),
        ("gender", 1, "-88"),
        ("department", 0, "-99"),
        ("department", 1, "-99"),
    ]);
    let result = inspector().validate_data_quality(&df);

    assert_eq!(result.status, CheckStatus::Failed);
    let blank = find(&result.issues, "DQ001");
    assert_eq!(blank.field.as_deref(), Some("age"));
    assert_eq!(blank.severity, Severity::Error);

    let foreign = find(&result.issues, "DQ002");
    assert_eq!(foreign.field.as_deref(), Some("gender"));
    assert_eq!(foreign.severity, Severity::Warning);

    let required = find(&result.issues, "DQ003");
    assert_eq!(required.field.as_deref(), Some("respondent_id"));
    assert_eq!(required.rows, vec![2]);

    let sparse: Vec<&str> = result
        .issues
        .iter()
        .filter(|issue| issue.code == "DQ004")
        .filter_map(|issue| issue.field.as_deref())
        .collect();
    assert!(sparse.contains(&"department"));
    assert!(sparse.contains(&"age"));
    // Text fields are exempt from the missing-rate threshold.
    assert!(!sparse.contains(&"other_dept_specify"));
}

#[test]
fn duplicate_rows_are_a_warning() {
    let df = frame(&[
        ("respondent_id", &["1", "1"]),
        ("age", &["30", "30"]),
        ("gender", &["1", "1"]),
        ("tenure_years", &["5", "5"]),
        ("department", &["1", "1"]),
        ("other_dept_specify", &["-99", "-99"]),
        ("submit_time", &["2026-01-10 09:15:00", "2026-01-10 09:15:00"]),
    ]);
    let inspector = inspector();

    let quality = inspector.validate_data_quality(&df);
    assert_eq!(quality.status, CheckStatus::Warning);
    let duplicate = find(&quality.issues, "DQ005");
    assert_eq!(duplicate.rows, vec![1]);
    assert!(duplicate.field.is_none());

    let rules = inspector.validate_business_rules(&df);
    assert_eq!(rules.status, CheckStatus::Failed);
    assert_eq!(find(&rules.issues, "BR004").field.as_deref(), Some("respondent_id"));
}

#[test]
fn business_rule_violations() {
    let df = with_overrides(&[
        ("other_dept_specify", 0, "Legal"),
        ("other_dept_specify", 1, "-99"),
        ("tenure_years", 1, "30"),
    ]);
    let result = inspector().validate_business_rules(&df);

    assert_eq!(result.status, CheckStatus::Failed);
    assert_eq!(codes(&result.issues), vec!["BR001", "BR002", "BR003"]);
    assert_eq!(find(&result.issues, "BR001").rows, vec![1]);
    assert_eq!(find(&result.issues, "BR002").rows, vec![0]);
    let comparison = find(&result.issues, "BR003");
    assert!(
        comparison.message.contains("tenure_years=30 age=40"),
        "{}",
        comparison.message
    );
}

#[test]
fn rules_on_absent_columns_are_skipped() {
    let df = frame(&[
        ("respondent_id", &["1", "2"]),
        ("age", &["30", "40"]),
        ("tenure_years", &["5", "6"]),
    ]);
    let result = inspector().validate_business_rules(&df);
    assert_eq!(result.status, CheckStatus::Warning);
    assert_eq!(codes(&result.issues), vec!["BR000"]);
    assert!(result.issues[0].message.contains("department"));
}

#[test]
fn fixture_dataset_passes_inspection() {
    let root = fixtures_workspace();
    let inspector =
        QuestionnaireInspector::new(&root.join("blueprint/plan/questionnaire_cleaning_plan.md"))
            .expect("inspector");
    let table =
        read_csv_table(&root.join("catelog/record/questionnaire_cleaned.csv")).expect("cleaned");
    let df = table_to_frame(&table).expect("frame");

    let report = inspector.inspect("questionnaire_cleaned.csv", &df);
    assert_eq!(report.rows, 12);
    assert_eq!(report.columns, 13);
    for result in report.results() {
        assert!(result.issues.is_empty(), "{}: {:?}", result.check, result.issues);
    }
    assert_eq!(report.data_quality.quality_score, Some(81.41));
    assert_eq!(inspector.rules().len(), 3);
}

const AGE_PLAN: &str = "## Data Model\n\n| Field | Type | Range |\n|---|---|---|\n| age | integer | 18-70 |\n";

fn age_frame(ages: &[i64]) -> DataFrame {
    let values: Vec<String> = ages.iter().map(ToString::to_string).collect();
    DataFrame::new(vec![Series::new("age".into(), values).into()]).expect("frame")
}

proptest! {
    #[test]
    fn ages_inside_range_pass(ages in proptest::collection::vec(18i64..=70, 1..20)) {
        let inspector = QuestionnaireInspector::from_plan(parse_plan(AGE_PLAN).expect("plan"));
        let result = inspector.validate_schema_compliance(&age_frame(&ages));
        prop_assert!(result.issues.is_empty());
    }

    #[test]
    fn ages_outside_range_are_counted(
        ages in proptest::collection::vec(prop_oneof![0i64..18, 71i64..200], 1..20)
    ) {
        let inspector = QuestionnaireInspector::from_plan(parse_plan(AGE_PLAN).expect("plan"));
        let result = inspector.validate_schema_compliance(&age_frame(&ages));
        prop_assert_eq!(result.issues.len(), 1);
        prop_assert_eq!(result.issues[0].code.as_str(), "SC004");
        prop_assert_eq!(result.issues[0].count, Some(ages.len() as u64));
        prop_assert!(result.issues[0].rows.len() <= 5);
    }
}
