//! Tests for qnr-model types.

use qnr_model::{
    BusinessRule, CheckKind, CheckResult, CheckStatus, FieldDefinition, FieldType,
    InspectionReport, Issue, ValueDomain,
};

fn result(check: CheckKind, issues: Vec<Issue>) -> CheckResult {
    CheckResult::from_issues(check, issues)
}

#[test]
fn check_result_counts_and_status() {
    let report = result(
        CheckKind::SchemaCompliance,
        vec![
            Issue::error("SC004", "age out of range")
                .with_field("age")
                .with_count(2),
            Issue::warning("SC002", "unexpected column").with_field("notes"),
        ],
    );
    assert_eq!(report.error_count(), 1);
    assert_eq!(report.warning_count(), 1);
    assert_eq!(report.status, CheckStatus::Failed);
    assert!(!report.passed);
    assert_eq!(report.issues_for_field("age").count(), 1);
}

#[test]
fn warnings_alone_still_pass() {
    let report = result(
        CheckKind::DataQuality,
        vec![Issue::warning("DQ005", "duplicate rows").with_count(1)],
    );
    assert_eq!(report.status, CheckStatus::Warning);
    assert!(report.passed);

    let clean = result(CheckKind::BusinessRules, vec![]);
    assert_eq!(clean.status, CheckStatus::Passed);
}

#[test]
fn inspection_overall_status_is_worst_pass() {
    let report = InspectionReport {
        dataset: "survey".to_string(),
        rows: 3,
        columns: 2,
        schema_compliance: result(CheckKind::SchemaCompliance, vec![]),
        data_quality: result(
            CheckKind::DataQuality,
            vec![Issue::warning("DQ004", "high missing rate")],
        ),
        business_rules: result(CheckKind::BusinessRules, vec![]),
    };
    assert_eq!(report.overall_status(), CheckStatus::Warning);
    assert_eq!(report.warning_count(), 1);
    assert_eq!(report.error_count(), 0);
}

#[test]
fn check_result_serializes_status_and_issues() {
    let report = result(
        CheckKind::DataQuality,
        vec![Issue::error("DQ001", "blank cell").with_rows(vec![0, 4])],
    )
    .with_quality_score(87.5);
    let json = serde_json::to_value(&report).expect("serialize result");
    assert_eq!(json["status"], "failed");
    assert_eq!(json["passed"], false);
    assert_eq!(json["quality_score"], 87.5);
    assert_eq!(json["issues"][0]["rows"], serde_json::json!([0, 4]));
}

#[test]
fn field_definition_serializes_type_key() {
    let field = FieldDefinition::new("age", FieldType::Integer)
        .with_domain(ValueDomain::range(18.0, 70.0))
        .with_missing_code(Some(-99));
    let json = serde_json::to_value(&field).expect("serialize field");
    assert_eq!(json["type"], "integer");
    assert_eq!(json["domain"]["kind"], "range");
    let round: FieldDefinition = serde_json::from_value(json).expect("deserialize field");
    assert_eq!(round, field);
    assert!(!round.is_required());
}

#[test]
fn business_rule_lists_fields() {
    let rule = BusinessRule::Unique {
        field: "respondent_id".to_string(),
    };
    assert_eq!(rule.fields(), vec!["respondent_id"]);
    assert_eq!(rule.to_string(), "respondent_id is unique");
}
