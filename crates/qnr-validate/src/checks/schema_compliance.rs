//! Schema compliance: presence, types and domains of plan fields.

use chrono::NaiveDateTime;
use qnr_ingest::{parse_f64, parse_i64};
use qnr_model::{FieldDefinition, FieldType, Issue, Severity, ValueDomain};

use super::{Findings, FrameView, is_missing_for};
use crate::util::CaseInsensitiveSet;

pub fn check(fields: &[FieldDefinition], frame: &FrameView, datetime_format: &str) -> Vec<Issue> {
    let mut issues = Vec::new();

    for field in fields {
        if !frame.has(&field.name) {
            issues.push(
                Issue::error("SC001", format!("column `{}` is missing", field.name))
                    .with_field(&field.name),
            );
        }
    }

    let defined = CaseInsensitiveSet::from_names(fields.iter().map(|field| field.name.as_str()));
    for column in frame.columns() {
        if !defined.contains(column) {
            issues.push(
                Issue::warning("SC002", format!("column `{column}` is not defined in the plan"))
                    .with_field(column),
            );
        }
    }

    for field in fields {
        let Some(values) = frame.column(&field.name) else {
            continue;
        };
        issues.extend(check_values(field, values, datetime_format));
    }
    issues
}

fn check_values(field: &FieldDefinition, values: &[String], datetime_format: &str) -> Vec<Issue> {
    let domain = field.effective_domain();
    let mut type_mismatch = Findings::default();
    let mut out_of_domain = Findings::default();
    let mut bad_datetime = Findings::default();

    for (row, value) in values.iter().enumerate() {
        if is_missing_for(field, value) {
            continue;
        }
        let value = value.trim();
        let number = match field.field_type {
            FieldType::String | FieldType::Text => continue,
            FieldType::Datetime => {
                if NaiveDateTime::parse_from_str(value, datetime_format).is_err() {
                    bad_datetime.record(row, value);
                }
                continue;
            }
            FieldType::Float => parse_f64(value),
            FieldType::Integer | FieldType::Binary | FieldType::Categorical => {
                parse_i64(value).map(|v| v as f64)
            }
        };
        match number {
            None => type_mismatch.record(row, value),
            Some(number) if !domain.contains(number) => out_of_domain.record(row, value),
            Some(_) => {}
        }
    }

    let name = field.name.as_str();
    let mut issues = Vec::new();
    let count = type_mismatch.count();
    issues.extend(type_mismatch.into_issue(
        "SC003",
        Severity::Error,
        Some(name),
        format!("{count} value(s) of `{name}` are not {}", type_phrase(field.field_type)),
    ));
    let count = out_of_domain.count();
    let (code, message) = match &domain {
        ValueDomain::Codes { .. } => (
            "SC005",
            format!("{count} value(s) of `{name}` are not allowed codes ({domain})"),
        ),
        _ => (
            "SC004",
            format!("{count} value(s) of `{name}` are outside the range {domain}"),
        ),
    };
    issues.extend(out_of_domain.into_issue(code, Severity::Error, Some(name), message));
    let count = bad_datetime.count();
    issues.extend(bad_datetime.into_issue(
        "SC006",
        Severity::Error,
        Some(name),
        format!("{count} value(s) of `{name}` do not match the datetime format {datetime_format}"),
    ));
    issues
}

fn type_phrase(field_type: FieldType) -> &'static str {
    match field_type {
        FieldType::Float => "numbers",
        _ => "integers",
    }
}
