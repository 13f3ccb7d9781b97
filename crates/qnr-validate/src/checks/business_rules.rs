//! Cross-field business rules declared in the plan.

use std::collections::HashMap;

use qnr_ingest::{is_missing_value, parse_f64, parse_i64};
use qnr_model::{BusinessRule, CompareOp, Issue, Operand, Severity};

use super::{Findings, FrameView};

pub fn check(rules: &[BusinessRule], frame: &FrameView) -> Vec<Issue> {
    let mut issues = Vec::new();
    for rule in rules {
        let absent: Vec<&str> = rule
            .fields()
            .into_iter()
            .filter(|field| !frame.has(field))
            .collect();
        if !absent.is_empty() {
            issues.push(Issue::warning(
                "BR000",
                format!("rule `{rule}` skipped; missing column(s): {}", absent.join(", ")),
            ));
            continue;
        }
        match rule {
            BusinessRule::Unique { field } => issues.extend(check_unique(field, frame)),
            BusinessRule::ConditionalPresence {
                field,
                when_field,
                when_value,
                exclusive,
            } => issues.extend(check_presence(
                field,
                when_field,
                *when_value,
                *exclusive,
                frame,
            )),
            BusinessRule::Comparison { field, op, right } => {
                issues.extend(check_comparison(rule, field, *op, right, frame));
            }
        }
    }
    issues
}

fn values<'a>(frame: &'a FrameView, name: &str) -> &'a [String] {
    frame.column(name).unwrap_or(&[])
}

fn present_number(value: &str) -> Option<f64> {
    if is_missing_value(value) {
        None
    } else {
        parse_f64(value)
    }
}

fn check_unique(field: &str, frame: &FrameView) -> Option<Issue> {
    let mut first_seen: HashMap<&str, usize> = HashMap::new();
    let mut duplicates = Findings::default();
    for (row, value) in values(frame, field).iter().enumerate() {
        if is_missing_value(value) {
            continue;
        }
        let value = value.trim();
        if first_seen.contains_key(value) {
            duplicates.record(row, value);
        } else {
            first_seen.insert(value, row);
        }
    }
    let count = duplicates.count();
    duplicates.into_issue(
        "BR004",
        Severity::Error,
        Some(field),
        format!("{count} duplicate value(s) in unique field `{field}`"),
    )
}

fn check_presence(
    field: &str,
    when_field: &str,
    when_value: i64,
    exclusive: bool,
    frame: &FrameView,
) -> Vec<Issue> {
    let targets = values(frame, field);
    let conditions = values(frame, when_field);
    let mut absent = Findings::default();
    let mut unexpected = Findings::default();

    for (row, (target, condition)) in targets.iter().zip(conditions).enumerate() {
        if is_missing_value(condition) {
            continue;
        }
        let Some(code) = parse_i64(condition) else {
            continue;
        };
        let present = !is_missing_value(target);
        if code == when_value && !present {
            absent.record(row, format!("{when_field}={code}"));
        } else if exclusive && code != when_value && present {
            unexpected.record(row, target.trim());
        }
    }

    let mut issues = Vec::new();
    let count = absent.count();
    issues.extend(absent.into_issue(
        "BR001",
        Severity::Error,
        Some(field),
        format!("{count} row(s) lack `{field}` although `{when_field}` = {when_value}"),
    ));
    let count = unexpected.count();
    issues.extend(unexpected.into_issue(
        "BR002",
        Severity::Error,
        Some(field),
        format!("{count} row(s) fill `{field}` although `{when_field}` != {when_value}"),
    ));
    issues
}

fn check_comparison(
    rule: &BusinessRule,
    field: &str,
    op: CompareOp,
    right: &Operand,
    frame: &FrameView,
) -> Option<Issue> {
    let left_values = values(frame, field);
    let mut violations = Findings::default();
    for (row, left) in left_values.iter().enumerate() {
        let Some(left_number) = present_number(left) else {
            continue;
        };
        let right_number = match right {
            Operand::Constant(constant) => *constant,
            Operand::Field { name, offset } => {
                let Some(value) = values(frame, name)
                    .get(row)
                    .map(String::as_str)
                    .and_then(present_number)
                else {
                    continue;
                };
                value + offset
            }
        };
        if !op.holds(left_number, right_number) {
            let sample = match right {
                Operand::Field { name, .. } => format!(
                    "{field}={} {name}={}",
                    left.trim(),
                    values(frame, name).get(row).map(|v| v.trim()).unwrap_or("")
                ),
                Operand::Constant(_) => format!("{field}={}", left.trim()),
            };
            violations.record(row, sample);
        }
    }
    let count = violations.count();
    violations.into_issue(
        "BR003",
        Severity::Error,
        Some(field),
        format!("{count} row(s) violate `{rule}`"),
    )
}
