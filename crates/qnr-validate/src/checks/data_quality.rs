//! Data quality: missing-value conventions, completeness and duplicates.

use std::collections::HashSet;

use qnr_ingest::{is_blank, sentinel_code};
use qnr_model::{FieldDefinition, Issue, Severity};

use super::{Findings, FrameView, is_missing_for};

/// Issues plus the quality score (mean completeness in percent).
pub struct QualityOutcome {
    pub issues: Vec<Issue>,
    pub quality_score: f64,
}

pub fn check(fields: &[FieldDefinition], frame: &FrameView, missing_rate_threshold: f64) -> QualityOutcome {
    let rows = frame.height();
    let mut issues = Vec::new();
    let mut completeness = Vec::with_capacity(fields.len());

    for field in fields {
        let Some(values) = frame.column(&field.name) else {
            completeness.push(0.0);
            continue;
        };
        let name = field.name.as_str();
        let textual = field.field_type.is_textual();

        let mut blanks = Findings::default();
        let mut foreign = Findings::default();
        let mut missing = Findings::default();
        for (row, value) in values.iter().enumerate() {
            if !is_missing_for(field, value) {
                continue;
            }
            missing.record(row, value.trim());
            if is_blank(value) {
                blanks.record(row, "");
            } else if let (Some(declared), Some(used)) = (field.missing_code, sentinel_code(value))
                && declared != used
            {
                foreign.record(row, value.trim());
            }
        }

        let missing_count = missing.count();
        completeness.push(if rows == 0 {
            1.0
        } else {
            (rows as f64 - missing_count as f64) / rows as f64
        });

        match field.missing_code {
            Some(code) => {
                if !textual {
                    let count = blanks.count();
                    issues.extend(blanks.into_issue(
                        "DQ001",
                        Severity::Error,
                        Some(name),
                        format!("{count} blank value(s) in `{name}`; missing answers must be coded {code}"),
                    ));
                }
                let count = foreign.count();
                issues.extend(foreign.into_issue(
                    "DQ002",
                    Severity::Warning,
                    Some(name),
                    format!("{count} value(s) of `{name}` use a missing code other than {code}"),
                ));
            }
            None => {
                issues.extend(missing.into_issue(
                    "DQ003",
                    Severity::Error,
                    Some(name),
                    format!("required field `{name}` has {missing_count} missing value(s)"),
                ));
            }
        }

        if !textual && rows > 0 {
            let rate = missing_count as f64 / rows as f64;
            if rate > missing_rate_threshold {
                issues.push(
                    Issue::warning(
                        "DQ004",
                        format!(
                            "`{name}` is missing in {:.1}% of rows (threshold {:.1}%)",
                            rate * 100.0,
                            missing_rate_threshold * 100.0
                        ),
                    )
                    .with_field(name)
                    .with_count(missing_count),
                );
            }
        }
    }

    issues.extend(duplicate_rows(frame));

    let quality_score = if completeness.is_empty() {
        100.0
    } else {
        let mean = completeness.iter().sum::<f64>() / completeness.len() as f64;
        (mean * 100.0 * 100.0).round() / 100.0
    };
    QualityOutcome {
        issues,
        quality_score,
    }
}

fn duplicate_rows(frame: &FrameView) -> Option<Issue> {
    let mut seen: HashSet<Vec<&str>> = HashSet::new();
    let mut duplicates = Findings::default();
    for row in 0..frame.height() {
        let cells = frame.row(row);
        if !seen.insert(cells) {
            duplicates.record(row, "");
        }
    }
    let count = duplicates.count();
    duplicates.into_issue(
        "DQ005",
        Severity::Warning,
        None,
        format!("{count} row(s) duplicate an earlier row"),
    )
}
