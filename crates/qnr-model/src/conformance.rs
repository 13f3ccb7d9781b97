use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

/// Which inspection pass produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    SchemaCompliance,
    DataQuality,
    BusinessRules,
}

impl CheckKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckKind::SchemaCompliance => "schema_compliance",
            CheckKind::DataQuality => "data_quality",
            CheckKind::BusinessRules => "business_rules",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CheckKind::SchemaCompliance => "Schema compliance",
            CheckKind::DataQuality => "Data quality",
            CheckKind::BusinessRules => "Business rules",
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Passed,
    Warning,
    Failed,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Passed => "passed",
            CheckStatus::Warning => "warning",
            CheckStatus::Failed => "failed",
        }
    }

    pub fn from_issues(issues: &[Issue]) -> Self {
        if issues.iter().any(|issue| issue.severity == Severity::Error) {
            CheckStatus::Failed
        } else if issues.is_empty() {
            CheckStatus::Passed
        } else {
            CheckStatus::Warning
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, CheckStatus::Failed)
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single finding of an inspection pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Check code (e.g., "SC004").
    pub code: String,
    pub severity: Severity,
    /// Field the issue concerns (if applicable).
    pub field: Option<String>,
    /// Human-readable message describing the issue.
    pub message: String,
    /// Count of offending values or rows.
    pub count: Option<u64>,
    /// Sample of offending row indices (0-based).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<usize>,
}

impl Issue {
    pub fn new(code: &str, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            severity,
            field: None,
            message: message.into(),
            count: None,
            rows: Vec::new(),
        }
    }

    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Error, message)
    }

    pub fn warning(code: &str, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Warning, message)
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_rows(mut self, rows: Vec<usize>) -> Self {
        self.rows = rows;
        self
    }
}

/// Outcome of one inspection pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub check: CheckKind,
    pub status: CheckStatus,
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<f64>,
    pub issues: Vec<Issue>,
}

impl CheckResult {
    pub fn from_issues(check: CheckKind, issues: Vec<Issue>) -> Self {
        let status = CheckStatus::from_issues(&issues);
        Self {
            check,
            status,
            passed: !status.is_failed(),
            quality_score: None,
            issues,
        }
    }

    pub fn with_quality_score(mut self, score: f64) -> Self {
        self.quality_score = Some(score);
        self
    }

    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.severity == Severity::Warning)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn issues_for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a Issue> {
        self.issues
            .iter()
            .filter(move |issue| issue.field.as_deref() == Some(field))
    }
}

/// Combined result of all inspection passes over one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionReport {
    pub dataset: String,
    pub rows: usize,
    pub columns: usize,
    pub schema_compliance: CheckResult,
    pub data_quality: CheckResult,
    pub business_rules: CheckResult,
}

impl InspectionReport {
    pub fn results(&self) -> [&CheckResult; 3] {
        [
            &self.schema_compliance,
            &self.data_quality,
            &self.business_rules,
        ]
    }

    pub fn overall_status(&self) -> CheckStatus {
        self.results()
            .iter()
            .map(|result| result.status)
            .max()
            .unwrap_or(CheckStatus::Passed)
    }

    pub fn error_count(&self) -> usize {
        self.results().iter().map(|result| result.error_count()).sum()
    }

    pub fn warning_count(&self) -> usize {
        self.results()
            .iter()
            .map(|result| result.warning_count())
            .sum()
    }
}
