//! The questionnaire inspector.
//!
//! Field definitions and business rules come from the cleaning plan; each
//! pass returns a [`CheckResult`] whose status is `failed` when any error
//! issue was found.

use std::path::Path;
use std::time::Instant;

use polars::prelude::DataFrame;
use qnr_model::{BusinessRule, CheckKind, CheckResult, FieldDefinition, InspectionReport};
use qnr_standards::{InspectionSettings, Plan, StandardsError, load_plan};
use tracing::{info, info_span};

use crate::checks::{FrameView, business_rules, data_quality, schema_compliance};

#[derive(Debug, Clone)]
pub struct QuestionnaireInspector {
    plan: Plan,
    settings: InspectionSettings,
}

impl QuestionnaireInspector {
    /// Load the plan at `plan_path` and build an inspector from it.
    pub fn new(plan_path: &Path) -> Result<Self, StandardsError> {
        Ok(Self::from_plan(load_plan(plan_path)?))
    }

    pub fn from_plan(plan: Plan) -> Self {
        Self {
            plan,
            settings: InspectionSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: InspectionSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_datetime_format(mut self, format: impl Into<String>) -> Self {
        self.settings.datetime_format = format.into();
        self
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    pub fn field_definitions(&self) -> &[FieldDefinition] {
        &self.plan.fields
    }

    pub fn rules(&self) -> &[BusinessRule] {
        &self.plan.rules
    }

    pub fn validate_schema_compliance(&self, df: &DataFrame) -> CheckResult {
        self.schema_compliance(&FrameView::new(df))
    }

    pub fn validate_data_quality(&self, df: &DataFrame) -> CheckResult {
        self.data_quality(&FrameView::new(df))
    }

    pub fn validate_business_rules(&self, df: &DataFrame) -> CheckResult {
        self.business_rules(&FrameView::new(df))
    }

    /// Run all three passes over one dataset.
    pub fn inspect(&self, dataset: &str, df: &DataFrame) -> InspectionReport {
        let span = info_span!("inspect", dataset = %dataset, rows = df.height());
        let _guard = span.enter();
        let start = Instant::now();

        let frame = FrameView::new(df);
        let report = InspectionReport {
            dataset: dataset.to_string(),
            rows: frame.height(),
            columns: frame.columns().len(),
            schema_compliance: self.schema_compliance(&frame),
            data_quality: self.data_quality(&frame),
            business_rules: self.business_rules(&frame),
        };
        info!(
            status = %report.overall_status(),
            errors = report.error_count(),
            warnings = report.warning_count(),
            duration_ms = start.elapsed().as_millis(),
            "inspection complete"
        );
        report
    }

    fn schema_compliance(&self, frame: &FrameView) -> CheckResult {
        let issues =
            schema_compliance::check(&self.plan.fields, frame, &self.settings.datetime_format);
        CheckResult::from_issues(CheckKind::SchemaCompliance, issues)
    }

    fn data_quality(&self, frame: &FrameView) -> CheckResult {
        let outcome =
            data_quality::check(&self.plan.fields, frame, self.settings.missing_rate_threshold);
        CheckResult::from_issues(CheckKind::DataQuality, outcome.issues)
            .with_quality_score(outcome.quality_score)
    }

    fn business_rules(&self, frame: &FrameView) -> CheckResult {
        let issues = business_rules::check(&self.plan.rules, frame);
        CheckResult::from_issues(CheckKind::BusinessRules, issues)
    }
}
