//! Whole-deliverable verification.
//!
//! Walks a workspace laid out per [`DeliverableConfig`] and records one
//! [`CheckOutcome`] per structural or cross-reference check. Verification
//! never stops at the first problem; a missing artifact fails its own checks
//! and skips the checks that depend on it.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use qnr_ingest::{CsvTable, read_csv_table, table_to_frame};
use qnr_model::manifest::{
    QUALITY_ASSURANCE_KEYS, REQUIRED_ARCHIVE_MANIFEST_KEYS, REQUIRED_DATASET_MANIFEST_KEYS,
};
use qnr_model::{
    ArchiveManifest, CheckResult, CheckStatus, CleaningManifest, ComponentRef, FileRecord,
    InspectionReport, RecipeManifest, SchemaDocument,
};
use qnr_standards::{
    DeliverableConfig, Layout, Plan, SectionRequirement, load_json, load_json_value,
    load_schema, missing_keys, parse_plan, sha256_file, sha256_hex,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, info_span};

use crate::inspector::QuestionnaireInspector;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VerifyArea {
    Structure,
    Plan,
    Schema,
    Records,
    Manifest,
    Report,
    Registry,
}

impl VerifyArea {
    pub const ALL: [VerifyArea; 7] = [
        VerifyArea::Structure,
        VerifyArea::Plan,
        VerifyArea::Schema,
        VerifyArea::Records,
        VerifyArea::Manifest,
        VerifyArea::Report,
        VerifyArea::Registry,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            VerifyArea::Structure => "Structure",
            VerifyArea::Plan => "Plan",
            VerifyArea::Schema => "Schema",
            VerifyArea::Records => "Records",
            VerifyArea::Manifest => "Manifest",
            VerifyArea::Report => "Report",
            VerifyArea::Registry => "Registry",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckOutcome {
    pub area: VerifyArea,
    pub name: String,
    pub status: CheckStatus,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliverableReport {
    pub root: PathBuf,
    pub checks: Vec<CheckOutcome>,
    /// Inspector results on the cleaned records, when they could be run.
    pub inspection: Option<InspectionReport>,
}

impl DeliverableReport {
    pub fn status(&self) -> CheckStatus {
        self.checks
            .iter()
            .map(|check| check.status)
            .max()
            .unwrap_or(CheckStatus::Passed)
    }

    pub fn count(&self, status: CheckStatus) -> usize {
        self.checks
            .iter()
            .filter(|check| check.status == status)
            .count()
    }

    pub fn has_failures(&self) -> bool {
        self.count(CheckStatus::Failed) > 0
    }

    pub fn area(&self, area: VerifyArea) -> impl Iterator<Item = &CheckOutcome> {
        self.checks.iter().filter(move |check| check.area == area)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.checks
            .iter()
            .filter(|check| check.status == CheckStatus::Failed)
    }

    /// Look up a check by area and name.
    pub fn find(&self, area: VerifyArea, name: &str) -> Option<&CheckOutcome> {
        self.area(area).find(|check| check.name == name)
    }
}

/// Verify every artifact of the deliverable rooted at `root`.
pub fn verify_deliverable(root: &Path, config: &DeliverableConfig) -> DeliverableReport {
    let span = info_span!("verify", root = %root.display());
    let _guard = span.enter();
    let start = Instant::now();

    let mut verifier = Verifier {
        root,
        config,
        checks: Vec::new(),
        inspection: None,
    };
    verifier.structure();
    let plan = verifier.plan();
    let schema = verifier.schema(plan.as_ref());
    verifier.records(plan.as_ref(), schema.as_ref());
    verifier.manifests();
    verifier.report();
    verifier.registry();

    let report = DeliverableReport {
        root: root.to_path_buf(),
        checks: verifier.checks,
        inspection: verifier.inspection,
    };
    info!(
        checks = report.checks.len(),
        failed = report.count(CheckStatus::Failed),
        warnings = report.count(CheckStatus::Warning),
        duration_ms = start.elapsed().as_millis(),
        "verification complete"
    );
    report
}

struct Verifier<'a> {
    root: &'a Path,
    config: &'a DeliverableConfig,
    checks: Vec<CheckOutcome>,
    inspection: Option<InspectionReport>,
}

impl Verifier<'_> {
    fn record(&mut self, area: VerifyArea, name: &str, status: CheckStatus, detail: String) {
        debug!(area = area.label(), check = name, status = %status, "{detail}");
        self.checks.push(CheckOutcome {
            area,
            name: name.to_string(),
            status,
            detail,
        });
    }

    fn pass(&mut self, area: VerifyArea, name: &str, detail: impl Into<String>) {
        self.record(area, name, CheckStatus::Passed, detail.into());
    }

    fn warn(&mut self, area: VerifyArea, name: &str, detail: impl Into<String>) {
        self.record(area, name, CheckStatus::Warning, detail.into());
    }

    fn fail(&mut self, area: VerifyArea, name: &str, detail: impl Into<String>) {
        self.record(area, name, CheckStatus::Failed, detail.into());
    }

    fn verdict(&mut self, area: VerifyArea, name: &str, ok: bool, pass: String, fail: String) {
        if ok {
            self.pass(area, name, pass);
        } else {
            self.fail(area, name, fail);
        }
    }

    fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Record an existence check and read the file as text when present.
    fn read_text(&mut self, area: VerifyArea, name: &str, relative: &str) -> Option<String> {
        let path = self.path(relative);
        if !path.is_file() {
            self.fail(area, name, format!("{relative} not found"));
            return None;
        }
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                self.pass(area, name, relative.to_string());
                Some(text)
            }
            Err(err) => {
                self.fail(area, name, format!("{relative}: {err}"));
                None
            }
        }
    }

    fn structure(&mut self) {
        let config = self.config;
        let missing: Vec<&str> = config
            .layout
            .required_dirs
            .iter()
            .map(String::as_str)
            .filter(|dir| !self.root.join(dir).is_dir())
            .collect();
        let total = config.layout.required_dirs.len();
        let detail = format!("missing: {}", missing.join(", "));
        self.verdict(
            VerifyArea::Structure,
            "required directories",
            missing.is_empty(),
            format!("{total} directories present"),
            detail,
        );
    }

    fn plan(&mut self) -> Option<Plan> {
        let area = VerifyArea::Plan;
        let relative = self.config.layout.plan.clone();
        let text = self.read_text(area, "plan exists", &relative)?;

        let requirements = self.config.plan_sections.clone();
        self.sections(area, "section", &requirements, &text);

        let plan = match parse_plan(&text) {
            Ok(plan) => {
                self.pass(
                    area,
                    "field definitions",
                    format!("{} fields, {} rules", plan.fields.len(), plan.rules.len()),
                );
                plan
            }
            Err(err) => {
                self.fail(area, "field definitions", err.to_string());
                return None;
            }
        };
        if plan.unparsed_rules.is_empty() {
            self.pass(area, "business rules", format!("{} parsed", plan.rules.len()));
        } else {
            self.warn(
                area,
                "business rules",
                format!("not understood: {}", plan.unparsed_rules.join("; ")),
            );
        }
        Some(plan)
    }

    fn sections(
        &mut self,
        area: VerifyArea,
        prefix: &str,
        requirements: &[SectionRequirement],
        text: &str,
    ) {
        for requirement in requirements {
            let name = format!("{prefix}: {}", requirement.name);
            self.verdict(
                area,
                &name,
                requirement.is_satisfied_by(text),
                "present".to_string(),
                format!("none of: {}", requirement.any_of.join(" | ")),
            );
        }
    }

    fn schema(&mut self, plan: Option<&Plan>) -> Option<SchemaDocument> {
        let area = VerifyArea::Schema;
        let relative = self.config.layout.schema.clone();
        let path = self.path(&relative);
        if !path.is_file() {
            self.fail(area, "schema exists", format!("{relative} not found"));
            return None;
        }
        self.pass(area, "schema exists", relative);
        let schema = match load_schema(&path) {
            Ok(schema) => {
                self.pass(
                    area,
                    "schema shape",
                    format!("{} fields", schema.schema.fields.len()),
                );
                schema
            }
            Err(err) => {
                self.fail(area, "schema shape", err.to_string());
                return None;
            }
        };

        if let Some(plan) = plan {
            let mut problems = Vec::new();
            for field in &plan.fields {
                match schema.field(&field.name) {
                    None => problems.push(format!("`{}` not in schema", field.name)),
                    Some(declared) if declared.field_type != field.field_type => {
                        problems.push(format!(
                            "`{}` is {} in the plan but {} in the schema",
                            field.name, field.field_type, declared.field_type
                        ));
                    }
                    Some(_) => {}
                }
            }
            if problems.is_empty() {
                self.pass(area, "plan agreement", "field types agree");
            } else {
                self.warn(area, "plan agreement", problems.join("; "));
            }
        }
        Some(schema)
    }

    fn read_table(&mut self, name: &str, relative: &str) -> Option<CsvTable> {
        let area = VerifyArea::Records;
        let path = self.path(relative);
        if !path.is_file() {
            self.fail(area, name, format!("{relative} not found"));
            return None;
        }
        match read_csv_table(&path) {
            Ok(table) => {
                self.pass(
                    area,
                    name,
                    format!("{relative}: {} rows, {} columns", table.row_count(), table.headers.len()),
                );
                Some(table)
            }
            Err(err) => {
                self.fail(area, name, format!("{relative}: {err:#}"));
                None
            }
        }
    }

    fn records(&mut self, plan: Option<&Plan>, schema: Option<&SchemaDocument>) {
        let area = VerifyArea::Records;
        let raw = self.config.layout.raw_records.clone();
        let cleaned = self.config.layout.cleaned_records.clone();
        self.read_table("raw records", &raw);
        let Some(table) = self.read_table("cleaned records", &cleaned) else {
            return;
        };
        self.verdict(
            area,
            "cleaned records non-empty",
            !table.is_empty(),
            format!("{} rows", table.row_count()),
            "no data rows".to_string(),
        );

        let expected: Option<Vec<&str>> = schema
            .map(SchemaDocument::field_names)
            .or_else(|| plan.map(Plan::field_names));
        if let Some(expected) = expected {
            let actual: BTreeSet<&str> = table.headers.iter().map(String::as_str).collect();
            let wanted: BTreeSet<&str> = expected.iter().copied().collect();
            let missing: Vec<&str> = wanted.difference(&actual).copied().collect();
            let extra: Vec<&str> = actual.difference(&wanted).copied().collect();
            let mut detail = Vec::new();
            if !missing.is_empty() {
                detail.push(format!("missing: {}", missing.join(", ")));
            }
            if !extra.is_empty() {
                detail.push(format!("unexpected: {}", extra.join(", ")));
            }
            self.verdict(
                area,
                "columns match schema",
                detail.is_empty(),
                format!("{} columns", actual.len()),
                detail.join("; "),
            );
        }

        let Some(plan) = plan else {
            return;
        };
        let frame = match table_to_frame(&table) {
            Ok(frame) => frame,
            Err(err) => {
                self.fail(area, "inspection", format!("{err:#}"));
                return;
            }
        };
        let inspector = QuestionnaireInspector::from_plan(plan.clone())
            .with_settings(self.config.inspection.clone());
        let dataset = Path::new(&cleaned)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| cleaned.clone());
        let inspection = inspector.inspect(&dataset, &frame);
        for result in inspection.results() {
            self.inspection_outcome(result);
        }
        self.inspection = Some(inspection);
    }

    fn inspection_outcome(&mut self, result: &CheckResult) {
        let mut detail = format!(
            "{} errors, {} warnings",
            result.error_count(),
            result.warning_count()
        );
        if let Some(score) = result.quality_score {
            detail.push_str(&format!(", quality score {score:.2}"));
        }
        if let Some(first) = result.issues.first() {
            detail.push_str(&format!("; {}: {}", first.code, first.message));
        }
        self.record(
            VerifyArea::Records,
            result.check.label(),
            result.status,
            detail,
        );
    }

    fn manifests(&mut self) {
        let layout: Layout = self.config.layout.clone();
        self.dataset_manifest(&layout.dataset_manifest);
        self.cleaning_manifest(&layout.cleaning_manifest);
        self.recipe_manifest(&layout.recipe_manifest);
    }

    fn load_value(&mut self, name: &str, relative: &str) -> Option<Value> {
        let area = VerifyArea::Manifest;
        let path = self.path(relative);
        if !path.is_file() {
            self.fail(area, name, format!("{relative} not found"));
            return None;
        }
        match load_json_value(&path) {
            Ok(value) => {
                self.pass(area, name, relative.to_string());
                Some(value)
            }
            Err(err) => {
                self.fail(area, name, err.to_string());
                None
            }
        }
    }

    fn dataset_manifest(&mut self, relative: &str) {
        let area = VerifyArea::Manifest;
        let Some(value) = self.load_value("dataset manifest", relative) else {
            return;
        };

        let missing = missing_keys(&value, REQUIRED_DATASET_MANIFEST_KEYS);
        self.verdict(
            area,
            "dataset manifest keys",
            missing.is_empty(),
            REQUIRED_DATASET_MANIFEST_KEYS.join(", "),
            format!("missing: {}", missing.join(", ")),
        );

        let columns = value
            .get("stats")
            .and_then(|stats| stats.get("columns"))
            .and_then(Value::as_array)
            .map_or(0, Vec::len);
        self.verdict(
            area,
            "dataset manifest columns",
            columns > 0,
            format!("{columns} columns"),
            "`stats.columns` is missing or empty".to_string(),
        );

        match value.get("quality_assurance") {
            Some(qa) => {
                let missing = missing_keys(qa, QUALITY_ASSURANCE_KEYS);
                self.verdict(
                    area,
                    "quality assurance",
                    missing.is_empty(),
                    QUALITY_ASSURANCE_KEYS.join(", "),
                    format!("missing: {}", missing.join(", ")),
                );
            }
            None => self.fail(area, "quality assurance", "`quality_assurance` is missing"),
        }

        let Some(components) = value.get("components") else {
            return;
        };
        let Some(components) = components.as_object() else {
            self.fail(area, "dataset components", "`components` is not an object");
            return;
        };
        for (name, component) in components {
            let check = format!("dataset component: {name}");
            match serde_json::from_value::<ComponentRef>(component.clone()) {
                Ok(component) => self.component(&check, &component),
                Err(err) => self.fail(area, &check, format!("unreadable entry: {err}")),
            }
        }
    }

    fn cleaning_manifest(&mut self, relative: &str) {
        let area = VerifyArea::Manifest;
        let path = self.path(relative);
        if !path.is_file() {
            self.fail(area, "cleaning manifest", format!("{relative} not found"));
            return;
        }
        let manifest: CleaningManifest = match load_json(&path) {
            Ok(manifest) => manifest,
            Err(err) => {
                self.fail(area, "cleaning manifest", err.to_string());
                return;
            }
        };
        self.pass(
            area,
            "cleaning manifest",
            format!(
                "{} -> {} rows, {} duplicates removed",
                manifest.records.input, manifest.records.output, manifest.records.duplicates_removed
            ),
        );
        self.file_record("cleaning input", &manifest.input);
        self.file_record("cleaning output", &manifest.output);
    }

    fn recipe_manifest(&mut self, relative: &str) {
        let area = VerifyArea::Manifest;
        let path = self.path(relative);
        if !path.is_file() {
            self.fail(area, "recipe manifest", format!("{relative} not found"));
            return;
        }
        let manifest: RecipeManifest = match load_json(&path) {
            Ok(manifest) => manifest,
            Err(err) => {
                self.fail(area, "recipe manifest", err.to_string());
                return;
            }
        };
        self.pass(
            area,
            "recipe manifest",
            format!("{} {}", manifest.name, manifest.version),
        );
        for (name, component) in &manifest.components {
            self.component(&format!("recipe component: {name}"), component);
        }
    }

    /// A referenced file must exist and match its checksum when one is given.
    fn component(&mut self, name: &str, component: &ComponentRef) {
        self.checksum(name, &component.path, component.sha256.as_deref());
    }

    fn file_record(&mut self, name: &str, record: &FileRecord) {
        self.checksum(name, &record.path, Some(record.sha256.as_str()));
    }

    fn checksum(&mut self, name: &str, relative: &str, expected: Option<&str>) {
        let area = VerifyArea::Manifest;
        let path = self.path(relative);
        if !path.is_file() {
            self.fail(area, name, format!("{relative} not found"));
            return;
        }
        let Some(expected) = expected else {
            self.pass(area, name, format!("{relative} exists"));
            return;
        };
        match sha256_file(&path) {
            Ok(actual) if actual.eq_ignore_ascii_case(expected.trim()) => {
                self.pass(area, name, format!("{relative} sha256 matches"));
            }
            Ok(actual) => self.fail(
                area,
                name,
                format!("{relative} sha256 mismatch (expected {expected}, got {actual})"),
            ),
            Err(err) => self.fail(area, name, err.to_string()),
        }
    }

    fn report(&mut self) {
        let area = VerifyArea::Report;
        let relative = self.config.layout.report.clone();
        let Some(text) = self.read_text(area, "report exists", &relative) else {
            return;
        };
        let sections = self.config.report_sections.clone();
        self.sections(area, "section", &sections, &text);

        let table_text: String = text
            .lines()
            .filter(|line| line.trim_start().starts_with('|'))
            .collect::<Vec<_>>()
            .join("\n");
        let tables = self.config.report_tables.clone();
        self.sections(area, "table", &tables, &table_text);

        let deliverables = self.config.report_deliverables.clone();
        self.sections(area, "deliverable", &deliverables, &text);
    }

    fn registry(&mut self) {
        let layout = self.config.layout.clone();
        self.archive("dataset archive", &layout.dataset_archive);
        self.archive("recipe archive", &layout.recipe_archive);
    }

    fn archive(&mut self, name: &str, relative: &str) {
        let area = VerifyArea::Registry;
        let archive_path = self.path(relative);
        if !archive_path.is_file() {
            self.fail(area, name, format!("{relative} not found"));
            return;
        }
        self.pass(area, name, relative.to_string());

        let manifest_relative = Layout::archive_manifest(relative);
        let manifest_name = format!("{name} manifest");
        let manifest_path = self.path(&manifest_relative);
        if !manifest_path.is_file() {
            self.fail(area, &manifest_name, format!("{manifest_relative} not found"));
            return;
        }
        let value = match load_json_value(&manifest_path) {
            Ok(value) => value,
            Err(err) => {
                self.fail(area, &manifest_name, err.to_string());
                return;
            }
        };
        let missing = missing_keys(&value, REQUIRED_ARCHIVE_MANIFEST_KEYS);
        if !missing.is_empty() {
            self.fail(
                area,
                &manifest_name,
                format!("missing: {}", missing.join(", ")),
            );
            return;
        }
        let manifest: ArchiveManifest = match serde_json::from_value(value) {
            Ok(manifest) => manifest,
            Err(err) => {
                self.fail(area, &manifest_name, err.to_string());
                return;
            }
        };
        self.pass(area, &manifest_name, manifest_relative);

        let checksum_name = format!("{name} checksum");
        match sha256_file(&archive_path) {
            Ok(actual) => self.verdict(
                area,
                &checksum_name,
                actual.eq_ignore_ascii_case(manifest.archive_checksum.trim()),
                "archive_checksum matches".to_string(),
                format!(
                    "archive_checksum {} does not match {actual}",
                    manifest.archive_checksum
                ),
            ),
            Err(err) => self.fail(area, &checksum_name, err.to_string()),
        }

        let contents_name = format!("{name} contents");
        match archive_problems(&archive_path, &manifest) {
            Ok(problems) if problems.is_empty() => self.pass(
                area,
                &contents_name,
                format!("{} entries verified", manifest.files.len()),
            ),
            Ok(problems) => self.fail(area, &contents_name, problems.join("; ")),
            Err(err) => self.fail(area, &contents_name, format!("{err:#}")),
        }
    }
}

/// Entries listed in the manifest that are absent from the ZIP or differ from it.
fn archive_problems(path: &Path, manifest: &ArchiveManifest) -> anyhow::Result<Vec<String>> {
    let file = File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)?;
    let mut problems = Vec::new();
    for entry in &manifest.files {
        let mut zipped = match archive.by_name(&entry.path) {
            Ok(zipped) => zipped,
            Err(_) => {
                problems.push(format!("{} not in archive", entry.path));
                continue;
            }
        };
        let mut bytes = Vec::new();
        zipped.read_to_end(&mut bytes)?;
        let actual = sha256_hex(&bytes);
        if !actual.eq_ignore_ascii_case(&entry.sha256) {
            problems.push(format!("{} sha256 mismatch", entry.path));
        }
    }
    Ok(problems)
}
