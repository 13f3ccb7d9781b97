#![deny(unsafe_code)]

//! Deliverable layout and inspection settings (`qnr.toml`).

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StandardsError;

/// File name looked up at the workspace root when no explicit config is given.
pub const CONFIG_FILE_NAME: &str = "qnr.toml";

pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliverableConfig {
    pub package: PackageSettings,
    pub layout: Layout,
    pub inspection: InspectionSettings,
    /// Headings the plan must contain.
    pub plan_sections: Vec<SectionRequirement>,
    /// Sections the report must contain.
    pub report_sections: Vec<SectionRequirement>,
    /// Tables the report must contain, matched against table rows only.
    pub report_tables: Vec<SectionRequirement>,
    /// Deliverables the report must mention.
    pub report_deliverables: Vec<SectionRequirement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageSettings {
    pub name: String,
    pub version: String,
}

/// Workspace-relative locations of every deliverable artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    pub required_dirs: Vec<String>,
    pub plan: String,
    /// Field definitions exported from the plan as JSON.
    pub field_spec: String,
    pub recipe: String,
    /// Inspection report of the cleaned records.
    pub inspection_report: String,
    pub schema: String,
    pub raw_records: String,
    pub cleaned_records: String,
    pub dataset_manifest: String,
    pub cleaning_manifest: String,
    pub recipe_manifest: String,
    pub report: String,
    pub dataset_archive: String,
    pub recipe_archive: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectionSettings {
    pub datetime_format: String,
    /// Missing-rate above which a non-text field is flagged.
    pub missing_rate_threshold: f64,
}

/// A named requirement satisfied when the text contains any of the phrases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRequirement {
    pub name: String,
    pub any_of: Vec<String>,
}

impl SectionRequirement {
    pub fn new(name: &str, any_of: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            any_of: any_of.iter().map(|phrase| phrase.to_string()).collect(),
        }
    }

    pub fn is_satisfied_by(&self, text: &str) -> bool {
        self.any_of.iter().any(|phrase| text.contains(phrase.as_str()))
    }
}

impl Default for PackageSettings {
    fn default() -> Self {
        Self {
            name: "questionnaire_cleaning".to_string(),
            version: "1.0.0".to_string(),
        }
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            required_dirs: [
                "blueprint",
                "blueprint/plan",
                "blueprint/spec",
                "blueprint/processor",
                "blueprint/inspector",
                "catelog",
                "catelog/schema",
                "catelog/record",
                "factory",
                "factory/manifest",
                "factory/report",
                "registry",
                "registry/dataset",
                "registry/recipe",
            ]
            .iter()
            .map(|dir| dir.to_string())
            .collect(),
            plan: "blueprint/plan/questionnaire_cleaning_plan.md".to_string(),
            field_spec: "blueprint/spec/questionnaire_field_spec.json".to_string(),
            recipe: "blueprint/processor/questionnaire_recipe.toml".to_string(),
            inspection_report: "blueprint/inspector/questionnaire_inspection.json".to_string(),
            schema: "catelog/schema/questionnaire_schema.json".to_string(),
            raw_records: "catelog/record/questionnaire_raw.csv".to_string(),
            cleaned_records: "catelog/record/questionnaire_cleaned.csv".to_string(),
            dataset_manifest: "factory/manifest/questionnaire_dataset_manifest.json".to_string(),
            cleaning_manifest: "factory/manifest/questionnaire_cleaning_manifest.json".to_string(),
            recipe_manifest: "factory/manifest/questionnaire_cleaning_recipe_manifest.json"
                .to_string(),
            report: "factory/report/questionnaire_cleaning_report.md".to_string(),
            dataset_archive: "registry/dataset/questionnaire_cleaning_20260116.zip".to_string(),
            recipe_archive: "registry/recipe/questionnaire_cleaning_v1.0.zip".to_string(),
        }
    }
}

impl Layout {
    /// Sidecar manifest path of an archive (`<archive>_manifest.json`).
    pub fn archive_manifest(archive: &str) -> String {
        format!("{archive}_manifest.json")
    }

    /// Files packaged into the dataset archive.
    pub fn dataset_archive_entries(&self) -> Vec<&str> {
        vec![
            self.cleaned_records.as_str(),
            self.schema.as_str(),
            self.dataset_manifest.as_str(),
            self.cleaning_manifest.as_str(),
            self.inspection_report.as_str(),
            self.report.as_str(),
        ]
    }

    /// Files packaged into the recipe archive.
    pub fn recipe_archive_entries(&self) -> Vec<&str> {
        vec![
            self.plan.as_str(),
            self.field_spec.as_str(),
            self.recipe.as_str(),
            self.schema.as_str(),
            self.recipe_manifest.as_str(),
        ]
    }
}

impl Default for InspectionSettings {
    fn default() -> Self {
        Self {
            datetime_format: DEFAULT_DATETIME_FORMAT.to_string(),
            missing_rate_threshold: 0.5,
        }
    }
}

impl Default for DeliverableConfig {
    fn default() -> Self {
        Self {
            package: PackageSettings::default(),
            layout: Layout::default(),
            inspection: InspectionSettings::default(),
            plan_sections: vec![
                SectionRequirement::new("data model", &["## Data Model"]),
                SectionRequirement::new("processing flow", &["## Processing Flow"]),
            ],
            report_sections: vec![
                SectionRequirement::new("overview", &["## Overview", "# Overview"]),
                SectionRequirement::new("data overview", &["Data Overview", "Data Summary"]),
                SectionRequirement::new(
                    "transformations",
                    &["Data Transformations", "Transformation Notes"],
                ),
                SectionRequirement::new("statistics", &["Statistics", "Summary Statistics"]),
                SectionRequirement::new("quality checks", &["Quality"]),
            ],
            report_tables: vec![
                SectionRequirement::new("field definitions", &["Field name"]),
                SectionRequirement::new("transformation mapping", &["Transformation", "Mapping"]),
                SectionRequirement::new("missing values", &["Missing", "missing"]),
            ],
            report_deliverables: vec![
                SectionRequirement::new("dataset", &["Dataset", "dataset"]),
                SectionRequirement::new("schema", &["Schema", "schema"]),
                SectionRequirement::new("recipe", &["Recipe", "recipe", "Plan"]),
            ],
        }
    }
}

/// Load a config file. Keys absent from the file keep their defaults.
pub fn load_config(path: &Path) -> Result<DeliverableConfig, StandardsError> {
    let text = std::fs::read_to_string(path).map_err(|e| StandardsError::io(path, e))?;
    let config: DeliverableConfig = toml::from_str(&text).map_err(|e| StandardsError::Toml {
        path: path.to_path_buf(),
        source: e,
    })?;
    debug!(path = %path.display(), "loaded deliverable config");
    Ok(config)
}

impl DeliverableConfig {
    /// Load `<root>/qnr.toml` if present, otherwise the defaults.
    pub fn for_workspace(root: &Path) -> Result<Self, StandardsError> {
        let path = root.join(CONFIG_FILE_NAME);
        if path.is_file() {
            load_config(&path)
        } else {
            Ok(Self::default())
        }
    }
}
