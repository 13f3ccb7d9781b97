//! Manifests describing a packaged deliverable.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::conformance::CheckStatus;
use crate::field::FieldType;

/// Top-level keys a dataset manifest must carry.
pub const REQUIRED_DATASET_MANIFEST_KEYS: &[&str] = &["name", "version", "created_at", "stats"];

/// Keys of the `quality_assurance` block of a dataset manifest.
pub const QUALITY_ASSURANCE_KEYS: &[&str] = &["schema_compliance", "data_quality", "business_rules"];

/// Keys a registry archive manifest must carry.
pub const REQUIRED_ARCHIVE_MANIFEST_KEYS: &[&str] = &["name", "version", "archive_checksum"];

/// Reference from a manifest to another deliverable file, relative to the workspace root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRef {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStat {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub missing: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetStats {
    pub rows: usize,
    pub columns: Vec<ColumnStat>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityAssurance {
    pub schema_compliance: CheckStatus,
    pub data_quality: CheckStatus,
    pub business_rules: CheckStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<f64>,
}

/// Manifest of the cleaned dataset deliverable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetManifest {
    pub name: String,
    pub version: String,
    pub created_at: String,
    #[serde(default)]
    pub description: Option<String>,
    pub stats: DatasetStats,
    #[serde(default)]
    pub components: BTreeMap<String, ComponentRef>,
    pub quality_assurance: QualityAssurance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: String,
    pub rows: usize,
    pub sha256: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordCounts {
    pub input: usize,
    pub output: usize,
    pub duplicates_removed: usize,
    pub missing_recoded: BTreeMap<String, usize>,
}

/// Manifest of one cleaning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningManifest {
    pub name: String,
    pub version: String,
    pub created_at: String,
    pub input: FileRecord,
    pub output: FileRecord,
    pub steps: Vec<String>,
    pub records: RecordCounts,
}

/// Manifest of the reusable cleaning recipe (plan, processor, inspector, schema).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeManifest {
    pub name: String,
    pub version: String,
    pub created_at: String,
    pub components: BTreeMap<String, ComponentRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveEntry {
    pub path: String,
    pub sha256: String,
    pub size: u64,
}

/// Sidecar manifest of a registry ZIP archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveManifest {
    pub name: String,
    pub version: String,
    pub created_at: String,
    pub archive: String,
    pub archive_checksum: String,
    pub files: Vec<ArchiveEntry>,
}
