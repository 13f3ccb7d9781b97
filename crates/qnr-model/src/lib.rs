pub mod conformance;
pub mod error;
pub mod field;
pub mod manifest;
pub mod processing;
pub mod rule;
pub mod schema;

pub use conformance::{CheckKind, CheckResult, CheckStatus, InspectionReport, Issue, Severity};
pub use error::{QnrError, Result};
pub use field::{FieldDefinition, FieldType, ValueDomain};
pub use manifest::{
    ArchiveEntry, ArchiveManifest, CleaningManifest, ColumnStat, ComponentRef, DatasetManifest,
    DatasetStats, FileRecord, QualityAssurance, RecipeManifest, RecordCounts,
};
pub use processing::CleaningStats;
pub use rule::{BusinessRule, CompareOp, Operand};
pub use schema::{QualityRule, SchemaBody, SchemaDocument, SchemaField, Transformation};
