//! Questionnaire deliverable outputs.
//!
//! - **markdown**: the human-readable cleaning report
//! - **schema**: schema document and field spec derived from the plan and recipe
//! - **manifest**: dataset, cleaning and recipe manifests with checksums
//! - **archive**: ZIP packages for the registry with their sidecar manifests

mod archive;
mod manifest;
mod markdown;
mod schema;

pub use archive::write_archive;
pub use manifest::{
    build_cleaning_manifest, build_dataset_manifest, build_recipe_manifest, column_stats,
};
pub use markdown::{ReportInput, render_cleaning_report};
pub use schema::{FieldSpec, build_field_spec, build_schema};
