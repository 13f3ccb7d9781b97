#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod hash;
pub mod json;
pub mod paths;
pub mod plan;
pub mod schema;

pub use crate::config::{
    CONFIG_FILE_NAME, DeliverableConfig, InspectionSettings, Layout, PackageSettings,
    SectionRequirement, load_config,
};
pub use crate::error::{PlanError, StandardsError};
pub use crate::hash::{sha256_file, sha256_hex, verify_sha256};
pub use crate::json::{load_json, load_json_value, missing_keys, write_json};
pub use crate::paths::{WORKSPACE_ENV_VAR, fixtures_workspace, workspace_root};
pub use crate::plan::{DEFAULT_MISSING_CODE, Plan, PlanSection, load_plan, parse_domain, parse_plan};
pub use crate::schema::{VALID_FIELD_TYPES, load_schema, schema_from_value};
