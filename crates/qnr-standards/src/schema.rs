//! Schema document loading and shape validation.

use std::path::Path;

use qnr_model::schema::REQUIRED_SCHEMA_KEYS;
use qnr_model::SchemaDocument;
use serde_json::Value;
use tracing::debug;

use crate::error::StandardsError;
use crate::json::{load_json_value, missing_keys};

/// Type names a schema field may declare.
pub const VALID_FIELD_TYPES: [&str; 7] = [
    "string",
    "integer",
    "float",
    "binary",
    "datetime",
    "categorical",
    "text",
];

pub fn load_schema(path: &Path) -> Result<SchemaDocument, StandardsError> {
    let value = load_json_value(path)?;
    let schema = schema_from_value(path, value)?;
    debug!(
        path = %path.display(),
        fields = schema.schema.fields.len(),
        "loaded schema"
    );
    Ok(schema)
}

/// Validate the shape of a parsed schema document, then deserialize it.
///
/// Shape problems are reported by key or field name rather than as serde errors.
pub fn schema_from_value(path: &Path, value: Value) -> Result<SchemaDocument, StandardsError> {
    if let Some(key) = missing_keys(&value, REQUIRED_SCHEMA_KEYS).first() {
        return Err(StandardsError::MissingKey {
            path: path.to_path_buf(),
            key: (*key).to_string(),
        });
    }
    let invalid = |message: String| StandardsError::InvalidSchema {
        path: path.to_path_buf(),
        message,
    };

    let fields = value
        .get("schema")
        .and_then(|schema| schema.get("fields"))
        .and_then(Value::as_array)
        .ok_or_else(|| invalid("`schema.fields` must be a list".to_string()))?;
    if fields.is_empty() {
        return Err(invalid("`schema.fields` is empty".to_string()));
    }
    for (index, field) in fields.iter().enumerate() {
        let name = field
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid(format!("field #{index} has no `name`")))?;
        let type_name = field
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid(format!("field `{name}` has no `type`")))?;
        if !VALID_FIELD_TYPES.contains(&type_name) {
            return Err(invalid(format!(
                "field `{name}` has invalid type `{type_name}` (expected one of {})",
                VALID_FIELD_TYPES.join(", ")
            )));
        }
    }
    for key in ["quality_rules", "transformations"] {
        if !value.get(key).is_some_and(Value::is_array) {
            return Err(invalid(format!("`{key}` must be a list")));
        }
    }

    serde_json::from_value(value).map_err(|e| StandardsError::Json {
        path: path.to_path_buf(),
        source: e,
    })
}
