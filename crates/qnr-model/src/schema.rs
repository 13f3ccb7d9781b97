//! Serde model of the dataset schema document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::field::FieldType;

/// Keys every schema document must carry at the top level.
pub const REQUIRED_SCHEMA_KEYS: &[&str] =
    &["name", "version", "schema", "quality_rules", "transformations"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaDocument {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: Option<String>,
    pub schema: SchemaBody,
    pub quality_rules: Vec<QualityRule>,
    pub transformations: Vec<Transformation>,
}

impl SchemaDocument {
    pub fn field_names(&self) -> Vec<&str> {
        self.schema
            .fields
            .iter()
            .map(|field| field.name.as_str())
            .collect()
    }

    pub fn field(&self, name: &str) -> Option<&SchemaField> {
        self.schema.fields.iter().find(|field| field.name == name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaBody {
    pub fields: Vec<SchemaField>,
    #[serde(default)]
    pub primary_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub constraints: Option<FieldConstraints>,
    #[serde(default)]
    pub missing_value: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldConstraints {
    #[serde(default)]
    pub minimum: Option<f64>,
    #[serde(default)]
    pub maximum: Option<f64>,
    #[serde(default, rename = "enum")]
    pub allowed: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityRule {
    pub name: String,
    #[serde(default)]
    pub field: Option<String>,
    pub rule: String,
    #[serde(default)]
    pub severity: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transformation {
    pub name: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub targets: Vec<String>,
    pub description: String,
    #[serde(default)]
    pub mapping: BTreeMap<String, String>,
}
