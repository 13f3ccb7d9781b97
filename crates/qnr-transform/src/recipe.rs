//! Cleaning recipe (TOML).

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use qnr_model::Transformation;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningRecipe {
    pub recipe: RecipeInfo,
    /// Raw column name to output field name.
    #[serde(default)]
    pub rename: BTreeMap<String, String>,
    #[serde(default)]
    pub labels: Vec<LabelMap>,
    #[serde(default)]
    pub other: Option<OtherSpec>,
    #[serde(default)]
    pub multi_select: Option<MultiSelectSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeInfo {
    pub name: String,
    pub version: String,
    /// Output field identifying a respondent; repeated ids are dropped.
    #[serde(default)]
    pub id_column: Option<String>,
    /// Accepted raw timestamp formats, tried in order.
    #[serde(default = "default_input_formats")]
    pub datetime_formats: Vec<String>,
    #[serde(default = "default_output_format")]
    pub output_datetime_format: String,
}

/// Label-to-code map of a single-choice field. Labels match case-insensitively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelMap {
    pub field: String,
    pub values: BTreeMap<String, i64>,
}

impl LabelMap {
    pub fn lookup(&self, label: &str) -> Option<i64> {
        let wanted = label.trim();
        self.values
            .iter()
            .find(|(key, _)| key.trim().eq_ignore_ascii_case(wanted))
            .map(|(_, code)| *code)
    }
}

/// Free-text "other" answers of a coded field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtherSpec {
    pub field: String,
    pub code: i64,
    pub specify_field: String,
    #[serde(default = "default_other_prefixes")]
    pub prefixes: Vec<String>,
}

/// Multi-choice column split into one 0/1 column per option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiSelectSpec {
    pub source: String,
    #[serde(default = "default_separators")]
    pub separators: Vec<String>,
    #[serde(default)]
    pub none_labels: Vec<String>,
    /// Option label to output column.
    pub options: BTreeMap<String, String>,
}

fn default_input_formats() -> Vec<String> {
    vec![qnr_standards::config::DEFAULT_DATETIME_FORMAT.to_string()]
}

fn default_output_format() -> String {
    qnr_standards::config::DEFAULT_DATETIME_FORMAT.to_string()
}

fn default_other_prefixes() -> Vec<String> {
    vec!["other".to_string()]
}

fn default_separators() -> Vec<String> {
    [";", ",", "/", "|"].iter().map(|s| s.to_string()).collect()
}

impl CleaningRecipe {
    pub fn labels_for(&self, field: &str) -> Option<&LabelMap> {
        self.labels
            .iter()
            .find(|labels| labels.field.eq_ignore_ascii_case(field))
    }

    /// Output name of a raw column.
    pub fn target_name<'a>(&'a self, raw: &'a str) -> &'a str {
        self.rename
            .iter()
            .find(|(source, _)| source.eq_ignore_ascii_case(raw))
            .map(|(_, target)| target.as_str())
            .unwrap_or(raw)
    }

    /// Output fields produced by derivation rather than copied from a raw column.
    pub fn derived_fields(&self) -> Vec<&str> {
        let mut fields = Vec::new();
        if let Some(other) = &self.other {
            fields.push(other.specify_field.as_str());
        }
        if let Some(multi) = &self.multi_select {
            fields.extend(multi.options.values().map(String::as_str));
        }
        fields
    }

    /// Transformations the recipe applies, in execution order.
    pub fn transformations(&self) -> Vec<Transformation> {
        let mut out = Vec::new();
        if !self.rename.is_empty() {
            out.push(Transformation {
                name: "rename_columns".to_string(),
                source: None,
                targets: self.rename.values().cloned().collect(),
                description: "Rename raw columns to field names".to_string(),
                mapping: self.rename.clone(),
            });
        }
        out.push(Transformation {
            name: "normalize_datetime".to_string(),
            source: None,
            targets: Vec::new(),
            description: format!(
                "Parse timestamps as {} and write {}",
                self.recipe.datetime_formats.join(" or "),
                self.recipe.output_datetime_format
            ),
            mapping: BTreeMap::new(),
        });
        for labels in &self.labels {
            out.push(Transformation {
                name: "map_labels".to_string(),
                source: Some(labels.field.clone()),
                targets: vec![labels.field.clone()],
                description: format!("Code `{}` labels", labels.field),
                mapping: labels
                    .values
                    .iter()
                    .map(|(label, code)| (label.clone(), code.to_string()))
                    .collect(),
            });
        }
        if let Some(other) = &self.other {
            out.push(Transformation {
                name: "split_other".to_string(),
                source: Some(other.field.clone()),
                targets: vec![other.field.clone(), other.specify_field.clone()],
                description: format!(
                    "Other answers become code {} and their text moves to `{}`",
                    other.code, other.specify_field
                ),
                mapping: other
                    .prefixes
                    .iter()
                    .map(|prefix| (prefix.clone(), other.code.to_string()))
                    .collect(),
            });
        }
        if let Some(multi) = &self.multi_select {
            out.push(Transformation {
                name: "split_multi_select".to_string(),
                source: Some(multi.source.clone()),
                targets: multi.options.values().cloned().collect(),
                description: format!(
                    "Split `{}` on {} into 0/1 indicators",
                    multi.source,
                    multi.separators.join(" ")
                ),
                mapping: multi.options.clone(),
            });
        }
        out
    }

    fn validate(&self) -> Result<()> {
        if self.recipe.datetime_formats.is_empty() {
            bail!("recipe declares no datetime formats");
        }
        if let Some(multi) = &self.multi_select {
            if multi.options.is_empty() {
                bail!("multi_select `{}` declares no options", multi.source);
            }
            if multi.separators.iter().any(String::is_empty) {
                bail!("multi_select `{}` has an empty separator", multi.source);
            }
        }
        Ok(())
    }
}

pub fn parse_recipe(text: &str) -> Result<CleaningRecipe> {
    let recipe: CleaningRecipe = toml::from_str(text).context("parse cleaning recipe")?;
    recipe.validate()?;
    Ok(recipe)
}

pub fn load_recipe(path: &Path) -> Result<CleaningRecipe> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read recipe: {}", path.display()))?;
    let recipe = parse_recipe(&text).with_context(|| format!("load recipe: {}", path.display()))?;
    debug!(
        path = %path.display(),
        renames = recipe.rename.len(),
        label_maps = recipe.labels.len(),
        "loaded cleaning recipe"
    );
    Ok(recipe)
}
