use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::StandardsError;

pub fn load_json_value(path: &Path) -> Result<Value, StandardsError> {
    let text = std::fs::read_to_string(path).map_err(|e| StandardsError::io(path, e))?;
    serde_json::from_str(&text).map_err(|e| StandardsError::Json {
        path: path.to_path_buf(),
        source: e,
    })
}

pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, StandardsError> {
    let value = load_json_value(path)?;
    serde_json::from_value(value).map_err(|e| StandardsError::Json {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Keys from `keys` that are not present on the JSON object.
/// A non-object value is missing every key.
pub fn missing_keys<'a>(value: &Value, keys: &[&'a str]) -> Vec<&'a str> {
    match value.as_object() {
        Some(object) => keys
            .iter()
            .copied()
            .filter(|key| !object.contains_key(*key))
            .collect(),
        None => keys.to_vec(),
    }
}

/// Write `value` as pretty-printed JSON with a trailing newline.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StandardsError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| StandardsError::io(parent, e))?;
    }
    let mut text = serde_json::to_string_pretty(value).map_err(|e| StandardsError::Json {
        path: path.to_path_buf(),
        source: e,
    })?;
    text.push('\n');
    std::fs::write(path, text).map_err(|e| StandardsError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reports_absent_keys_in_order() {
        let value = json!({"name": "x", "stats": {}});
        assert_eq!(
            missing_keys(&value, &["name", "version", "stats", "created_at"]),
            vec!["version", "created_at"]
        );
        assert_eq!(missing_keys(&json!([1, 2]), &["name"]), vec!["name"]);
    }
}
