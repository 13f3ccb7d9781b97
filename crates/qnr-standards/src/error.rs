#![deny(unsafe_code)]

use std::path::PathBuf;

/// Problems found while parsing a plan document, located by 1-based line.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("line {line}: invalid field definition: {message}")]
    InvalidField { line: usize, message: String },

    #[error("plan defines no fields")]
    NoFields,

    #[error("field `{name}` is defined more than once (line {line})")]
    DuplicateField { name: String, line: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum StandardsError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse TOML {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid plan {path}: {source}")]
    Plan {
        path: PathBuf,
        #[source]
        source: PlanError,
    },

    #[error("{path} is missing required key `{key}`")]
    MissingKey { path: PathBuf, key: String },

    #[error("invalid schema {path}: {message}")]
    InvalidSchema { path: PathBuf, message: String },

    #[error("sha256 mismatch for {path} (expected {expected}, got {actual})")]
    Sha256Mismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },
}

impl StandardsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
