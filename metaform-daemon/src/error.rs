use std::path::PathBuf;

use thiserror::Error;

/// Error surface for the daemon runtime, metadata client, and logging setup.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("declaration error: {0}")]
    Declaration(#[from] metaform_core::DeclarationError),

    #[error("metadata request to {endpoint} failed: {message}")]
    Metadata { endpoint: String, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("no template declarations loaded from '{pattern}'")]
    NoDeclarations { pattern: String },

    #[error("task failure: {0}")]
    Task(String),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> DaemonError {
    DaemonError::Io {
        path: path.into(),
        source,
    }
}
