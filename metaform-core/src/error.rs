//! Error types for metaform-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while discovering or loading declaration files.
#[derive(Debug, Error)]
pub enum DeclarationError {
    /// The declaration file could not be read.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load; includes file path and line context from serde_yaml.
    #[error("failed to parse declaration at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The declaration has no `source` template path.
    #[error("declaration at {path} has no `source`")]
    MissingSource { path: PathBuf },

    /// The declaration has no `destination` path.
    #[error("declaration at {path} has no `destination`")]
    MissingDestination { path: PathBuf },

    /// The discovery glob could not be compiled.
    #[error("invalid declaration pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> DeclarationError {
    DeclarationError::Io {
        path: path.into(),
        source,
    }
}
