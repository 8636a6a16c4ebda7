//! Error types for metaform-renderer.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from template rendering operations.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Tera template engine error (parse or render).
    #[error("template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// The render context is not a mapping.
    #[error("render context must be an object, got {kind}")]
    ContextNotObject { kind: &'static str },

    /// Filesystem error while reading a template source.
    #[error("template io error at {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    /// A function-table entry was called that does not exist.
    #[error("unknown template function '{0}'")]
    UnknownFunction(String),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io {
        path: path.into(),
        source,
    }
}
