//! Error types for metaform-sync.

use std::path::PathBuf;

use thiserror::Error;

use metaform_core::DeclarationError;
use metaform_renderer::RenderError;

/// All errors that can arise from loading or applying declarations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An error from the rendering engine.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// A declaration file could not be loaded.
    #[error("declaration error: {0}")]
    Declaration(#[from] DeclarationError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
