//! Dry-run previews: what `apply` would write, as a unified diff.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;
use similar::TextDiff;

use metaform_renderer::{LabelDiagnostic, TemplateEngine};

use crate::{
    declaration::TemplateDeclaration,
    error::{io_err, SyncError},
    hash::content_hash,
    set::DeclarationSet,
};

/// Preview of a single declaration. No files are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub name: String,
    pub destination: PathBuf,
    /// `apply` would write: the rendered hash differs from the stored hash.
    pub would_write: bool,
    /// Unified diff from the on-disk destination to the rendered output;
    /// empty when they are identical.
    pub unified_diff: String,
    pub diagnostics: Vec<LabelDiagnostic>,
}

/// Render `declaration` against `data` and compare without side effects.
pub fn preview(
    declaration: &TemplateDeclaration,
    engine: &TemplateEngine,
    data: &Value,
) -> Result<Preview, SyncError> {
    let rendered = engine.render_file(declaration.name(), declaration.source(), data)?;
    let would_write = content_hash(rendered.content.as_bytes()) != declaration.content_hash();

    let destination = declaration.destination();
    let existing = read_existing_or_empty(destination)?;
    let unified_diff = if existing == rendered.content {
        String::new()
    } else {
        let old_header = format!("a/{}", destination.display());
        let new_header = format!("b/{}", destination.display());
        TextDiff::from_lines(&existing, &rendered.content)
            .unified_diff()
            .header(&old_header, &new_header)
            .context_radius(3)
            .to_string()
    };

    Ok(Preview {
        name: declaration.name().to_string(),
        destination: destination.to_path_buf(),
        would_write,
        unified_diff,
        diagnostics: rendered.diagnostics,
    })
}

impl DeclarationSet {
    /// Preview every declaration in order. Per-declaration errors are kept
    /// alongside the successes.
    pub fn preview_all(
        &self,
        engine: &TemplateEngine,
        data: &Value,
    ) -> Vec<(String, Result<Preview, SyncError>)> {
        self.iter()
            .map(|d| (d.name().to_string(), preview(d, engine, data)))
            .collect()
    }
}

fn read_existing_or_empty(path: &Path) -> Result<String, SyncError> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(err) => Err(io_err(path, err)),
    }
}
