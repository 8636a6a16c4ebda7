//! Declaration files: discovery and loading.
//!
//! A declaration file is a YAML mapping:
//!
//! ```yaml
//! source: /etc/metaform/templates/haproxy.cfg.tmpl
//! destination: /etc/haproxy/haproxy.cfg
//! action: "systemctl reload haproxy"
//! ```
//!
//! `source` and `destination` are required; `action` is optional. Unknown
//! keys are ignored.

use std::path::{Path, PathBuf};

use crate::error::{io_err, DeclarationError};
use crate::types::{DeclarationSpec, RawDeclaration};

// ---------------------------------------------------------------------------
// 1. Discovery
// ---------------------------------------------------------------------------

/// Expand `pattern` into declaration file paths, in lexical order.
///
/// Entries that cannot be read while walking the pattern are skipped.
/// Returns an empty list (not an error) when nothing matches.
pub fn discover(pattern: &str) -> Result<Vec<PathBuf>, DeclarationError> {
    let paths = glob::glob(pattern).map_err(|source| DeclarationError::Pattern {
        pattern: pattern.to_string(),
        source,
    })?;
    let mut files: Vec<PathBuf> = paths
        .filter_map(|p| p.ok())
        .filter(|p| p.is_file())
        .collect();
    files.sort();
    Ok(files)
}

// ---------------------------------------------------------------------------
// 2. Load
// ---------------------------------------------------------------------------

/// Read and validate the declaration file at `path`.
///
/// Returns `DeclarationError::Parse` (with path + line context) if the YAML is
/// malformed, `MissingSource` / `MissingDestination` if a required key is
/// absent or empty.
pub fn load_spec(path: &Path) -> Result<DeclarationSpec, DeclarationError> {
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    parse_spec(path, &contents)
}

/// Parse declaration `contents`; `path` is only used for error context.
pub fn parse_spec(path: &Path, contents: &str) -> Result<DeclarationSpec, DeclarationError> {
    let raw: RawDeclaration = serde_yaml::from_str(contents).map_err(|e| {
        DeclarationError::Parse {
            path: path.to_path_buf(),
            source: e,
        }
    })?;

    let source = non_empty(raw.source).ok_or_else(|| DeclarationError::MissingSource {
        path: path.to_path_buf(),
    })?;
    let destination =
        non_empty(raw.destination).ok_or_else(|| DeclarationError::MissingDestination {
            path: path.to_path_buf(),
        })?;

    Ok(DeclarationSpec::new(source, destination, raw.action))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
