//! Declaration types.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// A validated template declaration as read from a declaration file.
///
/// `name` is derived from the base filename of `source`; it is never
/// read from the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationSpec {
    pub name: String,
    /// Template text file.
    pub source: PathBuf,
    /// File the rendered output is written to.
    pub destination: PathBuf,
    /// Shell command run after a successful write. `None` when absent or empty.
    pub action: Option<String>,
}

impl DeclarationSpec {
    /// Build a spec from its parts, deriving `name` from `source`.
    pub fn new(
        source: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
        action: Option<String>,
    ) -> Self {
        let source = source.into();
        Self {
            name: name_from_source(&source),
            source,
            destination: destination.into(),
            action: action.filter(|a| !a.trim().is_empty()),
        }
    }
}

/// On-disk shape of a declaration file. Unknown keys are ignored.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawDeclaration {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
}

/// Base filename component of `source`, or the whole path when it has none.
pub fn name_from_source(source: &Path) -> String {
    source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_base_filename_of_source() {
        let spec = DeclarationSpec::new("/etc/tpl/haproxy.cfg.tmpl", "/etc/haproxy.cfg", None);
        assert_eq!(spec.name, "haproxy.cfg.tmpl");
    }

    #[test]
    fn blank_action_becomes_none() {
        let spec = DeclarationSpec::new("a.tmpl", "a.out", Some("   ".to_string()));
        assert!(spec.action.is_none());
    }
}
