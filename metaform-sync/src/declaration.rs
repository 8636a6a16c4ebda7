//! Template declarations and the render → hash → write → action cycle.
//!
//! ## `apply` protocol
//!
//! 1. Render `source` against the data snapshot. On failure: stop.
//! 2. SHA-256 hash the rendered bytes.
//! 3. Compare with the stored hash → stop if identical.
//! 4. Write the destination. On failure: stop, stored hash untouched.
//! 5. Store the new hash.
//! 6. Run the action, if any. Its result never rolls back 4 or 5.

use std::path::Path;

use serde_json::Value;

use metaform_core::{load_spec, DeclarationSpec};
use metaform_renderer::{LabelDiagnostic, RenderError, TemplateEngine};

use crate::action::{run_action, ActionOutcome};
use crate::error::SyncError;
use crate::hash::{content_hash, file_hash};
use crate::writer::write_destination;

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// What happened to one declaration during one apply.
#[derive(Debug)]
pub enum ApplyStatus {
    /// Rendered output matches the stored hash; nothing was touched.
    Unchanged { hash: String },
    /// Destination was rewritten and the stored hash advanced.
    Written {
        previous_hash: String,
        hash: String,
        action: ActionOutcome,
    },
    /// The template could not be read, parsed, or rendered.
    RenderFailed(RenderError),
    /// The destination could not be written; the stored hash is unchanged.
    WriteFailed(SyncError),
}

/// Result of [`TemplateDeclaration::apply`].
#[derive(Debug)]
pub struct ApplyOutcome {
    pub name: String,
    pub status: ApplyStatus,
    /// Diagnostics raised by template functions while rendering.
    pub diagnostics: Vec<LabelDiagnostic>,
}

impl ApplyOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self.status, ApplyStatus::Written { .. })
    }

    pub fn is_unchanged(&self) -> bool {
        matches!(self.status, ApplyStatus::Unchanged { .. })
    }

    /// True for render/write failures and for failed actions.
    pub fn is_failure(&self) -> bool {
        match &self.status {
            ApplyStatus::RenderFailed(_) | ApplyStatus::WriteFailed(_) => true,
            ApplyStatus::Written { action, .. } => action.is_failure(),
            ApplyStatus::Unchanged { .. } => false,
        }
    }
}

/// On-disk state of a destination relative to the stored hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestinationState {
    /// The destination file does not exist (or cannot be read).
    Missing,
    /// The destination matches the last applied content.
    InSync,
    /// The destination was modified outside this process.
    Drifted { on_disk_hash: String },
}

// ---------------------------------------------------------------------------
// TemplateDeclaration
// ---------------------------------------------------------------------------

/// One template: where it comes from, where it goes, what to run after, and
/// the hash of the content currently applied at the destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateDeclaration {
    spec: DeclarationSpec,
    content_hash: String,
}

impl TemplateDeclaration {
    /// Load the declaration file at `path` and seed the stored hash from the
    /// current destination contents.
    pub fn load(path: &Path) -> Result<Self, SyncError> {
        Ok(Self::from_spec(load_spec(path)?))
    }

    /// Seed the stored hash from the destination; empty when it does not exist.
    pub fn from_spec(spec: DeclarationSpec) -> Self {
        let content_hash = file_hash(&spec.destination).unwrap_or_default();
        Self { spec, content_hash }
    }

    pub fn spec(&self) -> &DeclarationSpec {
        &self.spec
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn source(&self) -> &Path {
        &self.spec.source
    }

    pub fn destination(&self) -> &Path {
        &self.spec.destination
    }

    pub fn action(&self) -> Option<&str> {
        self.spec.action.as_deref()
    }

    /// Hash of the last applied content (empty if nothing applied yet).
    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    /// Render and compare; on change, write and run the action.
    pub fn apply(&mut self, engine: &TemplateEngine, data: &Value) -> ApplyOutcome {
        let name = self.spec.name.clone();
        let rendered = match engine.render_file(&self.spec.name, &self.spec.source, data) {
            Ok(rendered) => rendered,
            Err(err) => {
                return ApplyOutcome {
                    name,
                    status: ApplyStatus::RenderFailed(err),
                    diagnostics: Vec::new(),
                }
            }
        };

        let hash = content_hash(rendered.content.as_bytes());
        if hash == self.content_hash {
            tracing::trace!("unchanged: {}", self.spec.destination.display());
            return ApplyOutcome {
                name,
                status: ApplyStatus::Unchanged { hash },
                diagnostics: rendered.diagnostics,
            };
        }

        if let Err(err) = write_destination(&self.spec.destination, rendered.content.as_bytes()) {
            return ApplyOutcome {
                name,
                status: ApplyStatus::WriteFailed(err),
                diagnostics: rendered.diagnostics,
            };
        }
        tracing::debug!("updating hash {} -> {}", self.content_hash, hash);
        let previous_hash = std::mem::replace(&mut self.content_hash, hash.clone());

        let action = match &self.spec.action {
            Some(command) => run_action(command),
            None => ActionOutcome::NotConfigured,
        };

        ApplyOutcome {
            name,
            status: ApplyStatus::Written {
                previous_hash,
                hash,
                action,
            },
            diagnostics: rendered.diagnostics,
        }
    }

    /// Compare the destination on disk with the stored hash.
    pub fn destination_state(&self) -> DestinationState {
        match file_hash(&self.spec.destination) {
            None => DestinationState::Missing,
            Some(h) if h == self.content_hash => DestinationState::InSync,
            Some(h) => DestinationState::Drifted { on_disk_hash: h },
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
    }

    impl Fixture {
        fn new(template: &str) -> Self {
            let dir = TempDir::new().unwrap();
            fs::write(dir.path().join("app.conf.tmpl"), template).unwrap();
            Self { dir }
        }

        fn path(&self, name: &str) -> PathBuf {
            self.dir.path().join(name)
        }

        /// Declaration whose action appends one line per invocation to `actions.log`.
        fn declaration(&self) -> TemplateDeclaration {
            let action = format!("echo fired >> '{}'", self.path("actions.log").display());
            TemplateDeclaration::from_spec(DeclarationSpec::new(
                self.path("app.conf.tmpl"),
                self.path("app.conf"),
                Some(action),
            ))
        }

        fn action_count(&self) -> usize {
            fs::read_to_string(self.path("actions.log"))
                .map(|s| s.lines().count())
                .unwrap_or(0)
        }
    }

    #[test]
    fn first_apply_writes_and_fires_action() {
        let fx = Fixture::new("port={{ port }}");
        let mut decl = fx.declaration();
        assert_eq!(decl.content_hash(), "");

        let outcome = decl.apply(&TemplateEngine::new(), &json!({"port": 80}));
        assert!(outcome.is_written(), "got: {outcome:?}");
        assert_eq!(fs::read_to_string(fx.path("app.conf")).unwrap(), "port=80");
        assert_eq!(decl.content_hash(), content_hash(b"port=80"));
        assert_eq!(fx.action_count(), 1);
    }

    #[test]
    fn second_apply_with_same_data_is_inert() {
        let fx = Fixture::new("port={{ port }}");
        let mut decl = fx.declaration();
        let engine = TemplateEngine::new();
        let data = json!({"port": 80});

        assert!(decl.apply(&engine, &data).is_written());
        let second = decl.apply(&engine, &data);
        assert!(second.is_unchanged(), "got: {second:?}");
        assert_eq!(fx.action_count(), 1);
    }

    #[test]
    fn writes_only_when_rendered_content_changes() {
        let fx = Fixture::new("port={{ port }}");
        let mut decl = fx.declaration();
        let engine = TemplateEngine::new();

        let written: Vec<bool> = [80, 80, 81, 81]
            .iter()
            .map(|port| decl.apply(&engine, &json!({ "port": port })).is_written())
            .collect();
        assert_eq!(written, vec![true, false, true, false]);
        assert_eq!(fx.action_count(), 2);
    }

    #[test]
    fn render_failure_leaves_state_untouched() {
        let fx = Fixture::new("{{ missing_variable }}");
        fs::write(fx.path("app.conf"), "previous").unwrap();
        let mut decl = fx.declaration();
        let before = decl.content_hash().to_string();

        let outcome = decl.apply(&TemplateEngine::new(), &json!({}));
        assert!(matches!(outcome.status, ApplyStatus::RenderFailed(_)));
        assert!(outcome.is_failure());
        assert_eq!(decl.content_hash(), before);
        assert_eq!(fs::read_to_string(fx.path("app.conf")).unwrap(), "previous");
        assert_eq!(fx.action_count(), 0);
    }

    #[test]
    fn failed_action_keeps_write_and_hash() {
        let fx = Fixture::new("v={{ v }}");
        let mut decl = TemplateDeclaration::from_spec(DeclarationSpec::new(
            fx.path("app.conf.tmpl"),
            fx.path("app.conf"),
            Some("exit 1".to_string()),
        ));

        let outcome = decl.apply(&TemplateEngine::new(), &json!({"v": 1}));
        match &outcome.status {
            ApplyStatus::Written { action, .. } => {
                assert!(matches!(action, ActionOutcome::Failed { code: Some(1), .. }));
            }
            other => panic!("expected written, got {other:?}"),
        }
        assert!(outcome.is_failure());
        assert_eq!(decl.content_hash(), content_hash(b"v=1"));
        assert_eq!(fs::read_to_string(fx.path("app.conf")).unwrap(), "v=1");
    }

    #[test]
    fn no_action_configured() {
        let fx = Fixture::new("x");
        let mut decl = TemplateDeclaration::from_spec(DeclarationSpec::new(
            fx.path("app.conf.tmpl"),
            fx.path("app.conf"),
            None,
        ));
        match decl.apply(&TemplateEngine::new(), &json!({})).status {
            ApplyStatus::Written { action, previous_hash, .. } => {
                assert_eq!(action, ActionOutcome::NotConfigured);
                assert_eq!(previous_hash, "");
            }
            other => panic!("expected written, got {other:?}"),
        }
    }

    #[test]
    fn diagnostics_are_returned_with_outcome() {
        let fx = Fixture::new("{{ get_int_value(labels=labels, name=\"n\", default=5) }}");
        let mut decl = fx.declaration();
        let outcome = decl.apply(&TemplateEngine::new(), &json!({"labels": {"n": "five"}}));
        assert!(outcome.is_written());
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(fs::read_to_string(fx.path("app.conf")).unwrap(), "5");
    }

    #[test]
    fn destination_state_tracks_drift() {
        let fx = Fixture::new("v={{ v }}");
        let mut decl = fx.declaration();
        assert_eq!(decl.destination_state(), DestinationState::Missing);

        decl.apply(&TemplateEngine::new(), &json!({"v": 1}));
        assert_eq!(decl.destination_state(), DestinationState::InSync);

        fs::write(fx.path("app.conf"), "hand edited").unwrap();
        assert!(matches!(decl.destination_state(), DestinationState::Drifted { .. }));
    }

    #[test]
    fn load_reads_declaration_file() {
        let fx = Fixture::new("x");
        fs::write(fx.path("app.conf"), "existing").unwrap();
        let decl_path = fx.path("app.yml");
        fs::write(
            &decl_path,
            format!(
                "source: {}\ndestination: {}\n",
                fx.path("app.conf.tmpl").display(),
                fx.path("app.conf").display()
            ),
        )
        .unwrap();

        let decl = TemplateDeclaration::load(&decl_path).unwrap();
        assert_eq!(decl.name(), "app.conf.tmpl");
        assert_eq!(decl.content_hash(), content_hash(b"existing"));
        assert!(decl.action().is_none());
    }
}
