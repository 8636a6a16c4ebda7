//! Ordered declaration sets: resilient loading and sequential apply.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde_json::Value;

use metaform_renderer::TemplateEngine;

use crate::declaration::{ApplyOutcome, TemplateDeclaration};
use crate::error::SyncError;

/// A declaration file that could not be loaded.
#[derive(Debug)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub error: SyncError,
}

/// Result of [`load_all`]: the declarations that loaded, in input order, plus
/// one entry per file that did not.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub set: DeclarationSet,
    pub failures: Vec<LoadFailure>,
}

/// Load every declaration file, keeping successes in input order.
///
/// A failing file is recorded in [`LoadReport::failures`] and does not stop
/// the remaining files from loading.
pub fn load_all<P: AsRef<Path>>(paths: &[P]) -> LoadReport {
    let mut report = LoadReport::default();
    for path in paths {
        let path = path.as_ref();
        match TemplateDeclaration::load(path) {
            Ok(declaration) => report.set.push(declaration),
            Err(error) => report.failures.push(LoadFailure {
                path: path.to_path_buf(),
                error,
            }),
        }
    }
    report
}

/// Summary of one reconciliation cycle.
#[derive(Debug)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// One outcome per declaration, in set order.
    pub outcomes: Vec<ApplyOutcome>,
}

impl CycleReport {
    pub fn written(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_written()).count()
    }

    pub fn unchanged(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_unchanged()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failure()).count()
    }

    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}

/// Ordered collection of [`TemplateDeclaration`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclarationSet {
    declarations: Vec<TemplateDeclaration>,
}

impl DeclarationSet {
    pub fn new(declarations: Vec<TemplateDeclaration>) -> Self {
        Self { declarations }
    }

    pub fn push(&mut self, declaration: TemplateDeclaration) {
        self.declarations.push(declaration);
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TemplateDeclaration> {
        self.declarations.iter()
    }

    /// Apply every declaration in order against the same snapshot.
    ///
    /// A failure in one declaration never prevents the rest from running.
    pub fn apply_all(&mut self, engine: &TemplateEngine, data: &Value) -> CycleReport {
        let started_at = Utc::now();
        let outcomes = self
            .declarations
            .iter_mut()
            .map(|declaration| declaration.apply(engine, data))
            .collect();
        CycleReport {
            started_at,
            finished_at: Utc::now(),
            outcomes,
        }
    }
}

impl<'a> IntoIterator for &'a DeclarationSet {
    type Item = &'a TemplateDeclaration;
    type IntoIter = std::slice::Iter<'a, TemplateDeclaration>;

    fn into_iter(self) -> Self::IntoIter {
        self.declarations.iter()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
