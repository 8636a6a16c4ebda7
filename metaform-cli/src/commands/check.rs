//! `metaform check`: load declarations and report where they write.

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use metaform_core::discover;
use metaform_sync::{load_all, TemplateDeclaration};

/// Arguments for `metaform check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Glob pattern matching template declaration files.
    #[arg(
        long,
        env = "METAFORM_TEMPLATES",
        default_value = metaform_daemon::config::DEFAULT_TEMPLATES
    )]
    pub templates: String,
}

#[derive(Tabled)]
struct DeclarationRow {
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "source")]
    source: String,
    #[tabled(rename = "destination")]
    destination: String,
    #[tabled(rename = "action")]
    action: String,
    #[tabled(rename = "on disk")]
    on_disk: String,
}

impl From<&TemplateDeclaration> for DeclarationRow {
    fn from(declaration: &TemplateDeclaration) -> Self {
        Self {
            name: declaration.name().to_string(),
            source: declaration.source().display().to_string(),
            destination: declaration.destination().display().to_string(),
            action: declaration.action().unwrap_or("-").to_string(),
            on_disk: on_disk_label(declaration.destination()).to_string(),
        }
    }
}

/// A freshly loaded declaration seeds its hash from the destination, so the
/// only thing `check` can report is whether the file is there.
fn on_disk_label(destination: &Path) -> &'static str {
    if destination.is_file() {
        "present"
    } else {
        "missing"
    }
}

impl CheckArgs {
    pub fn run(self) -> Result<()> {
        let paths = discover(&self.templates)
            .with_context(|| format!("invalid template pattern '{}'", self.templates))?;
        let report = load_all(&paths);

        for failure in &report.failures {
            eprintln!(
                "{} {}: {}",
                "✗".red(),
                failure.path.display(),
                failure.error
            );
        }

        if report.set.is_empty() {
            bail!("no template declarations loaded from '{}'", self.templates);
        }

        let rows: Vec<DeclarationRow> = report.set.iter().map(DeclarationRow::from).collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        println!(
            "{} loaded, {} failed",
            report.set.len(),
            report.failures.len()
        );
        Ok(())
    }
}
