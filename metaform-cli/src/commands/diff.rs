//! `metaform diff`: show what `apply` would change. Writes nothing.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use metaform_daemon::load_declarations;
use metaform_renderer::TemplateEngine;

use super::{LogArgs, SourceArgs};

#[derive(Args, Debug)]
pub struct DiffArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Read the metadata snapshot from a JSON or YAML file instead of the service.
    #[arg(long)]
    pub data: Option<PathBuf>,

    #[command(flatten)]
    pub log: LogArgs,
}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        self.log.init()?;
        let set = load_declarations(&self.source.templates)
            .with_context(|| format!("no declarations to diff from '{}'", self.source.templates))?;
        let source = self.source.snapshot_source(self.data.as_ref());
        let data = source
            .fetch()
            .with_context(|| format!("could not fetch metadata from {}", source.describe()))?;

        let mut pending = 0;
        for (name, result) in set.preview_all(&TemplateEngine::new(), &data) {
            match result {
                Ok(preview) if preview.unified_diff.is_empty() => {
                    if preview.would_write {
                        pending += 1;
                        println!("{} {name}: content matches, hash differs", "~".yellow());
                    }
                }
                Ok(preview) => {
                    pending += 1;
                    print_colored_diff(&preview.unified_diff);
                }
                Err(err) => eprintln!("{} {name}: {err}", "✗".red()),
            }
        }

        if pending == 0 {
            println!("No differences.");
        }
        Ok(())
    }
}

fn print_colored_diff(diff: &str) {
    for line in diff.lines() {
        let colored = if line.starts_with("+++") || line.starts_with("---") {
            line.bold()
        } else if line.starts_with('+') {
            line.green()
        } else if line.starts_with('-') {
            line.red()
        } else if line.starts_with("@@") {
            line.cyan()
        } else {
            line.normal()
        };
        println!("{colored}");
    }
}
