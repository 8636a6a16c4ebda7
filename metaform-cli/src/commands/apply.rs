//! `metaform apply`: one reconciliation cycle, then exit.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use metaform_daemon::{load_declarations, run_cycle};
use metaform_renderer::TemplateEngine;
use metaform_sync::{ActionOutcome, ApplyOutcome, ApplyStatus, CycleReport};

use super::{LogArgs, SourceArgs};

#[derive(Args, Debug)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Read the metadata snapshot from a JSON or YAML file instead of the service.
    #[arg(long)]
    pub data: Option<PathBuf>,

    #[command(flatten)]
    pub log: LogArgs,
}

impl ApplyArgs {
    pub fn run(self) -> Result<()> {
        self.log.init()?;
        let mut set = load_declarations(&self.source.templates)
            .with_context(|| format!("no declarations to apply from '{}'", self.source.templates))?;
        let source = self.source.snapshot_source(self.data.as_ref());

        let report = run_cycle(&mut set, &TemplateEngine::new(), source.as_ref())
            .with_context(|| format!("could not fetch metadata from {}", source.describe()))?;
        print_report(&report);

        if report.failed() > 0 {
            bail!("{} declaration(s) failed", report.failed());
        }
        Ok(())
    }
}

fn print_report(report: &CycleReport) {
    for outcome in &report.outcomes {
        println!("{}", outcome_line(outcome));
    }
    println!(
        "{} written, {} unchanged, {} failed",
        report.written(),
        report.unchanged(),
        report.failed()
    );
}

fn outcome_line(outcome: &ApplyOutcome) -> String {
    let name = &outcome.name;
    match &outcome.status {
        ApplyStatus::Unchanged { .. } => format!("  {}  {name}", "unchanged".bright_black()),
        ApplyStatus::Written { action, .. } => {
            let suffix = match action {
                ActionOutcome::NotConfigured => String::new(),
                ActionOutcome::Succeeded { .. } => " (action ok)".to_string(),
                ActionOutcome::Failed { code, .. } => match code {
                    Some(code) => format!(" (action exited {code})"),
                    None => " (action killed)".to_string(),
                },
                ActionOutcome::SpawnFailed { error, .. } => format!(" (action: {error})"),
            };
            let label = if action.is_failure() {
                "written".yellow()
            } else {
                "written".green()
            };
            format!("  {label}  {name}{suffix}")
        }
        ApplyStatus::RenderFailed(err) => format!("  {}  {name}: {err}", "failed".red()),
        ApplyStatus::WriteFailed(err) => format!("  {}  {name}: {err}", "failed".red()),
    }
}
