//! metaform: render configuration files from orchestration metadata.
//!
//! # Usage
//!
//! ```text
//! metaform run   [--templates GLOB] [--url URL] [--prefix P] [--self] [--refresh SECS]
//! metaform apply [--templates GLOB] [--data FILE]
//! metaform diff  [--templates GLOB] [--data FILE]
//! metaform check [--templates GLOB]
//! ```
//!
//! Every flag can also be set through a `METAFORM_*` environment variable.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{apply::ApplyArgs, check::CheckArgs, diff::DiffArgs, run::RunArgs};

#[derive(Parser, Debug)]
#[command(
    name = "metaform",
    version,
    about = "Keep configuration files in sync with orchestration metadata",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Reconcile templates against the metadata service until stopped.
    Run(RunArgs),

    /// Run a single reconciliation cycle and exit.
    Apply(ApplyArgs),

    /// Show unified diffs of what apply would write.
    Diff(DiffArgs),

    /// Load declarations and show where they write.
    Check(CheckArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => args.run(),
        Commands::Apply(args) => args.run(),
        Commands::Diff(args) => args.run(),
        Commands::Check(args) => args.run(),
    }
}
