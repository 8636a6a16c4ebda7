//! `metaform run`: the long-running reconciliation daemon.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use metaform_daemon::{config::DEFAULT_REFRESH_SECS, DaemonConfig};

use super::{LogArgs, SourceArgs};

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Seconds between refresh cycles.
    #[arg(
        long,
        env = "METAFORM_REFRESH",
        default_value_t = DEFAULT_REFRESH_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub refresh: u64,

    #[command(flatten)]
    pub log: LogArgs,
}

impl RunArgs {
    pub fn config(&self) -> DaemonConfig {
        DaemonConfig {
            templates: self.source.templates.clone(),
            refresh: Duration::from_secs(self.refresh),
            metadata: self.source.metadata(),
            log: self.log.config(),
        }
    }

    pub fn run(self) -> Result<()> {
        metaform_daemon::start_blocking(self.config()).context("metaform daemon failed")
    }
}
