//! Subcommands and the flag groups they share.

pub mod apply;
pub mod check;
pub mod diff;
pub mod run;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use metaform_daemon::{
    config::{DEFAULT_PREFIX, DEFAULT_TEMPLATES, DEFAULT_URL},
    logging, FileMetadataSource, HttpMetadataSource, LogConfig, MetadataConfig, MetadataSource,
};

/// Where declarations and metadata come from.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Glob pattern matching template declaration files.
    #[arg(long, env = "METAFORM_TEMPLATES", default_value = DEFAULT_TEMPLATES)]
    pub templates: String,

    /// Base URL of the metadata service.
    #[arg(long, env = "METAFORM_URL", default_value = DEFAULT_URL)]
    pub url: String,

    /// Metadata API version prefix.
    #[arg(long, env = "METAFORM_PREFIX", default_value = DEFAULT_PREFIX)]
    pub prefix: String,

    /// Only fetch metadata for the stack this process runs in.
    #[arg(long = "self", env = "METAFORM_SELF")]
    pub self_only: bool,
}

impl SourceArgs {
    pub fn metadata(&self) -> MetadataConfig {
        MetadataConfig {
            url: self.url.clone(),
            prefix: self.prefix.clone(),
            self_only: self.self_only,
        }
    }

    /// File-backed source when `data` is given, the metadata service otherwise.
    pub fn snapshot_source(&self, data: Option<&PathBuf>) -> Box<dyn MetadataSource> {
        match data {
            Some(path) => Box::new(FileMetadataSource::new(path)),
            None => Box::new(HttpMetadataSource::new(&self.metadata())),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct LogArgs {
    /// Log at debug level.
    #[arg(long, env = "METAFORM_DEBUG")]
    pub debug: bool,

    /// Append logs to this file instead of stderr.
    #[arg(long, env = "METAFORM_LOGFILE")]
    pub logfile: Option<PathBuf>,

    /// Emit log lines as JSON.
    #[arg(long, env = "METAFORM_JSON_LOGS")]
    pub json_logs: bool,
}

impl LogArgs {
    pub fn config(&self) -> LogConfig {
        LogConfig {
            debug: self.debug,
            json: self.json_logs,
            logfile: self.logfile.clone(),
        }
    }

    pub fn init(&self) -> Result<()> {
        logging::init(&self.config()).context("failed to set up logging")
    }
}
