//! Runtime configuration record.
//!
//! Built by the CLI from flags and environment variables; the daemon never
//! reads the environment itself.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_URL: &str = "http://rancher-metadata.rancher.internal";
pub const DEFAULT_PREFIX: &str = "2016-07-29";
pub const DEFAULT_TEMPLATES: &str = "/etc/metaform/*.yml";
pub const DEFAULT_REFRESH_SECS: u64 = 300;

/// Where metadata snapshots come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataConfig {
    pub url: String,
    /// API version prefix, e.g. `2016-07-29`.
    pub prefix: String,
    /// Fetch only the caller's own stack instead of everything.
    pub self_only: bool,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            prefix: DEFAULT_PREFIX.to_string(),
            self_only: false,
        }
    }
}

impl MetadataConfig {
    /// Full URL fetched each cycle.
    pub fn endpoint(&self) -> String {
        let base = self.url.trim_end_matches('/');
        let prefix = self.prefix.trim_matches('/');
        let mut endpoint = if prefix.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{prefix}")
        };
        if self.self_only {
            endpoint.push_str("/self/stack");
        }
        endpoint
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogConfig {
    pub debug: bool,
    pub json: bool,
    /// Append logs here instead of stderr; rotated by size.
    pub logfile: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonConfig {
    /// Glob pattern for declaration files.
    pub templates: String,
    pub refresh: Duration,
    pub metadata: MetadataConfig,
    pub log: LogConfig,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            templates: DEFAULT_TEMPLATES.to_string(),
            refresh: Duration::from_secs(DEFAULT_REFRESH_SECS),
            metadata: MetadataConfig::default(),
            log: LogConfig::default(),
        }
    }
}
