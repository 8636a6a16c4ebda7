//! # metaform-daemon
//!
//! Hosts the reconciliation engine as a long-running process: configuration,
//! metadata sources, the refresh scheduler, and logging.

pub mod config;
mod error;
pub mod log_rotation;
pub mod logging;
pub mod report;
mod runtime;
pub mod source;

pub use config::{DaemonConfig, LogConfig, MetadataConfig};
pub use error::DaemonError;
pub use runtime::{load_declarations, refresh_task, run, run_cycle, start_blocking};
pub use source::{FileMetadataSource, HttpMetadataSource, MetadataSource};
