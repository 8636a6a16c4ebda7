//! `tracing` subscriber setup.
//!
//! Filter: `debug` when requested, otherwise `RUST_LOG` or `info`. Output goes
//! to stderr, or is appended to the configured log file. The file is reopened
//! for each event so size-based rotation never strands a writer.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;
use crate::error::{io_err, DaemonError};

/// Install the global subscriber. A second call is a no-op.
pub fn init(config: &LogConfig) -> Result<(), DaemonError> {
    if let Some(parent) = config.logfile.as_ref().and_then(|p| p.parent()) {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }
    }

    let filter = build_filter(config.debug);
    let writer = LogSink {
        path: config.logfile.clone(),
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(writer);
    // Already-installed subscribers (tests, embedding) are kept.
    let _ = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    Ok(())
}

fn build_filter(debug: bool) -> EnvFilter {
    if debug {
        return EnvFilter::new("debug");
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Makes a writer per event: the log file in append mode, or stderr.
#[derive(Debug, Clone)]
pub struct LogSink {
    path: Option<PathBuf>,
}

impl LogSink {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

pub enum LogTarget {
    File(File),
    Stderr(io::Stderr),
}

impl Write for LogTarget {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            LogTarget::File(f) => f.write(buf),
            LogTarget::Stderr(s) => s.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            LogTarget::File(f) => f.flush(),
            LogTarget::Stderr(s) => s.flush(),
        }
    }
}

impl<'a> MakeWriter<'a> for LogSink {
    type Writer = LogTarget;

    fn make_writer(&'a self) -> Self::Writer {
        let Some(path) = &self.path else {
            return LogTarget::Stderr(io::stderr());
        };
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => LogTarget::File(file),
            // Never lose a line because the log file is unavailable.
            Err(_) => LogTarget::Stderr(io::stderr()),
        }
    }
}
