//! Size-based rotation for the `--logfile` target.
//!
//! The live file becomes `<file>.1`, older copies shift up one slot and the
//! copy past `keep` is dropped. No fresh file is created: [`LogSink`] reopens
//! the path for each event.
//!
//! [`LogSink`]: crate::logging::LogSink

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Default rotation threshold (10 MiB).
pub const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;

/// Default number of rotated copies kept.
pub const KEEP_ROTATED: usize = 5;

#[derive(Debug, Clone)]
pub struct LogRotator {
    path: PathBuf,
    threshold: u64,
    keep: usize,
}

impl LogRotator {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            threshold: ROTATE_AT_BYTES,
            keep: KEEP_ROTATED,
        }
    }

    pub fn with_limits(mut self, threshold: u64, keep: usize) -> Self {
        self.threshold = threshold;
        self.keep = keep;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the `slot`-th rotated copy, e.g. `metaform.log.2`.
    pub fn backup(&self, slot: usize) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|s| s.to_os_string())
            .unwrap_or_else(|| "metaform.log".into());
        name.push(format!(".{slot}"));
        self.path.with_file_name(name)
    }

    /// Rotate when the live file has reached the threshold.
    ///
    /// A missing live file is not an error; `Ok(false)` means nothing moved.
    pub fn rotate(&self) -> io::Result<bool> {
        if self.keep == 0 || self.live_size()? < self.threshold {
            return Ok(false);
        }
        remove_if_present(&self.backup(self.keep))?;
        for slot in (1..self.keep).rev() {
            let from = self.backup(slot);
            if from.exists() {
                fs::rename(&from, self.backup(slot + 1))?;
            }
        }
        fs::rename(&self.path, self.backup(1))?;
        Ok(true)
    }

    /// [`rotate`](Self::rotate), reporting the result instead of returning it.
    pub fn rotate_and_log(&self) {
        match self.rotate() {
            Ok(true) => tracing::info!(path = %self.path.display(), "log file rotated"),
            Ok(false) => {}
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "log rotation failed")
            }
        }
    }

    fn live_size(&self) -> io::Result<u64> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.len()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(0),
            Err(err) => Err(err),
        }
    }
}

fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
        _ => Ok(()),
    }
}
