//! Destination writer.
//!
//! Full-file overwrite through the destination path: truncate and write in
//! place, following symlinks, so bind-mounted files and files in read-only
//! directories can be updated. A newly created file gets mode `0644`; an
//! existing file keeps its permissions.
//!
//! The destination's parent directory is never created: a missing directory
//! is a write error, and the caller retries on the next cycle.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::error::{io_err, SyncError};

/// Replace the contents of `path` with `content`.
pub fn write_destination(path: &Path, content: &[u8]) -> Result<(), SyncError> {
    let created = !path.exists();
    let mut file = open_destination(path, created).map_err(|e| io_err(path, e))?;
    file.write_all(content)
        .and_then(|_| file.sync_all())
        .map_err(|e| io_err(path, e))
}

#[cfg(unix)]
fn open_destination(path: &Path, created: bool) -> std::io::Result<File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o644)
        .open(path)?;
    if created {
        // `mode` is filtered by the umask; pin it on new files only.
        file.set_permissions(std::fs::Permissions::from_mode(0o644))?;
    }
    Ok(file)
}

#[cfg(not(unix))]
fn open_destination(path: &Path, _created: bool) -> std::io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
