//! Content hashing: hex SHA-256 used for change detection only.

use std::path::Path;

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of `bytes`.
pub fn content_hash(bytes: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(bytes);
    hex::encode(h.finalize())
}

/// Hash of the file at `path`, or `None` if it does not exist or cannot be read.
pub fn file_hash(path: &Path) -> Option<String> {
    std::fs::read(path).ok().map(|bytes| content_hash(&bytes))
}
