//! Asset version management for cache busting.
//!
//! Uses the bundle's modification time as its version. Any rebuild rewrites
//! the bundle, moving its mtime and therefore its URL, so browsers re-fetch
//! without the file ever being renamed.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch for a timestamp.
pub fn epoch_millis(time: SystemTime) -> u128 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

/// Modification time of a file, if it exists.
pub fn get_mtime(path: &Path) -> Option<SystemTime> {
    path.metadata().and_then(|m| m.modified()).ok()
}

/// Version string for a file: its mtime in epoch milliseconds.
///
/// Returns `None` when the file is missing (e.g. during a rebuild).
pub fn compute_version(path: &Path) -> Option<String> {
    get_mtime(path).map(|t| epoch_millis(t).to_string())
}

/// Append a version query to a URL.
///
/// Returns `base_url?1700000000000` format.
pub fn versioned_url(base_url: &str, version: &str) -> String {
    let sep = if base_url.contains('?') { '&' } else { '?' };
    format!("{base_url}{sep}{version}")
}
