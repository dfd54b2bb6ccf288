//! Path normalization and containment utilities.
//!
//! Store paths are always relative to the store root, `/`-separated, with no
//! leading or trailing separator. The empty string is the store root itself.

use crate::error::{ErrorKind, Result};

/// Normalizes a store path.
///
/// Collapses repeated separators, drops `.` segments and leading/trailing
/// separators, and resolves `..` against the segments seen so far. A `..`
/// that would leave the store root is discarded rather than rejected, so this
/// function is total; use [`validate`] where escaping the root is an error.
///
/// > **Note:** backslashes are **not** treated as separators.
///
/// ```
/// use quire_storage::normalize_path;
/// assert_eq!(normalize_path("/Series//Book 1/./"), "Series/Book 1");
/// assert_eq!(normalize_path("Book 1/../Book 2"), "Book 2");
/// assert_eq!(normalize_path("/"), "");
/// ```
pub fn normalize(path: impl AsRef<str>) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.as_ref().trim().split('/') {
        match segment {
            "" | "." => {},
            ".." => {
                segments.pop();
            },
            s => segments.push(s),
        }
    }
    segments.join("/")
}

/// Validates a store path for security and correctness.
/// Ensures that paths don't escape the store root (no `..` traversal).
///
/// # Returns
/// Returns the normalized path if valid, or [`InvalidPath`](crate::error::ErrorKind::InvalidPath)
/// if invalid.
///
/// # Examples
///
/// ```
/// use quire_storage::validate_path;
/// // Valid paths
/// assert!(validate_path("Book 1/01 Opening.md").is_ok());
/// assert!(validate_path("a/../file.md").is_ok()); // (never leaves store root)
/// // Invalid paths
/// assert!(validate_path("../etc/passwd").is_err());
/// assert!(validate_path("a/../../b").is_err()); // (leaves store root)
/// assert!(validate_path("a\0b").is_err());
/// // Paths get resolved
/// assert_eq!(
///     validate_path("wrong/../still-wrong/.././correct//./scene.md/").unwrap(),
///     "correct/scene.md"
/// );
/// ```
pub fn validate(path: impl AsRef<str>) -> Result<String> {
    let raw = path.as_ref();
    if raw.contains('\0') {
        exn::bail!(ErrorKind::InvalidPath(raw.to_string()));
    }
    let mut segments: Vec<&str> = Vec::new();
    for segment in raw.split('/') {
        match segment {
            "" | "." => {},
            ".." => {
                if segments.pop().is_none() {
                    exn::bail!(ErrorKind::InvalidPath(raw.to_string()));
                }
            },
            s => segments.push(s),
        }
    }
    match segments.is_empty() {
        true => exn::bail!(ErrorKind::InvalidPath(raw.to_string())),
        false => Ok(segments.join("/")),
    }
}

/// Returns `true` when `path` is `root` itself or lives somewhere beneath it.
///
/// Both arguments must already be normalized. The empty root (the whole
/// store) contains every path. Containment is segment-aware: `Book 10` is not
/// within `Book 1`.
pub fn is_within(path: &str, root: &str) -> bool {
    root.is_empty()
        || path == root
        || (path.len() > root.len() && path.starts_with(root) && path.as_bytes()[root.len()] == b'/')
}

/// Parent folder of a normalized path, or `None` for top-level entries.
pub fn parent(path: &str) -> Option<&str> {
    path.rsplit_once('/').map(|(parent, _)| parent)
}

/// Last segment of a normalized path.
pub fn leaf(path: &str) -> &str {
    path.rsplit_once('/').map_or(path, |(_, leaf)| leaf)
}
