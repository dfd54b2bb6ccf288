//! Store models.
//!
//! These types represent the entries a [`Lister`](crate::Lister) hands out.
//! Both are cheap value types keyed by their normalized store path.

use crate::path::{leaf, normalize};

/// Raw, untyped frontmatter of a single document, exactly as the store's
/// frontmatter parser produced it.
///
/// Keys are whatever the author wrote; normalizing them onto canonical names
/// is the consumer's job.
pub type RawMetadata = serde_json::Map<String, serde_json::Value>;

/// A folder in the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Folder {
    /// Normalized path relative to the store root
    pub path: String,
    /// Folder name (last path segment)
    pub name: String,
}
impl Folder {
    pub fn new(path: impl AsRef<str>) -> Self {
        let path = normalize(path);
        let name = leaf(&path).to_string();
        Self { path, name }
    }
}

/// A document (any file the store exposes frontmatter for).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Document {
    /// Normalized path relative to the store root
    pub path: String,
    /// File name including extension
    pub name: String,
    /// File name without its final extension
    pub basename: String,
}
impl Document {
    pub fn new(path: impl AsRef<str>) -> Self {
        let path = normalize(path);
        let name = leaf(&path).to_string();
        let basename = match name.rsplit_once('.') {
            // Dotfiles keep their full name.
            Some((stem, _)) if !stem.is_empty() => stem.to_string(),
            _ => name.clone(),
        };
        Self { path, name, basename }
    }

    /// Number of path segments, including the file name itself.
    pub fn depth(&self) -> usize {
        match self.path.is_empty() {
            true => 0,
            false => self.path.split('/').count(),
        }
    }
}
