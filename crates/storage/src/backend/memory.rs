//! In-memory store for testing.

use crate::models::{Document, Folder, RawMetadata};
use crate::path::{parent, validate as validate_path};
use crate::{Lister, MetadataAccessor};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// In-memory store for testing.
///
/// Documents are held in a sorted map alongside their frontmatter. Every
/// ancestor folder of a document is listed automatically; empty folders can be
/// added with [`with_folders`](Self::with_folders). A document registered with
/// `Value::Null` (or any non-object value) has unreadable frontmatter.
///
/// # Examples
///
/// ```
/// use quire_storage::backend::MemoryStore;
/// use quire_storage::{Lister, MetadataAccessor};
/// use serde_json::json;
///
/// let store = MemoryStore::with_documents([
///     ("Book 1/01 Opening.md", json!({ "Class": "Scene" })),
///     ("Book 1/Notes.md", json!(null)),
/// ]);
/// assert_eq!(store.list_folders().len(), 1);
/// let docs = store.list_documents();
/// assert!(store.metadata(&docs[0]).is_some());
/// assert!(store.metadata(&docs[1]).is_none());
/// ```
pub struct MemoryStore {
    name: String,
    folders: BTreeSet<String>,
    documents: BTreeMap<String, Option<RawMetadata>>,
}

impl MemoryStore {
    /// Create a store pre-populated with documents and their frontmatter.
    ///
    /// Panics if any path fails validation (e.g. path traversal). If test
    /// setup is wrong, then test should not pass.
    pub fn with_documents(documents: impl IntoIterator<Item = (impl AsRef<str>, Value)>) -> Self {
        let mut store = Self {
            name: "memory".to_string(),
            folders: BTreeSet::new(),
            documents: BTreeMap::new(),
        };
        for (path, metadata) in documents {
            let Ok(validated) = validate_path(path.as_ref()) else {
                // Test fixture; there is no error result.
                panic!("MemoryStore::with_documents: invalid path {:?}", path.as_ref());
            };
            store.add_ancestors(&validated);
            let metadata = match metadata {
                Value::Object(map) => Some(map),
                _ => None,
            };
            store.documents.insert(validated, metadata);
        }
        store
    }

    /// Add (possibly empty) folders to the listing.
    ///
    /// Panics on invalid paths, same as [`with_documents`](Self::with_documents).
    pub fn with_folders(mut self, folders: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        for folder in folders {
            let Ok(validated) = validate_path(folder.as_ref()) else {
                panic!("MemoryStore::with_folders: invalid path {:?}", folder.as_ref());
            };
            self.add_ancestors(&validated);
            self.folders.insert(validated);
        }
        self
    }

    /// Change the name of the store.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    fn add_ancestors(&mut self, path: &str) {
        let mut current = parent(path);
        while let Some(folder) = current {
            self.folders.insert(folder.to_string());
            current = parent(folder);
        }
    }
}
impl Default for MemoryStore {
    fn default() -> Self {
        let documents: [(&str, Value); 0] = [];
        Self::with_documents(documents)
    }
}

impl Lister for MemoryStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_folders(&self) -> Vec<Folder> {
        self.folders.iter().map(Folder::new).collect()
    }

    fn list_documents(&self) -> Vec<Document> {
        self.documents.keys().map(Document::new).collect()
    }
}

impl MetadataAccessor for MemoryStore {
    fn metadata(&self, document: &Document) -> Option<RawMetadata> {
        self.documents.get(&document.path).cloned().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ancestor_folders_are_listed() {
        let store = MemoryStore::with_documents([("Series/Book 1/Scene.md", json!({}))]);
        let folders: Vec<_> = store.list_folders().into_iter().map(|f| f.path).collect();
        assert_eq!(folders, vec!["Series", "Series/Book 1"]);
    }

    #[test]
    fn test_empty_folders() {
        let store = MemoryStore::default().with_folders(["Empty/Nested"]);
        let folders: Vec<_> = store.list_folders().into_iter().map(|f| f.path).collect();
        assert_eq!(folders, vec!["Empty", "Empty/Nested"]);
        assert!(store.list_documents().is_empty());
    }

    #[test]
    fn test_metadata_lookup() {
        let store = MemoryStore::with_documents([("a.md", json!({ "Class": "Scene" })), ("b.md", json!("oops"))]);
        let a = Document::new("a.md");
        let b = Document::new("b.md");
        let missing = Document::new("c.md");
        assert_eq!(store.metadata(&a).and_then(|m| m.get("Class").cloned()), Some(json!("Scene")));
        assert!(store.metadata(&b).is_none());
        assert!(store.metadata(&missing).is_none());
    }

    #[test]
    #[should_panic]
    fn test_invalid_path_panics() {
        MemoryStore::with_documents([("../escape.md", json!({}))]);
    }

    #[test]
    fn test_name() {
        assert_eq!(MemoryStore::default().with_name("vault").name(), "vault");
    }
}
