//! Book root discovery.
//!
//! Two independent signals nominate folders as book roots:
//!
//! - **Name**: the folder is named like a book (`Book 3`), or a concrete scan
//!   root sits inside (or is) such a folder.
//! - **Outline**: a book-scoped outline document lives somewhere beneath it.
//!
//! Discovery only nominates. Deciding which candidates are drafts, which are
//! nested inside other candidates, and which the author has overridden is the
//! [resolution engine](crate::resolve_books)'s job.

use quire_selection::Scope;
use quire_storage::{Lister, MetadataAccessor, is_within, normalize_path};
use std::collections::BTreeMap;
use tracing::instrument;

use crate::class_config::OUTLINE_CLASS;
use crate::classify::book_number;
use crate::metadata::{AliasMap, Metadata};

/// A normalized prefix under which discovery (and scene enumeration) runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScanRoot {
    /// The entire store.
    WholeStore,
    /// A single folder and everything beneath it.
    Folder(String),
}
impl ScanRoot {
    /// Normalizes `path`; the empty path (or `/`) means the whole store.
    pub fn from_path(path: impl AsRef<str>) -> Self {
        let path = normalize_path(path);
        match path.is_empty() {
            true => Self::WholeStore,
            false => Self::Folder(path),
        }
    }

    /// The normalized prefix; empty for the whole store.
    pub fn as_path(&self) -> &str {
        match self {
            Self::WholeStore => "",
            Self::Folder(path) => path,
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        is_within(path, self.as_path())
    }
}

/// A folder nominated as a book root.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiscoveredBookRoot {
    pub root_path: String,
    pub book_number: Option<u32>,
    pub detected_by_name: bool,
    pub detected_by_outline: bool,
}
impl DiscoveredBookRoot {
    /// A name-detected candidate. Handy for feeding the resolution engine
    /// directly.
    pub fn by_name(root_path: impl AsRef<str>, book_number: Option<u32>) -> Self {
        Self {
            root_path: normalize_path(root_path),
            book_number,
            detected_by_name: true,
            detected_by_outline: false,
        }
    }

    /// An outline-detected candidate.
    pub fn by_outline(root_path: impl AsRef<str>, book_number: Option<u32>) -> Self {
        Self {
            detected_by_name: false,
            detected_by_outline: true,
            ..Self::by_name(root_path, book_number)
        }
    }
}

#[derive(Default)]
struct Detection {
    name_number: Option<u32>,
    outline_number: Option<u32>,
    by_name: bool,
    by_outline: bool,
}

#[derive(Default)]
struct Candidates(BTreeMap<String, Detection>);
impl Candidates {
    fn name(&mut self, path: String, number: Option<u32>) {
        let detection = self.0.entry(path).or_default();
        detection.by_name = true;
        detection.name_number = detection.name_number.or(number);
    }

    fn outline(&mut self, path: String, number: Option<u32>) {
        let detection = self.0.entry(path).or_default();
        detection.by_outline = true;
        detection.outline_number = detection.outline_number.or(number);
    }

    fn into_roots(self) -> Vec<DiscoveredBookRoot> {
        self.0
            .into_iter()
            .map(|(root_path, detection)| DiscoveredBookRoot {
                root_path,
                book_number: detection.name_number.or(detection.outline_number),
                detected_by_name: detection.by_name,
                detected_by_outline: detection.by_outline,
            })
            .collect()
    }
}

/// Nominates book roots under the given scan roots.
///
/// Candidates are merged by path: a folder found by both signals carries both
/// flags, and a name-derived book number takes precedence over an
/// outline-derived one. The result is deduplicated and sorted by path, but
/// callers should treat it as unordered; [`resolve_books`](crate::resolve_books)
/// imposes the canonical order.
///
/// A scan root with no document beneath it (missing or empty) contributes no
/// name-based candidate. One that has documents but no book-named segment is
/// nominated verbatim, so a store pointed at an unstructured folder still
/// yields a book. Outline detection looks at every document in the store,
/// whatever the scan roots.
#[instrument(skip_all, fields(store = lister.name(), scan_roots = scan_roots.len()))]
pub fn discover_book_roots<L, M>(
    scan_roots: &[ScanRoot],
    lister: &L,
    accessor: &M,
    aliases: &AliasMap,
) -> Vec<DiscoveredBookRoot>
where
    L: Lister + ?Sized,
    M: MetadataAccessor + ?Sized,
{
    if scan_roots.is_empty() {
        return Vec::new();
    }
    let folders = lister.list_folders();
    let documents = lister.list_documents();
    let mut candidates = Candidates::default();

    // Name-based.
    for scan_root in scan_roots {
        match scan_root {
            ScanRoot::WholeStore => {
                if documents.is_empty() {
                    tracing::debug!("Store has no documents; skipping whole-store scan");
                    continue;
                }
                for folder in &folders {
                    if let Some(number) = book_number(&folder.name) {
                        candidates.name(folder.path.clone(), Some(number));
                    }
                }
            },
            ScanRoot::Folder(root) => {
                if !documents.iter().any(|doc| is_within(&doc.path, root)) {
                    tracing::debug!(scan_root = %root, "Scan root missing or empty; skipping");
                    continue;
                }
                let (path, number) = book_prefix(root).unwrap_or_else(|| (root.clone(), None));
                candidates.name(path, number);
            },
        }
    }

    // Outline-based. Every document in the store counts, not just those under a scan root.
    for document in &documents {
        if document.depth() <= 1 {
            continue;
        }
        let Some(raw) = accessor.metadata(document) else {
            continue;
        };
        let metadata = Metadata::normalize(&raw, aliases);
        if !metadata.has_class(OUTLINE_CLASS) || metadata.scope != Some(Scope::Book) {
            continue;
        }
        tracing::trace!(path = %document.path, "Book-scoped outline found");
        let segments: Vec<&str> = document.path.split('/').collect();
        for depth in 1..segments.len() {
            let ancestor = segments[..depth].join("/");
            candidates.outline(ancestor, book_number(segments[depth - 1]));
        }
    }

    let roots = candidates.into_roots();
    tracing::debug!(candidates = roots.len(), "Book root discovery complete");
    roots
}

/// Prefix of `path` through its first book-named segment.
fn book_prefix(path: &str) -> Option<(String, Option<u32>)> {
    let segments: Vec<&str> = path.split('/').collect();
    segments
        .iter()
        .enumerate()
        .find_map(|(index, segment)| book_number(segment).map(|number| (index, number)))
        .map(|(index, number)| (segments[..=index].join("/"), Some(number)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_storage::backend::MemoryStore;
    use serde_json::json;

    fn discover(store: &MemoryStore, roots: &[&str]) -> Vec<DiscoveredBookRoot> {
        let roots: Vec<ScanRoot> = roots.iter().map(ScanRoot::from_path).collect();
        discover_book_roots(&roots, store, store, &AliasMap::default())
    }

    fn paths(roots: &[DiscoveredBookRoot]) -> Vec<&str> {
        roots.iter().map(|root| root.root_path.as_str()).collect()
    }

    #[test]
    fn test_scan_root_from_path() {
        assert_eq!(ScanRoot::from_path("/"), ScanRoot::WholeStore);
        assert_eq!(ScanRoot::from_path(""), ScanRoot::WholeStore);
        assert_eq!(ScanRoot::from_path("/Series/"), ScanRoot::Folder("Series".to_string()));
        assert!(ScanRoot::WholeStore.contains("Anything.md"));
        assert!(!ScanRoot::from_path("Series").contains("Series 2/a.md"));
    }

    #[test]
    fn test_whole_store_name_detection() {
        let store = MemoryStore::with_documents([
            ("Book 1/01 Opening.md", json!({})),
            ("Book 1 - Draft 2/01 Opening.md", json!({})),
            ("Series/Book 2/01 Start.md", json!({})),
            ("Characters/Alice.md", json!({})),
        ]);
        let roots = discover(&store, &["/"]);
        assert_eq!(paths(&roots), vec!["Book 1", "Book 1 - Draft 2", "Series/Book 2"]);
        assert_eq!(roots[0].book_number, Some(1));
        assert_eq!(roots[2].book_number, Some(2));
        assert!(roots.iter().all(|r| r.detected_by_name && !r.detected_by_outline));
    }

    #[test]
    fn test_concrete_scan_root_inside_book() {
        let store = MemoryStore::with_documents([("Series/Book 3/Part A/01.md", json!({}))]);
        let roots = discover(&store, &["Series/Book 3/Part A"]);
        assert_eq!(roots, vec![DiscoveredBookRoot::by_name("Series/Book 3", Some(3))]);
    }

    #[test]
    fn test_unstructured_scan_root_is_verbatim() {
        let store = MemoryStore::with_documents([("Manuscript/01.md", json!({}))]);
        let roots = discover(&store, &["Manuscript"]);
        assert_eq!(roots, vec![DiscoveredBookRoot::by_name("Manuscript", None)]);
    }

    #[test]
    fn test_missing_scan_root_yields_nothing() {
        let store = MemoryStore::with_documents([("Manuscript/01.md", json!({}))]);
        assert!(discover(&store, &["Elsewhere"]).is_empty());
        assert!(discover(&store, &[]).is_empty());
    }

    #[test]
    fn test_empty_scan_root_yields_nothing() {
        let store = MemoryStore::default().with_folders(["Book 4"]);
        assert!(discover(&store, &["Book 4"]).is_empty());
        assert!(discover(&store, &["/"]).is_empty());

        let store = MemoryStore::with_documents([("Book 1/01.md", json!({}))]).with_folders(["Book 4"]);
        assert_eq!(paths(&discover(&store, &["Book 1", "Book 4"])), vec!["Book 1"]);
    }

    #[test]
    fn test_outline_marks_every_ancestor() {
        let store = MemoryStore::with_documents([
            ("Saga/Volume/Outline.md", json!({ "Class": ["Outline"], "Scope": "Book" })),
            ("Saga/Volume/01.md", json!({ "Class": "Scene" })),
        ]);
        let roots = discover(&store, &["/"]);
        assert_eq!(paths(&roots), vec!["Saga", "Saga/Volume"]);
        assert!(roots.iter().all(|r| r.detected_by_outline && !r.detected_by_name));
    }

    #[test]
    fn test_outline_requires_book_scope_and_depth() {
        let store = MemoryStore::with_documents([
            ("Outline.md", json!({ "Class": "outline", "Scope": "book" })),
            ("Saga/Outline.md", json!({ "Class": "outline", "Scope": "saga" })),
            ("Notes/Outline.md", json!({ "Class": "scene", "Scope": "book" })),
            ("Broken/Outline.md", json!(null)),
        ]);
        assert!(discover(&store, &["/"]).is_empty());
    }

    #[test]
    fn test_outline_outside_scan_roots_still_counts() {
        let store = MemoryStore::with_documents([
            ("Manuscript/01.md", json!({})),
            ("Elsewhere/Book 9/Outline.md", json!({ "Class": "outline", "Scope": "book" })),
        ]);
        let roots = discover(&store, &["Manuscript"]);
        assert_eq!(paths(&roots), vec!["Elsewhere", "Elsewhere/Book 9", "Manuscript"]);
        assert_eq!(roots[1], DiscoveredBookRoot::by_outline("Elsewhere/Book 9", Some(9)));
        assert!(roots[2].detected_by_name && !roots[2].detected_by_outline);
    }

    #[test]
    fn test_signals_merge() {
        let store = MemoryStore::with_documents([("Book 5/Outline.md", json!({ "Class": "Outline", "Scope": "Book" }))]);
        let roots = discover(&store, &["/"]);
        assert_eq!(
            roots,
            vec![DiscoveredBookRoot {
                root_path: "Book 5".to_string(),
                book_number: Some(5),
                detected_by_name: true,
                detected_by_outline: true,
            }]
        );
    }

    #[test]
    fn test_duplicate_scan_roots_merge() {
        let store = MemoryStore::with_documents([("Book 1/Part/01.md", json!({}))]);
        let roots = discover(&store, &["Book 1", "Book 1/Part", "/"]);
        assert_eq!(roots, vec![DiscoveredBookRoot::by_name("Book 1", Some(1))]);
    }
}
