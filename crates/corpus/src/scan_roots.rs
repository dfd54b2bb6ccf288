//! Scan-root pattern expansion.
//!
//! Configured scan roots are patterns: `/` for the whole store, a literal
//! folder path, or a path with `*` wildcards in some segments
//! (`Series/Book *`). Expansion turns them into concrete, normalized prefixes.

use globset::{GlobBuilder, GlobSetBuilder};
use quire_storage::{Lister, normalize_path};
use std::collections::BTreeSet;
use tracing::instrument;

use crate::discover::ScanRoot;

pub const DEFAULT_MAX_SCAN_ROOTS: usize = 50;
const WILDCARD: char = '*';

/// Concrete scan roots produced from configured patterns.
///
/// An empty string in `resolved_roots` stands for the whole store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResolvedScanRoots {
    pub resolved_roots: Vec<String>,
    /// Whether the expansion produced more than `max_roots` results.
    pub truncated: bool,
}
impl ResolvedScanRoots {
    pub fn is_empty(&self) -> bool {
        self.resolved_roots.is_empty()
    }

    pub fn scan_roots(&self) -> Vec<ScanRoot> {
        self.resolved_roots.iter().map(ScanRoot::from_path).collect()
    }
}

/// Expands scan-root patterns into concrete roots.
pub trait ScanRootResolver: Send + Sync {
    fn resolve(&self, patterns: &[String], max_roots: usize) -> ResolvedScanRoots;
}

/// Expands patterns against the folders of a store.
pub struct PatternScanRoots<'a, L: ?Sized> {
    lister: &'a L,
}
impl<'a, L: Lister + ?Sized> PatternScanRoots<'a, L> {
    pub fn new(lister: &'a L) -> Self {
        Self { lister }
    }
}

impl<L: Lister + ?Sized> ScanRootResolver for PatternScanRoots<'_, L> {
    #[instrument(skip_all, fields(store = self.lister.name(), patterns = patterns.len(), max_roots = max_roots))]
    fn resolve(&self, patterns: &[String], max_roots: usize) -> ResolvedScanRoots {
        let patterns: Vec<String> = patterns.iter().map(normalize_path).collect();
        if patterns.iter().any(String::is_empty) {
            return ResolvedScanRoots {
                resolved_roots: vec![String::new()],
                truncated: false,
            };
        }
        let folders: BTreeSet<String> = self.lister.list_folders().into_iter().map(|folder| folder.path).collect();
        let mut roots = BTreeSet::new();
        let mut globs = GlobSetBuilder::new();
        for pattern in &patterns {
            if !pattern.contains(WILDCARD) {
                match folders.contains(pattern) {
                    true => {
                        roots.insert(pattern.clone());
                    },
                    false => tracing::debug!(%pattern, "Scan root does not exist; skipping"),
                }
                continue;
            }
            // `*` stays within one segment, so a match always has the pattern's depth.
            match GlobBuilder::new(pattern).case_insensitive(true).literal_separator(true).build() {
                Ok(glob) => {
                    globs.add(glob);
                },
                Err(error) => tracing::debug!(%pattern, %error, "Unusable scan root pattern; skipping"),
            }
        }
        match globs.build() {
            Ok(globs) => roots.extend(folders.iter().filter(|folder| globs.is_match(folder.as_str())).cloned()),
            Err(error) => tracing::debug!(%error, "Could not compile scan root patterns"),
        }
        let truncated = roots.len() > max_roots;
        if truncated {
            tracing::warn!(found = roots.len(), max_roots, "Too many scan roots; keeping the first");
        }
        ResolvedScanRoots {
            resolved_roots: roots.into_iter().take(max_roots).collect(),
            truncated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_storage::backend::MemoryStore;
    use rstest::rstest;

    fn store() -> MemoryStore {
        MemoryStore::default().with_folders([
            "Series/Book 1",
            "Series/Book 2",
            "Series/Book 2/Scenes",
            "Series/Notes",
            "Standalone",
            "Archive/book 7",
        ])
    }

    fn resolve(patterns: &[&str], max_roots: usize) -> ResolvedScanRoots {
        let store = store();
        let patterns: Vec<String> = patterns.iter().map(ToString::to_string).collect();
        PatternScanRoots::new(&store).resolve(&patterns, max_roots)
    }

    #[rstest]
    #[case(&["/"], vec![""])]
    #[case(&["", "Standalone"], vec![""])]
    #[case(&["/Standalone/"], vec!["Standalone"])]
    #[case(&["Missing"], vec![])]
    #[case(&["Series/Book *"], vec!["Series/Book 1", "Series/Book 2"])]
    #[case(&["*/BOOK *"], vec!["Archive/book 7", "Series/Book 1", "Series/Book 2"])]
    #[case(&["Series/*", "Series/Notes"], vec!["Series/Book 1", "Series/Book 2", "Series/Notes"])]
    #[case(&["Series/*/Scenes"], vec!["Series/Book 2/Scenes"])]
    #[case(&["Series.*"], vec![])]
    #[case(&["Series/[*", "Standalone"], vec!["Standalone"])]
    #[case(&["Series/Book ?*"], vec!["Series/Book 1", "Series/Book 2"])]
    #[case(&[], vec![])]
    fn test_expansion(#[case] patterns: &[&str], #[case] expected: Vec<&str>) {
        let resolved = resolve(patterns, DEFAULT_MAX_SCAN_ROOTS);
        assert_eq!(resolved.resolved_roots, expected);
        assert!(!resolved.truncated);
    }

    #[test]
    fn test_cap() {
        let resolved = resolve(&["Series/*"], 2);
        assert_eq!(resolved.resolved_roots, vec!["Series/Book 1", "Series/Book 2"]);
        assert!(resolved.truncated);
    }

    #[test]
    fn test_scan_roots_conversion() {
        let resolved = ResolvedScanRoots {
            resolved_roots: vec![String::new(), "Standalone".to_string()],
            truncated: false,
        };
        assert_eq!(
            resolved.scan_roots(),
            vec![ScanRoot::WholeStore, ScanRoot::Folder("Standalone".to_string())]
        );
    }
}
