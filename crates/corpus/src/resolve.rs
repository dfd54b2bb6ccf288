//! Book resolution.
//!
//! Turns discovered candidates into a final inclusion partition. Every
//! candidate gets exactly one [`BookStatus`]:
//!
//! 1. an author override, when present, wins outright;
//! 2. otherwise a candidate nested inside another candidate is excluded;
//! 3. otherwise a candidate that looks like a draft/variant is excluded;
//! 4. otherwise it is included.
//!
//! Resolution is a pure function of the candidates and overrides; it never
//! goes back to the store.

use quire_storage::{is_within, normalize_path};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter, Result as FmtResult};
use tracing::instrument;

use crate::classify::is_draft_variant;
use crate::discover::DiscoveredBookRoot;

/// Which discovery signal(s) nominated a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DetectedBy {
    Name,
    Outline,
    NameAndOutline,
}
impl DetectedBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectedBy::Name => "name",
            DetectedBy::Outline => "outline",
            DetectedBy::NameAndOutline => "name+outline",
        }
    }

    fn from_flags(by_name: bool, by_outline: bool) -> Self {
        match (by_name, by_outline) {
            (true, true) => Self::NameAndOutline,
            (false, true) => Self::Outline,
            // A candidate with neither flag can only come from a hand-built
            // DiscoveredBookRoot; call it name-detected.
            _ => Self::Name,
        }
    }
}
impl Display for DetectedBy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// Final inclusion status of a book candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BookStatus {
    Included,
    ExcludedVariant,
    ExcludedNested,
    ExcludedManual,
}
impl BookStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Included => "included",
            BookStatus::ExcludedVariant => "excluded_variant",
            BookStatus::ExcludedNested => "excluded_nested",
            BookStatus::ExcludedManual => "excluded_manual",
        }
    }
}
impl Display for BookStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// A classified book candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResolvedBook {
    /// Same as `root_path`.
    pub id: String,
    pub root_path: String,
    pub book_number: Option<u32>,
    pub detected_by: DetectedBy,
    pub is_variant: bool,
    pub is_nested: bool,
    /// Nearest enclosing candidate, when nested.
    pub nested_under: Option<String>,
    /// What classification alone decides: `!is_variant && !is_nested`.
    pub default_included: bool,
    pub included: bool,
    pub status: BookStatus,
    pub override_included: Option<bool>,
}
impl ResolvedBook {
    /// Human-readable status, distinguishing an override that agrees with the
    /// default from one that had to force inclusion.
    pub fn status_label(&self) -> &'static str {
        match self.status {
            BookStatus::Included if self.override_included.is_some() && !self.default_included => {
                "Included (override)"
            },
            BookStatus::Included => "Included",
            BookStatus::ExcludedVariant => "Excluded (draft or variant)",
            BookStatus::ExcludedNested => "Excluded (nested in another book)",
            BookStatus::ExcludedManual => "Excluded (override)",
        }
    }
}

/// Author-supplied inclusion overrides, keyed by normalized root path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookInclusionOverrides(BTreeMap<String, bool>);

impl BookInclusionOverrides {
    /// Builds overrides from untyped settings, silently dropping entries with
    /// a blank key or a non-boolean value.
    pub fn from_raw<K: AsRef<str>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        let mut overrides = Self::default();
        for (key, value) in entries {
            match value {
                Value::Bool(included) => overrides.insert(key, included),
                other => tracing::debug!(key = key.as_ref(), value = %other, "Dropping non-boolean book override"),
            }
        }
        overrides
    }

    /// Sets an override. Keys that normalize to nothing are ignored.
    pub fn insert(&mut self, root_path: impl AsRef<str>, included: bool) {
        let key = normalize_path(root_path);
        match key.is_empty() {
            true => tracing::debug!("Dropping book override with blank key"),
            false => {
                self.0.insert(key, included);
            },
        }
    }

    pub fn get(&self, root_path: &str) -> Option<bool> {
        self.0.get(root_path).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.0.iter().map(|(path, included)| (path.as_str(), *included))
    }
}
impl<K: AsRef<str>> FromIterator<(K, bool)> for BookInclusionOverrides {
    fn from_iter<T: IntoIterator<Item = (K, bool)>>(iter: T) -> Self {
        let mut overrides = Self::default();
        for (key, included) in iter {
            overrides.insert(key, included);
        }
        overrides
    }
}

/// The outcome of [`resolve_books`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BookResolution {
    /// Every candidate, in canonical order.
    pub candidates: Vec<ResolvedBook>,
    pub included: Vec<ResolvedBook>,
    pub excluded: Vec<ResolvedBook>,
    pub included_roots: Vec<String>,
    pub excluded_roots: Vec<String>,
    /// Some candidate has status [`BookStatus::ExcludedVariant`].
    pub has_variant_exclusions: bool,
    /// Some candidate has status [`BookStatus::ExcludedNested`].
    pub has_nested_exclusions: bool,
}
impl BookResolution {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ResolvedBook> {
        self.candidates.iter().find(|book| book.id == id)
    }
}

/// Canonical ordering: book number ascending with unnumbered candidates last,
/// then lexical path.
pub(crate) fn canonical_order(a: (Option<u32>, &str), b: (Option<u32>, &str)) -> Ordering {
    (a.0.is_none(), a.0, a.1).cmp(&(b.0.is_none(), b.0, b.1))
}

/// Classifies candidates and applies overrides.
///
/// ```
/// use quire_corpus::{DiscoveredBookRoot, resolve_books};
///
/// let roots: Vec<_> = ["Book 1", "Book 1 - Draft 2", "Book 2", "Book 2/Draft 1"]
///     .into_iter()
///     .map(|path| DiscoveredBookRoot::by_name(path, None))
///     .collect();
/// let resolution = resolve_books(&roots, None);
/// assert_eq!(resolution.included_roots, ["Book 1", "Book 2"]);
/// assert_eq!(resolution.excluded_roots, ["Book 1 - Draft 2", "Book 2/Draft 1"]);
/// ```
#[instrument(skip_all, fields(candidates = discovered.len(), overrides = overrides.map_or(0, |o| o.len())))]
pub fn resolve_books(discovered: &[DiscoveredBookRoot], overrides: Option<&BookInclusionOverrides>) -> BookResolution {
    if discovered.is_empty() {
        return BookResolution::default();
    }
    let mut sorted: Vec<&DiscoveredBookRoot> = discovered.iter().collect();
    sorted.sort_by(|a, b| canonical_order((a.book_number, a.root_path.as_str()), (b.book_number, b.root_path.as_str())));
    let mut seen = BTreeSet::new();
    sorted.retain(|candidate| seen.insert(candidate.root_path.as_str()));

    let candidates: Vec<ResolvedBook> = sorted
        .iter()
        .map(|candidate| {
            let root_path = candidate.root_path.as_str();
            let mut nested_under: Option<&str> = None;
            for other in &sorted {
                let other = other.root_path.as_str();
                // Strictly longer wins, so the first in canonical order keeps any tie.
                if other != root_path
                    && is_within(root_path, other)
                    && nested_under.is_none_or(|current| other.len() > current.len())
                {
                    nested_under = Some(other);
                }
            }
            let is_nested = nested_under.is_some();
            let is_variant = is_draft_variant(root_path);
            let default_included = !is_variant && !is_nested;
            let override_included = overrides.and_then(|o| o.get(root_path));
            let (included, status) = match override_included {
                Some(true) => (true, BookStatus::Included),
                Some(false) => (false, BookStatus::ExcludedManual),
                None if is_nested => (false, BookStatus::ExcludedNested),
                None if is_variant => (false, BookStatus::ExcludedVariant),
                None => (true, BookStatus::Included),
            };
            tracing::trace!(root = root_path, is_variant, is_nested, %status, "Classified book candidate");
            ResolvedBook {
                id: root_path.to_string(),
                root_path: root_path.to_string(),
                book_number: candidate.book_number,
                detected_by: DetectedBy::from_flags(candidate.detected_by_name, candidate.detected_by_outline),
                is_variant,
                is_nested,
                nested_under: nested_under.map(str::to_string),
                default_included,
                included,
                status,
                override_included,
            }
        })
        .collect();

    let (included, excluded): (Vec<_>, Vec<_>) = candidates.iter().cloned().partition(|book| book.included);
    let has_variant_exclusions = excluded.iter().any(|b| b.status == BookStatus::ExcludedVariant);
    let has_nested_exclusions = excluded.iter().any(|b| b.status == BookStatus::ExcludedNested);
    tracing::debug!(included = included.len(), excluded = excluded.len(), "Book resolution complete");
    BookResolution {
        included_roots: included.iter().map(|book| book.root_path.clone()).collect(),
        excluded_roots: excluded.iter().map(|book| book.root_path.clone()).collect(),
        candidates,
        included,
        excluded,
        has_variant_exclusions,
        has_nested_exclusions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn roots(paths: &[&str]) -> Vec<DiscoveredBookRoot> {
        paths.iter().map(|path| DiscoveredBookRoot::by_name(path, crate::book_number(quire_storage::leaf(path)))).collect()
    }

    const DEFAULT_INPUT: &[&str] = &["Book 1", "Book 1 - Draft 2", "Book 2", "Book 2/Draft 1"];

    #[test]
    fn test_empty_input() {
        let resolution = resolve_books(&[], None);
        assert_eq!(resolution, BookResolution::default());
        assert!(resolution.is_empty());
    }

    #[test]
    fn test_default_partition() {
        let resolution = resolve_books(&roots(DEFAULT_INPUT), None);
        assert_eq!(resolution.included_roots, vec!["Book 1", "Book 2"]);
        assert_eq!(resolution.excluded_roots, vec!["Book 1 - Draft 2", "Book 2/Draft 1"]);
        assert!(resolution.has_variant_exclusions);
        assert!(resolution.has_nested_exclusions);

        let draft = resolution.get("Book 1 - Draft 2").unwrap();
        assert_eq!(draft.status, BookStatus::ExcludedVariant);
        let nested = resolution.get("Book 2/Draft 1").unwrap();
        assert_eq!(nested.status, BookStatus::ExcludedNested);
        assert_eq!(nested.nested_under.as_deref(), Some("Book 2"));
        assert!(nested.is_variant);
    }

    #[test]
    fn test_override_escape_hatch() {
        let overrides: BookInclusionOverrides = [("Book 1 - Draft 2", true)].into_iter().collect();
        let baseline = resolve_books(&roots(DEFAULT_INPUT), None);
        let resolution = resolve_books(&roots(DEFAULT_INPUT), Some(&overrides));
        let draft = resolution.get("Book 1 - Draft 2").unwrap();
        assert!(draft.included);
        assert_eq!(draft.status, BookStatus::Included);
        assert_eq!(draft.override_included, Some(true));
        assert_eq!(draft.status_label(), "Included (override)");
        assert_eq!(resolution.get("Book 1"), baseline.get("Book 1"));
        assert!(!resolution.has_variant_exclusions);
    }

    #[test]
    fn test_manual_exclusion() {
        let overrides: BookInclusionOverrides = [("Book 2", false), ("Book 1", true)].into_iter().collect();
        let resolution = resolve_books(&roots(DEFAULT_INPUT), Some(&overrides));
        let book2 = resolution.get("Book 2").unwrap();
        assert!(!book2.included);
        assert_eq!(book2.status, BookStatus::ExcludedManual);
        assert_eq!(book2.status_label(), "Excluded (override)");
        // Override that agrees with the default.
        assert_eq!(resolution.get("Book 1").unwrap().status_label(), "Included");
        assert_eq!(resolution.included_roots, vec!["Book 1"]);
    }

    #[test]
    fn test_inclusion_is_explainable() {
        let overrides: BookInclusionOverrides = [("Book 2/Draft 1", true), ("Book 1", false)].into_iter().collect();
        for resolution in [resolve_books(&roots(DEFAULT_INPUT), None), resolve_books(&roots(DEFAULT_INPUT), Some(&overrides))] {
            for book in &resolution.candidates {
                let expected = book.override_included.unwrap_or(!book.is_variant && !book.is_nested);
                assert_eq!(book.included, expected, "{}", book.root_path);
                assert_eq!(book.included, book.status == BookStatus::Included, "{}", book.root_path);
            }
        }
    }

    #[test]
    fn test_canonical_order() {
        let input = roots(&["Zeta", "Book 10", "Alpha", "Book 2", "Series/Book 2"]);
        let resolution = resolve_books(&input, None);
        let order: Vec<_> = resolution.candidates.iter().map(|b| b.root_path.as_str()).collect();
        assert_eq!(order, vec!["Book 2", "Series/Book 2", "Book 10", "Alpha", "Zeta"]);
    }

    #[test]
    fn test_determinism() {
        let mut reversed = roots(DEFAULT_INPUT);
        reversed.reverse();
        let overrides: BookInclusionOverrides = [("Book 2", false)].into_iter().collect();
        assert_eq!(
            resolve_books(&roots(DEFAULT_INPUT), Some(&overrides)),
            resolve_books(&reversed, Some(&overrides))
        );
    }

    #[test]
    fn test_nearest_enclosing_root() {
        let resolution = resolve_books(&roots(&["Saga", "Saga/Book 1", "Saga/Book 1/Part"]), None);
        assert_eq!(resolution.get("Saga/Book 1/Part").unwrap().nested_under.as_deref(), Some("Saga/Book 1"));
        assert_eq!(resolution.get("Saga/Book 1").unwrap().nested_under.as_deref(), Some("Saga"));
        assert_eq!(resolution.included_roots, vec!["Saga"]);
    }

    #[test]
    fn test_sibling_prefix_is_not_nesting() {
        let resolution = resolve_books(&roots(&["Book 1", "Book 10"]), None);
        assert_eq!(resolution.included_roots, vec!["Book 1", "Book 10"]);
        assert!(!resolution.has_nested_exclusions);
    }

    #[test]
    fn test_detected_by() {
        let mut both = DiscoveredBookRoot::by_name("Book 1", Some(1));
        both.detected_by_outline = true;
        let input = vec![both, DiscoveredBookRoot::by_outline("Other", None), DiscoveredBookRoot::by_name("Book 2", Some(2))];
        let resolution = resolve_books(&input, None);
        let detected: Vec<_> = resolution.candidates.iter().map(|b| b.detected_by.as_str()).collect();
        assert_eq!(detected, vec!["name+outline", "name", "outline"]);
    }

    #[test]
    fn test_malformed_overrides_are_dropped() {
        let overrides = BookInclusionOverrides::from_raw([
            ("Book 1 - Draft 2", json!(true)),
            ("", json!(true)),
            ("   ", json!(false)),
            ("/", json!(false)),
            ("Book 2", json!("false")),
            ("Book 3", json!(0)),
            ("Book 4", json!(null)),
            ("/Book 5/", json!(false)),
        ]);
        assert_eq!(overrides.iter().collect::<Vec<_>>(), vec![("Book 1 - Draft 2", true), ("Book 5", false)]);
    }

    #[test]
    fn test_override_keys_are_normalized() {
        let overrides: BookInclusionOverrides = [("/Book 1 - Draft 2//", true)].into_iter().collect();
        let resolution = resolve_books(&roots(DEFAULT_INPUT), Some(&overrides));
        assert!(resolution.get("Book 1 - Draft 2").unwrap().included);
    }

    #[test]
    fn test_duplicate_candidates_collapse() {
        let mut input = roots(&["Book 1", "Book 1"]);
        input.push(DiscoveredBookRoot::by_outline("Book 1", None));
        let resolution = resolve_books(&input, None);
        assert_eq!(resolution.candidates.len(), 1);
        assert!(!resolution.has_nested_exclusions);
    }
}
