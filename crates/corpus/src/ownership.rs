//! Path-to-book ownership.
//!
//! A path belongs to the deepest candidate root containing it. Paths that no
//! candidate contains (character sheets, world notes, ...) are not book
//! material and are never filtered out on a book's account.

use quire_storage::{is_within, normalize_path};

use crate::resolve::ResolvedBook;

/// The candidate whose root most specifically contains `path`.
///
/// Candidates are expected in canonical order (as produced by
/// [`resolve_books`](crate::resolve_books)); when two roots of equal length
/// both contain the path, the first one wins.
pub fn find_owner<'a>(path: &str, candidates: &'a [ResolvedBook]) -> Option<&'a ResolvedBook> {
    let path = normalize_path(path);
    let mut owner: Option<&ResolvedBook> = None;
    for candidate in candidates {
        if is_within(&path, &candidate.root_path)
            && owner.is_none_or(|current| candidate.root_path.len() > current.root_path.len())
        {
            owner = Some(candidate);
        }
    }
    owner
}

/// Whether `path` survives book filtering: un-owned paths always do, owned
/// paths follow their owner's `included` flag.
///
/// ```
/// use quire_corpus::{DiscoveredBookRoot, is_path_included_by_books, resolve_books};
///
/// let roots: Vec<_> = ["Book 1", "Book 1 - Draft 2"]
///     .into_iter()
///     .map(|path| DiscoveredBookRoot::by_name(path, Some(1)))
///     .collect();
/// let books = resolve_books(&roots, None).candidates;
/// assert!(is_path_included_by_books("Book 1/01 Scene.md", &books));
/// assert!(!is_path_included_by_books("Book 1 - Draft 2/01 Scene.md", &books));
/// assert!(is_path_included_by_books("Character/Alice.md", &books));
/// ```
pub fn is_path_included_by_books(path: &str, candidates: &[ResolvedBook]) -> bool {
    find_owner(path, candidates).is_none_or(|owner| owner.included)
}
