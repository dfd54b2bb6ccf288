//! Book-folder and draft-variant recognition.
//!
//! Both classifiers look at path *segments* only. Neither reads a document.

use quire_storage::normalize_path;

use crate::consts::{BOOK_FOLDER_REGEX, VARIANT_REGEX_SET};

/// Returns the book numeral when `segment` is named like a book folder
/// (`Book 3`, `book3`, `Book 3 - Draft 2`).
pub fn book_number(segment: &str) -> Option<u32> {
    BOOK_FOLDER_REGEX
        .captures(segment.trim())
        .and_then(|captures| captures.get(1))
        .and_then(|numeral| numeral.as_str().parse().ok())
}

pub fn is_book_folder(segment: &str) -> bool {
    BOOK_FOLDER_REGEX.is_match(segment.trim())
}

fn is_variant_segment(segment: &str) -> bool {
    VARIANT_REGEX_SET.is_match(segment)
}

/// Returns `true` when a path looks like a draft, alternate, revision or
/// other variant copy of a book.
///
/// When the path contains book-folder segments, only those segments and their
/// immediate neighbours are examined: in `Draft Archive/Series/Book 1` the
/// archive folder is too far up to count. Without a book-folder segment, only
/// the leaf is examined.
///
/// ```
/// use quire_corpus::is_draft_variant;
/// assert!(!is_draft_variant("Book 1"));
/// assert!(is_draft_variant("Book 1 - Draft 2"));
/// assert!(is_draft_variant("Series/Book 2/Draft 1"));
/// assert!(is_draft_variant("Notes/My Draft Ideas"));
/// ```
pub fn is_draft_variant(path: &str) -> bool {
    let path = normalize_path(path);
    if path.is_empty() {
        return false;
    }
    let segments: Vec<&str> = path.split('/').collect();
    let anchors: Vec<usize> = segments
        .iter()
        .enumerate()
        .filter(|(_, segment)| is_book_folder(segment))
        .map(|(index, _)| index)
        .collect();
    if anchors.is_empty() {
        return segments.last().is_some_and(|leaf| is_variant_segment(leaf));
    }
    anchors.into_iter().any(|anchor| {
        let start = anchor.saturating_sub(1);
        let end = (anchor + 1).min(segments.len() - 1);
        segments[start..=end].iter().any(|segment| is_variant_segment(segment))
    })
}
