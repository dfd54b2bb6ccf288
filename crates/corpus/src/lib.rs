//! Corpus resolution.
//!
//! Turns a flat listing of documents into books and, within the active book,
//! scenes:
//!
//! 1. [`discover_book_roots`] nominates candidate book roots by folder name
//!    and by book-scoped outline documents.
//! 2. [`resolve_books`] classifies every candidate (draft variant, nested in
//!    another book, or neither), applies the author's overrides and puts the
//!    result in canonical order.
//! 3. [`CorpusResolver`] ties both together with scan-root expansion and
//!    scene enumeration, producing a [`CorpusSnapshot`].
//!
//! Every step is a pure function of the store listing and the settings; none
//! of them fail. Unreadable metadata, malformed overrides and missing scan
//! roots are skipped.

mod class_config;
mod classify;
mod consts;
mod discover;
mod metadata;
mod ownership;
mod resolve;
mod scan_roots;
mod settings;
mod snapshot;

pub use crate::class_config::{ClassAllowSet, ClassConfig, ClassScopeMode, OUTLINE_CLASS, SCENE_CLASS};
pub use crate::classify::{book_number, is_book_folder, is_draft_variant};
pub use crate::discover::{DiscoveredBookRoot, ScanRoot, discover_book_roots};
pub use crate::metadata::{AliasMap, CLASS_KEY, ID_KEY, Metadata, SCOPE_KEY, SUMMARY_KEY, SYNOPSIS_KEY};
pub use crate::ownership::{find_owner, is_path_included_by_books};
pub use crate::resolve::{BookInclusionOverrides, BookResolution, BookStatus, DetectedBy, ResolvedBook, resolve_books};
pub use crate::scan_roots::{DEFAULT_MAX_SCAN_ROOTS, PatternScanRoots, ResolvedScanRoots, ScanRootResolver};
pub use crate::settings::CorpusSettings;
pub use crate::snapshot::{BookItem, CorpusResolver, CorpusSnapshot, SceneItem, SnapshotRequest};
