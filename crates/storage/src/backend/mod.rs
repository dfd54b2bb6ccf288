//! Store traits and implementations.
//!
//! A store is split along the two things consumers ask of it: a complete
//! listing ([`Lister`]) and per-document frontmatter ([`MetadataAccessor`]).
//! Both are synchronous and return complete snapshots; there is no streaming
//! contract.

#[cfg(feature = "mock")]
mod memory;

#[cfg(feature = "mock")]
pub use self::memory::MemoryStore;
use crate::models::{Document, Folder, RawMetadata};

/// Lists the contents of a store.
///
/// # Examples
///
/// ```
/// use quire_storage::Lister;
///
/// fn count_markdown(store: &dyn Lister) -> usize {
///     store.list_documents().iter().filter(|doc| doc.name.ends_with(".md")).count()
/// }
/// ```
pub trait Lister: Send + Sync {
    /// Name of the store. Used for logging only; uniqueness is not required.
    fn name(&self) -> &str;

    /// Every folder in the store, at any depth. Order is unspecified.
    fn list_folders(&self) -> Vec<Folder>;

    /// Every document in the store, at any depth. Order is unspecified.
    fn list_documents(&self) -> Vec<Document>;
}

/// Reads raw frontmatter for a document.
pub trait MetadataAccessor: Send + Sync {
    /// Returns the document's raw frontmatter, or `None` when the document has
    /// none or it could not be read. Consumers treat both identically.
    fn metadata(&self, document: &Document) -> Option<RawMetadata>;
}

/// A store that can both list and read metadata.
pub trait Store: Lister + MetadataAccessor {}
impl<T: Lister + MetadataAccessor> Store for T {}
