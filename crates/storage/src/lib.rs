//! Store snapshot types and listing traits.
//!
//! Nothing in this crate performs file I/O. A store is anything that can hand
//! over a complete listing of its folders and documents, plus the raw
//! frontmatter of a single document on request. Everything downstream treats
//! those listings as an immutable snapshot for the duration of one call.

pub mod backend;
pub mod error;
mod models;
mod path;

pub use crate::backend::{Lister, MetadataAccessor, Store};
pub use crate::models::{Document, Folder, RawMetadata};
pub use crate::path::{is_within, leaf, normalize as normalize_path, parent, validate as validate_path};
use std::sync::Arc;

pub type StoreHandle = Arc<dyn Store>;
