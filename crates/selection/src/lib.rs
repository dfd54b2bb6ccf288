//! Stable selection keys.
//!
//! The presentation layer persists "what is selected" as a single opaque
//! string. A key names a class of entity (`scene`, `outline`, ...), the
//! [`Scope`] it was selected in, and the entity itself: by its persistent
//! scene id when it has one, so the key survives file renames, or by its
//! store path otherwise.
//!
//! ```text
//! scene::book::sceneId::scn_a1b2c3d4
//! outline::saga::path::Series/Outline.md
//! scene::book::Book 1/12 Opening.md        (legacy, pre-discriminator)
//! ```
//!
//! Keys written by older versions lack the `sceneId`/`path` discriminator.
//! They still parse, flagged as [`Identity::Legacy`], so migration code can
//! recognise and upgrade them.

pub mod error;
mod key;
mod scope;

pub use crate::key::{Identity, KeyParts, SelectionKey, build, build_legacy, parse, same_selection};
pub use crate::scope::Scope;
