//! Selection Key Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A selection key error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for selection key operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Reasons a string is not a selection key.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Fewer than three `::`-separated tokens.
    #[display("selection key has too few segments: {_0:?}")]
    Truncated(#[error(not(source))] String),
    /// The class token is blank.
    #[display("selection key has no class name: {_0:?}")]
    MissingClass(#[error(not(source))] String),
    /// Not a recognised scope name.
    #[display("unknown scope: {_0:?}")]
    UnknownScope(#[error(not(source))] String),
}
