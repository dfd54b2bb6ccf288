use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use quire_storage::normalize_path;

use crate::Scope;
use crate::error::{Error, ErrorKind};

const SEPARATOR: &str = "::";
const NO_SCOPE: &str = "none";
const SCENE_CLASS: &str = "scene";
const SCENE_ID_TAG: &str = "sceneId";
const PATH_TAG: &str = "path";

/// What a selection key points at.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    /// Persistent scene id; independent of where the file lives.
    SceneId(String),
    /// Store path.
    Path(String),
    /// Store path from a key written before the discriminator existed.
    Legacy(String),
}

/// The fields a key is built from.
///
/// `scene_id` only takes effect for the `scene` class; every other class is
/// identified by path.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyParts<'a> {
    pub class_name: &'a str,
    pub scope: Option<Scope>,
    pub file_path: &'a str,
    pub scene_id: Option<&'a str>,
}

/// A decoded selection key.
///
/// Equality compares class, scope and identity; two keys for the same scene id
/// are equal no matter which path the scene had when each was built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectionKey {
    pub class_name: String,
    pub scope: Option<Scope>,
    pub identity: Identity,
}

impl SelectionKey {
    /// Builds a key from its parts, preferring the scene id when one applies.
    pub fn new(parts: &KeyParts<'_>) -> Self {
        let class_name = parts.class_name.trim().to_string();
        let scene_id = parts.scene_id.map(str::trim).filter(|id| !id.is_empty());
        let identity = match scene_id {
            Some(id) if class_name == SCENE_CLASS => Identity::SceneId(id.to_string()),
            _ => Identity::Path(normalize_path(parts.file_path)),
        };
        Self {
            class_name,
            scope: parts.scope,
            identity,
        }
    }

    /// Builds a key in the pre-discriminator format.
    pub fn legacy(parts: &KeyParts<'_>) -> Self {
        Self {
            class_name: parts.class_name.trim().to_string(),
            scope: parts.scope,
            identity: Identity::Legacy(normalize_path(parts.file_path)),
        }
    }

    /// The path this key names, if it is path-based (current or legacy format).
    pub fn path(&self) -> Option<&str> {
        match &self.identity {
            Identity::Path(path) | Identity::Legacy(path) => Some(path),
            Identity::SceneId(_) => None,
        }
    }

    pub fn scene_id(&self) -> Option<&str> {
        match &self.identity {
            Identity::SceneId(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self.identity, Identity::Legacy(_))
    }

    /// Whether two keys select the same entity.
    ///
    /// Unlike `==`, a legacy key matches a current path key for the same
    /// (normalized) path.
    pub fn same_entity(&self, other: &Self) -> bool {
        if self.class_name != other.class_name || self.scope != other.scope {
            return false;
        }
        match (&self.identity, &other.identity) {
            (Identity::SceneId(a), Identity::SceneId(b)) => a == b,
            (Identity::SceneId(_), _) | (_, Identity::SceneId(_)) => false,
            _ => self.path().map(normalize_path) == other.path().map(normalize_path),
        }
    }
}

impl Display for SelectionKey {
    /// Encodes the key. Legacy identities are written back in the legacy
    /// format so that comparisons against persisted strings stay exact.
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let scope = self.scope.map_or(NO_SCOPE, |s| s.as_str());
        match &self.identity {
            Identity::SceneId(id) => write!(f, "{}{SEPARATOR}{scope}{SEPARATOR}{SCENE_ID_TAG}{SEPARATOR}{id}", self.class_name),
            Identity::Path(path) => write!(f, "{}{SEPARATOR}{scope}{SEPARATOR}{PATH_TAG}{SEPARATOR}{path}", self.class_name),
            Identity::Legacy(path) => write!(f, "{}{SEPARATOR}{scope}{SEPARATOR}{path}", self.class_name),
        }
    }
}

impl FromStr for SelectionKey {
    type Err = Error;

    /// Decodes a key.
    ///
    /// Scopes other than `book`/`saga` (including `none`) decode as no scope.
    /// An unrecognised discriminator means the key predates discriminators:
    /// everything from the third token on is a legacy path.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = s.split(SEPARATOR).collect();
        if tokens.len() < 3 {
            exn::bail!(ErrorKind::Truncated(s.to_string()));
        }
        let class_name = tokens[0].trim();
        if class_name.is_empty() {
            exn::bail!(ErrorKind::MissingClass(s.to_string()));
        }
        let scope = tokens[1].parse::<Scope>().ok();
        let identity = match tokens[2] {
            SCENE_ID_TAG => Identity::SceneId(tokens[3..].join(SEPARATOR)),
            PATH_TAG => Identity::Path(tokens[3..].join(SEPARATOR)),
            _ => Identity::Legacy(tokens[2..].join(SEPARATOR)),
        };
        Ok(Self {
            class_name: class_name.to_string(),
            scope,
            identity,
        })
    }
}

/// Encodes a selection key.
///
/// A blank `class_name` still encodes, but the result is not a key:
/// [`parse`] rejects it as [`MissingClass`](crate::error::ErrorKind::MissingClass).
/// Callers that may hold a blank class should check before building.
///
/// ```
/// use quire_selection::{KeyParts, Scope, build};
///
/// let parts = KeyParts {
///     class_name: "scene",
///     scope: Some(Scope::Book),
///     file_path: "Book 1/12 Opening.md",
///     scene_id: Some("scn_a1b2c3d4"),
/// };
/// assert_eq!(build(&parts), "scene::book::sceneId::scn_a1b2c3d4");
///
/// let parts = KeyParts { scene_id: None, ..parts };
/// assert_eq!(build(&parts), "scene::book::path::Book 1/12 Opening.md");
/// ```
pub fn build(parts: &KeyParts<'_>) -> String {
    SelectionKey::new(parts).to_string()
}

/// Encodes a key in the pre-discriminator format. Only migration code and
/// tests should need this.
pub fn build_legacy(parts: &KeyParts<'_>) -> String {
    SelectionKey::legacy(parts).to_string()
}

/// Decodes a selection key, or `None` if the string is not one.
pub fn parse(key: &str) -> Option<SelectionKey> {
    match key.parse() {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::trace!(key, error = %e, "Not a selection key");
            None
        },
    }
}

/// Whether two persisted keys select the same entity. See
/// [`SelectionKey::same_entity`].
pub fn same_selection(a: &str, b: &str) -> bool {
    match (parse(a), parse(b)) {
        (Some(a), Some(b)) => a.same_entity(&b),
        _ => false,
    }
}
