//! Per-class inclusion settings and the class allow-set.

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter, Result as FmtResult};

use quire_selection::Scope;

pub const SCENE_CLASS: &str = "scene";
pub const OUTLINE_CLASS: &str = "outline";
const ALLOW_ALL: &str = "/";

/// How much of a class is surfaced at a given scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ClassScopeMode {
    None,
    Summary,
    #[default]
    Full,
}
impl ClassScopeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Summary => "summary",
            Self::Full => "full",
        }
    }
}
impl Display for ClassScopeMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Settings for one document class.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassConfig {
    pub class: String,
    #[cfg_attr(feature = "serde", serde(default = "enabled"))]
    pub enabled: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub book_scope: ClassScopeMode,
    #[cfg_attr(feature = "serde", serde(default))]
    pub saga_scope: ClassScopeMode,
}
#[cfg(feature = "serde")]
fn enabled() -> bool {
    true
}

impl ClassConfig {
    pub fn new(class: impl AsRef<str>) -> Self {
        Self {
            class: class.as_ref().trim().to_lowercase(),
            enabled: true,
            book_scope: ClassScopeMode::Full,
            saga_scope: ClassScopeMode::Full,
        }
    }

    /// Scenes are listed inside a book; a saga only summarizes them.
    pub fn scene() -> Self {
        Self {
            saga_scope: ClassScopeMode::Summary,
            ..Self::new(SCENE_CLASS)
        }
    }

    pub fn outline() -> Self {
        Self::new(OUTLINE_CLASS)
    }

    /// The built-in class set.
    pub fn defaults() -> Vec<Self> {
        vec![Self::scene(), Self::outline()]
    }

    pub fn mode(&self, scope: Scope) -> ClassScopeMode {
        match scope {
            Scope::Book => self.book_scope,
            Scope::Saga => self.saga_scope,
        }
    }

    /// Whether documents of this class are surfaced at `scope` at all.
    pub fn is_active(&self, scope: Scope) -> bool {
        self.enabled && self.mode(scope) != ClassScopeMode::None
    }

    /// Looks `class` up case-insensitively.
    pub fn find<'a>(configs: &'a [Self], class: &str) -> Option<&'a Self> {
        configs.iter().find(|config| config.class.eq_ignore_ascii_case(class.trim()))
    }
}

/// Classes the user has put in scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ClassAllowSet {
    #[default]
    AllowAll,
    /// Lowercased class names.
    Only(BTreeSet<String>),
}
impl ClassAllowSet {
    /// `/` anywhere in the list allows every class; blank entries are ignored.
    pub fn from_scope<S: AsRef<str>>(entries: &[S]) -> Self {
        let mut classes = BTreeSet::new();
        for entry in entries {
            match entry.as_ref().trim() {
                ALLOW_ALL => return Self::AllowAll,
                "" => {},
                class => {
                    classes.insert(class.to_lowercase());
                },
            }
        }
        Self::Only(classes)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Only(classes) if classes.is_empty())
    }

    pub fn allows(&self, class: &str) -> bool {
        match self {
            Self::AllowAll => true,
            Self::Only(classes) => classes.contains(&class.trim().to_lowercase()),
        }
    }
}
