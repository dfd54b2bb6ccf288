//! Frontmatter normalization.
//!
//! Raw frontmatter is whatever the author typed: `Class`, `class`, `CLASS`,
//! a string here and an array there. [`Metadata::normalize`] is the single
//! boundary where that is mapped onto canonical keys (via [`AliasMap`]) and
//! typed values. Nothing past this module looks at a raw map.

use quire_selection::Scope;
use quire_storage::RawMetadata;
use serde_json::Value;
use std::collections::BTreeMap;

pub const CLASS_KEY: &str = "Class";
pub const SCOPE_KEY: &str = "Scope";
pub const ID_KEY: &str = "ID";
pub const SYNOPSIS_KEY: &str = "Synopsis";
pub const SUMMARY_KEY: &str = "Summary";

const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("class", CLASS_KEY),
    ("scope", SCOPE_KEY),
    ("id", ID_KEY),
    ("sceneid", ID_KEY),
    ("scene id", ID_KEY),
    ("scene_id", ID_KEY),
    ("synopsis", SYNOPSIS_KEY),
    ("summary", SUMMARY_KEY),
];

/// Case-insensitive mapping from frontmatter keys to canonical keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasMap(BTreeMap<String, String>);

impl AliasMap {
    /// An alias map with no entries at all; every key is ignored.
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// Adds (or replaces) an alias. Blank aliases or canonical keys are ignored.
    pub fn with_alias(mut self, alias: impl AsRef<str>, canonical: impl AsRef<str>) -> Self {
        self.insert(alias, canonical);
        self
    }

    pub fn insert(&mut self, alias: impl AsRef<str>, canonical: impl AsRef<str>) {
        let alias = alias.as_ref().trim().to_lowercase();
        let canonical = canonical.as_ref().trim();
        if !alias.is_empty() && !canonical.is_empty() {
            self.0.insert(alias, canonical.to_string());
        }
    }

    /// Canonical key for a raw frontmatter key, if it is one we care about.
    pub fn canonical(&self, key: &str) -> Option<&str> {
        self.0.get(&key.trim().to_lowercase()).map(String::as_str)
    }
}
impl Default for AliasMap {
    /// The built-in aliases for every canonical key.
    fn default() -> Self {
        DEFAULT_ALIASES.iter().fold(Self::empty(), |map, (alias, canonical)| map.with_alias(alias, canonical))
    }
}
impl<K: AsRef<str>, V: AsRef<str>> Extend<(K, V)> for AliasMap {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (alias, canonical) in iter {
            self.insert(alias, canonical);
        }
    }
}

/// Typed view of the frontmatter fields corpus resolution consumes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    /// Lowercased, trimmed classes; a scalar `Class` becomes a single entry.
    pub classes: Vec<String>,
    pub scope: Option<Scope>,
    /// Persistent identity, trimmed and non-blank.
    pub id: Option<String>,
    pub synopsis: Option<String>,
    pub summary: Option<String>,
}

impl Metadata {
    /// Maps raw frontmatter onto canonical fields.
    ///
    /// When several raw keys alias the same canonical key, the first one (in
    /// the raw map's order) holding a usable value wins. Values of the wrong
    /// shape are treated as absent.
    pub fn normalize(raw: &RawMetadata, aliases: &AliasMap) -> Self {
        let mut metadata = Self::default();
        for (key, value) in raw {
            let Some(canonical) = aliases.canonical(key) else {
                continue;
            };
            match canonical {
                CLASS_KEY if metadata.classes.is_empty() => metadata.classes = classes(value),
                SCOPE_KEY if metadata.scope.is_none() => metadata.scope = text(value).and_then(|s| s.parse().ok()),
                ID_KEY if metadata.id.is_none() => metadata.id = text(value),
                SYNOPSIS_KEY if metadata.synopsis.is_none() => metadata.synopsis = text(value),
                SUMMARY_KEY if metadata.summary.is_none() => metadata.summary = text(value),
                _ => {},
            }
        }
        metadata
    }

    /// Case-insensitive class membership.
    pub fn has_class(&self, class: &str) -> bool {
        let class = class.trim().to_lowercase();
        self.classes.iter().any(|c| *c == class)
    }

    /// Whether either the synopsis or the summary has content.
    pub fn has_synopsis(&self) -> bool {
        self.synopsis.is_some() || self.summary.is_some()
    }
}

/// Trimmed, non-blank text from a string or number.
fn text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn classes(value: &Value) -> Vec<String> {
    let values = match value {
        Value::Array(values) => values.iter().filter_map(text).collect(),
        scalar => text(scalar).into_iter().collect::<Vec<_>>(),
    };
    values.into_iter().map(|class| class.to_lowercase()).collect()
}
