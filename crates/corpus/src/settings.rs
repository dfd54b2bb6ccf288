use serde_json::Value;
use std::collections::BTreeMap;

use crate::class_config::ClassConfig;
use crate::scan_roots::DEFAULT_MAX_SCAN_ROOTS;

/// User-facing corpus settings.
///
/// Values are taken as typed; normalization (path keys, alias casing, override
/// values) happens when a [`CorpusResolver`](crate::CorpusResolver) is built.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CorpusSettings {
    /// Scan-root patterns; `/` is the whole store.
    pub scan_roots: Vec<String>,
    pub max_scan_roots: usize,
    /// Classes in scope; `/` allows every class.
    pub class_scope: Vec<String>,
    pub classes: Vec<ClassConfig>,
    /// Root path to inclusion flag. Non-boolean values are ignored.
    pub book_overrides: BTreeMap<String, Value>,
    /// Frontmatter key alias to canonical key, on top of the built-in aliases.
    pub metadata_aliases: BTreeMap<String, String>,
}
impl Default for CorpusSettings {
    fn default() -> Self {
        Self {
            scan_roots: vec!["/".to_string()],
            max_scan_roots: DEFAULT_MAX_SCAN_ROOTS,
            class_scope: vec!["/".to_string()],
            classes: ClassConfig::defaults(),
            book_overrides: BTreeMap::new(),
            metadata_aliases: BTreeMap::new(),
        }
    }
}
