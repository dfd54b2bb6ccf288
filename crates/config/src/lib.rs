//! Layered configuration for quire.
//!
//! Sources, lowest precedence first:
//!
//! 1. Built-in defaults.
//! 2. `config.toml`, `config.yaml` and `config.json` in the platform
//!    configuration directory (e.g. `~/.config/quire` on Linux), when present.
//! 3. Environment variables prefixed `QUIRE_`, with `__` separating nested
//!    keys: `QUIRE_CORPUS__MAX_SCAN_ROOTS=20`.
//!
//! ```toml
//! [corpus]
//! scan_roots = ["Series/Book *"]
//! class_scope = ["scene", "outline"]
//!
//! [corpus.book_overrides]
//! "Series/Book 1 - Draft 2" = true
//!
//! [[corpus.classes]]
//! class = "scene"
//! book_scope = "full"
//! saga_scope = "summary"
//! ```

pub mod error;

use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use quire_corpus::CorpusSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::instrument;

use crate::error::{ErrorKind, Result};

const ENV_PREFIX: &str = "QUIRE_";
const ENV_SEPARATOR: &str = "__";
const CONFIG_STEM: &str = "config";
const WHOLE_STORE: &str = "/";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub corpus: CorpusSettings,
}

impl Config {
    /// Loads defaults, the user's configuration files and the environment.
    #[instrument]
    pub fn load() -> Result<Self> {
        let dir = config_dir();
        match &dir {
            Some(dir) => tracing::debug!(dir = %dir.display(), "Loading configuration"),
            None => tracing::debug!("No configuration directory for this platform"),
        }
        Self::from_figment(Self::figment(dir.as_deref()).merge(env()))
    }

    /// Loads defaults and the configuration files found in `dir`, without the
    /// environment.
    #[instrument(skip_all, fields(dir = %dir.as_ref().display()))]
    pub fn load_from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        Self::from_figment(Self::figment(Some(dir.as_ref())))
    }

    /// Loads defaults overlaid with a single file, chosen by extension.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
        }
        let defaults = Figment::from(Serialized::defaults(Self::default()));
        let figment = match path.extension().and_then(|ext| ext.to_str()).map(str::to_lowercase).as_deref() {
            Some("toml") => defaults.merge(Toml::file(path)),
            Some("yaml" | "yml") => defaults.merge(Yaml::file(path)),
            Some("json") => defaults.merge(Json::file(path)),
            _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
        };
        Self::from_figment(figment)
    }

    /// Extracts and validates a configuration from any figment.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        Ok(config)
    }

    fn figment(dir: Option<&Path>) -> Figment {
        let figment = Figment::from(Serialized::defaults(Self::default()));
        match dir {
            Some(dir) => figment
                .merge(Toml::file(dir.join(format!("{CONFIG_STEM}.toml"))))
                .merge(Yaml::file(dir.join(format!("{CONFIG_STEM}.yaml"))))
                .merge(Json::file(dir.join(format!("{CONFIG_STEM}.json")))),
            None => figment,
        }
    }

    /// Checks values the type system cannot.
    pub fn validate(&self) -> Result<()> {
        let corpus = &self.corpus;
        if corpus.max_scan_roots == 0 {
            exn::bail!(ErrorKind::Invalid("max_scan_roots must be at least 1".to_string()));
        }
        for pattern in &corpus.scan_roots {
            if pattern.trim().is_empty() || pattern.trim() == WHOLE_STORE {
                continue;
            }
            quire_storage::validate_path(pattern).or_raise(|| ErrorKind::Invalid(format!("scan root {pattern:?}")))?;
        }
        if let Some(config) = corpus.classes.iter().find(|config| config.class.trim().is_empty()) {
            exn::bail!(ErrorKind::Invalid(format!("class configuration without a class name: {config:?}")));
        }
        Ok(())
    }
}

/// Platform configuration directory, if the platform has one.
pub fn config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "quire").map(|dirs| dirs.config_dir().to_path_buf())
}

fn env() -> Env {
    Env::prefixed(ENV_PREFIX).split(ENV_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_corpus::{ClassScopeMode, DEFAULT_MAX_SCAN_ROOTS};
    use rstest::rstest;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from_dir(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.corpus.scan_roots, vec!["/"]);
        assert_eq!(config.corpus.max_scan_roots, DEFAULT_MAX_SCAN_ROOTS);
        assert_eq!(config.corpus.class_scope, vec!["/"]);
    }

    #[test]
    fn test_toml_file() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            "config.toml",
            r#"
            [corpus]
            scan_roots = ["Series/Book *"]
            max_scan_roots = 10

            [corpus.book_overrides]
            "Series/Book 1 - Draft 2" = true
            "Series/Book 3" = "maybe"

            [corpus.metadata_aliases]
            Kind = "Class"

            [[corpus.classes]]
            class = "scene"
            book_scope = "summary"
            "#,
        );
        let config = Config::load_from_dir(dir.path()).unwrap();
        let corpus = &config.corpus;
        assert_eq!(corpus.scan_roots, vec!["Series/Book *"]);
        assert_eq!(corpus.max_scan_roots, 10);
        assert_eq!(corpus.class_scope, vec!["/"]);
        assert_eq!(corpus.book_overrides.get("Series/Book 1 - Draft 2"), Some(&json!(true)));
        assert_eq!(corpus.book_overrides.get("Series/Book 3"), Some(&json!("maybe")));
        assert_eq!(corpus.metadata_aliases.get("Kind").map(String::as_str), Some("Class"));
        assert_eq!(corpus.classes.len(), 1);
        assert!(corpus.classes[0].enabled);
        assert_eq!(corpus.classes[0].book_scope, ClassScopeMode::Summary);
        assert_eq!(corpus.classes[0].saga_scope, ClassScopeMode::Full);
    }

    #[test]
    fn test_later_files_take_precedence() {
        let dir = TempDir::new().unwrap();
        write(&dir, "config.toml", "[corpus]\nmax_scan_roots = 10\nclass_scope = [\"scene\"]\n");
        write(&dir, "config.json", r#"{ "corpus": { "max_scan_roots": 20 } }"#);
        let config = Config::load_from_dir(dir.path()).unwrap();
        assert_eq!(config.corpus.max_scan_roots, 20);
        assert_eq!(config.corpus.class_scope, vec!["scene"]);
    }

    #[rstest]
    #[case("quire.yaml", "corpus:\n  scan_roots: [Manuscript]\n")]
    #[case("quire.YML", "corpus:\n  scan_roots: [Manuscript]\n")]
    #[case("quire.json", r#"{ "corpus": { "scan_roots": ["Manuscript"] } }"#)]
    #[case("quire.toml", "[corpus]\nscan_roots = [\"Manuscript\"]\n")]
    fn test_from_file(#[case] name: &str, #[case] contents: &str) {
        let dir = TempDir::new().unwrap();
        let config = Config::from_file(write(&dir, name, contents)).unwrap();
        assert_eq!(config.corpus.scan_roots, vec!["Manuscript"]);
        assert_eq!(config.corpus.max_scan_roots, DEFAULT_MAX_SCAN_ROOTS);
    }

    #[test]
    fn test_from_file_errors() {
        let dir = TempDir::new().unwrap();
        let missing = Config::from_file(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(&*missing, ErrorKind::NotFound(_)));

        let ini = Config::from_file(write(&dir, "config.ini", "scan_roots=/")).unwrap_err();
        assert!(matches!(&*ini, ErrorKind::UnsupportedFormat(_)));

        let broken = Config::from_file(write(&dir, "config.toml", "[corpus\n")).unwrap_err();
        assert!(matches!(&*broken, ErrorKind::Load));

        let mistyped = Config::from_file(write(&dir, "typed.toml", "[corpus]\nmax_scan_roots = \"many\"\n")).unwrap_err();
        assert!(matches!(&*mistyped, ErrorKind::Load));
    }

    #[rstest]
    #[case("[corpus]\nmax_scan_roots = 0\n")]
    #[case("[corpus]\nscan_roots = [\"../outside\"]\n")]
    #[case("[corpus]\nscan_roots = [\"Series/../..\"]\n")]
    #[case("[[corpus.classes]]\nclass = \" \"\n")]
    fn test_invalid_values(#[case] contents: &str) {
        let dir = TempDir::new().unwrap();
        let error = Config::from_file(write(&dir, "config.toml", contents)).unwrap_err();
        assert!(matches!(&*error, ErrorKind::Invalid(_)));
    }

    #[test]
    fn test_whole_store_patterns_are_valid() {
        let dir = TempDir::new().unwrap();
        let config = Config::from_file(write(&dir, "config.toml", "[corpus]\nscan_roots = [\"/\", \"\", \"Book *\"]\n")).unwrap();
        assert_eq!(config.corpus.scan_roots.len(), 3);
    }
}
