//! Corpus snapshots: the books of a store and the scenes of the active book.

use quire_selection::{KeyParts, Scope, build};
use quire_storage::{Document, StoreHandle, is_within};
use tracing::instrument;

use crate::class_config::{ClassAllowSet, ClassConfig, SCENE_CLASS};
use crate::consts::SCENE_NUMBER_REGEX;
use crate::discover::{ScanRoot, discover_book_roots};
use crate::metadata::{AliasMap, Metadata};
use crate::resolve::{BookInclusionOverrides, BookResolution, ResolvedBook, resolve_books};
use crate::scan_roots::{PatternScanRoots, ResolvedScanRoots, ScanRootResolver};
use crate::settings::CorpusSettings;

const BOOK_CLASS: &str = "book";
const MIN_LABEL: u32 = 1;
const MAX_LABEL: u32 = 999;

/// An included book, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BookItem {
    /// Same as the resolved book's id (its root path).
    pub id: String,
    /// `B1`, `B2`, ...
    pub display_label: String,
    pub root_path: String,
    pub book_number: Option<u32>,
}
impl BookItem {
    /// Selection key for this book, as selected across the saga.
    pub fn selection_key(&self) -> String {
        build(&KeyParts {
            class_name: BOOK_CLASS,
            scope: Some(Scope::Saga),
            file_path: &self.root_path,
            scene_id: None,
        })
    }
}

/// A scene of the active book, ready for display.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SceneItem {
    /// The persistent scene id when there is one, otherwise the path.
    pub id: String,
    /// `S1`, `S2.5`, ...
    pub display_label: String,
    pub file_path: String,
    /// Leading number of the file title (`12 Opening.md` is 12).
    pub scene_number: Option<f64>,
    pub has_synopsis: bool,
    pub scene_id: Option<String>,
}
impl SceneItem {
    /// Selection key for this scene; survives renames when it has a scene id.
    pub fn selection_key(&self) -> String {
        build(&KeyParts {
            class_name: SCENE_CLASS,
            scope: Some(Scope::Book),
            file_path: &self.file_path,
            scene_id: self.scene_id.as_deref(),
        })
    }
}

/// What to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRequest {
    pub scope: Scope,
    /// Preferred active book. Ignored unless it names an included book.
    pub focus_book_id: Option<String>,
    /// Previously resolved scan roots; skips pattern expansion when present.
    pub resolved_scan_roots: Option<ResolvedScanRoots>,
}
impl SnapshotRequest {
    pub fn new(scope: Scope) -> Self {
        Self {
            scope,
            focus_book_id: None,
            resolved_scan_roots: None,
        }
    }

    pub fn with_focus(mut self, book_id: impl Into<String>) -> Self {
        self.focus_book_id = Some(book_id.into());
        self
    }

    pub fn with_scan_roots(mut self, resolved: ResolvedScanRoots) -> Self {
        self.resolved_scan_roots = Some(resolved);
        self
    }
}

/// The result of one resolution run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CorpusSnapshot {
    pub scope: Scope,
    /// Scan roots this snapshot was built from; hand back in the next request
    /// to skip re-expansion.
    pub resolved_scan_roots: ResolvedScanRoots,
    /// Included books in canonical order.
    pub books: Vec<BookItem>,
    /// Scenes of the active book, in display order. Always empty at saga scope.
    pub scenes: Vec<SceneItem>,
    pub active_book_id: Option<String>,
    /// Full resolution, excluded candidates included.
    pub resolution: BookResolution,
}
impl CorpusSnapshot {
    fn empty(scope: Scope, resolved_scan_roots: ResolvedScanRoots) -> Self {
        Self {
            scope,
            resolved_scan_roots,
            books: Vec::new(),
            scenes: Vec::new(),
            active_book_id: None,
            resolution: BookResolution::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty() && self.scenes.is_empty()
    }

    pub fn active_book(&self) -> Option<&BookItem> {
        let active = self.active_book_id.as_deref()?;
        self.books.iter().find(|book| book.id == active)
    }
}

/// Builds [`CorpusSnapshot`]s over a store.
///
/// Every call recomputes from the store's current listing; the only state
/// carried between calls is what the caller passes back in the request.
pub struct CorpusResolver {
    store: StoreHandle,
    scan_root_patterns: Vec<String>,
    max_scan_roots: usize,
    allowed_classes: ClassAllowSet,
    classes: Vec<ClassConfig>,
    overrides: BookInclusionOverrides,
    aliases: AliasMap,
    scan_root_resolver: Option<Box<dyn ScanRootResolver>>,
}

impl CorpusResolver {
    pub fn new(store: StoreHandle, settings: &CorpusSettings) -> Self {
        let mut aliases = AliasMap::default();
        aliases.extend(&settings.metadata_aliases);
        Self {
            store,
            scan_root_patterns: settings.scan_roots.clone(),
            max_scan_roots: settings.max_scan_roots,
            allowed_classes: ClassAllowSet::from_scope(&settings.class_scope),
            classes: settings.classes.clone(),
            overrides: BookInclusionOverrides::from_raw(settings.book_overrides.clone()),
            aliases,
            scan_root_resolver: None,
        }
    }

    /// Replaces pattern expansion against the store's folders.
    pub fn with_scan_root_resolver(mut self, resolver: impl ScanRootResolver + 'static) -> Self {
        self.scan_root_resolver = Some(Box::new(resolver));
        self
    }

    /// Expands the configured scan-root patterns.
    pub fn resolve_scan_roots(&self) -> ResolvedScanRoots {
        match &self.scan_root_resolver {
            Some(resolver) => resolver.resolve(&self.scan_root_patterns, self.max_scan_roots),
            None => PatternScanRoots::new(self.store.as_ref()).resolve(&self.scan_root_patterns, self.max_scan_roots),
        }
    }

    #[instrument(skip_all, fields(store = self.store.name(), scope = %request.scope))]
    pub fn resolve(&self, request: &SnapshotRequest) -> CorpusSnapshot {
        if self.allowed_classes.is_empty() {
            tracing::debug!("No classes in scope; returning an empty snapshot");
            return CorpusSnapshot::empty(request.scope, ResolvedScanRoots::default());
        }
        let resolved_scan_roots = match &request.resolved_scan_roots {
            Some(cached) => cached.clone(),
            None => self.resolve_scan_roots(),
        };
        if resolved_scan_roots.is_empty() {
            tracing::debug!("No scan roots; returning an empty snapshot");
            return CorpusSnapshot::empty(request.scope, resolved_scan_roots);
        }
        let scan_roots = resolved_scan_roots.scan_roots();

        let store = self.store.as_ref();
        let discovered = discover_book_roots(&scan_roots, store, store, &self.aliases);
        let resolution = resolve_books(&discovered, Some(&self.overrides));
        let books: Vec<BookItem> = resolution
            .included
            .iter()
            .enumerate()
            .map(|(index, book)| BookItem {
                id: book.id.clone(),
                display_label: format!("B{}", label_number(book.book_number, index)),
                root_path: book.root_path.clone(),
                book_number: book.book_number,
            })
            .collect();

        let active_book_id = request
            .focus_book_id
            .as_deref()
            .and_then(|focus| books.iter().find(|book| book.id == focus))
            .or(books.first())
            .map(|book| book.id.clone());

        let scenes = match (request.scope, active_book_id.as_deref().and_then(|id| resolution.get(id))) {
            (Scope::Book, Some(active)) => self.scenes(&scan_roots, active),
            _ => Vec::new(),
        };
        tracing::debug!(books = books.len(), scenes = scenes.len(), active_book = ?active_book_id, "Snapshot resolved");

        CorpusSnapshot {
            scope: request.scope,
            resolved_scan_roots,
            books,
            scenes,
            active_book_id,
            resolution,
        }
    }

    fn scenes_enabled(&self) -> bool {
        let fallback = ClassConfig::scene();
        let config = ClassConfig::find(&self.classes, SCENE_CLASS).unwrap_or(&fallback);
        self.allowed_classes.allows(SCENE_CLASS) && config.is_active(Scope::Book)
    }

    /// Scenes anywhere beneath the active book's root, including inside folders
    /// that are themselves (excluded) candidates.
    fn scenes(&self, scan_roots: &[ScanRoot], active: &ResolvedBook) -> Vec<SceneItem> {
        if !self.scenes_enabled() {
            tracing::debug!("Scene class disabled at book scope");
            return Vec::new();
        }
        let mut scenes: Vec<SceneItem> = self
            .store
            .list_documents()
            .into_iter()
            .filter(|document| scan_roots.iter().any(|root| root.contains(&document.path)))
            .filter(|document| is_within(&document.path, &active.root_path))
            .filter_map(|document| self.scene(document))
            .collect();
        scenes.sort_by(|a, b| {
            let (a_number, b_number) = (a.scene_number, b.scene_number);
            a_number
                .is_none()
                .cmp(&b_number.is_none())
                .then_with(|| a_number.unwrap_or_default().total_cmp(&b_number.unwrap_or_default()))
                .then_with(|| a.file_path.cmp(&b.file_path))
        });
        for (index, scene) in scenes.iter_mut().enumerate() {
            scene.display_label = format!("S{}", scene_label_number(scene.scene_number, index));
        }
        scenes
    }

    fn scene(&self, document: Document) -> Option<SceneItem> {
        let Some(raw) = self.store.metadata(&document) else {
            tracing::trace!(path = %document.path, "No readable metadata; skipping");
            return None;
        };
        let metadata = Metadata::normalize(&raw, &self.aliases);
        if !metadata.has_class(SCENE_CLASS) {
            return None;
        }
        let scene_number = SCENE_NUMBER_REGEX
            .captures(&document.basename)
            .and_then(|captures| captures.get(1))
            .and_then(|number| number.as_str().parse::<f64>().ok());
        let has_synopsis = metadata.has_synopsis();
        Some(SceneItem {
            id: metadata.id.clone().unwrap_or_else(|| document.path.clone()),
            display_label: String::new(),
            file_path: document.path,
            scene_number,
            has_synopsis,
            scene_id: metadata.id,
        })
    }
}

fn label_number(number: Option<u32>, index: usize) -> u32 {
    number
        .unwrap_or_else(|| u32::try_from(index + 1).unwrap_or(MAX_LABEL))
        .clamp(MIN_LABEL, MAX_LABEL)
}

/// Integral numbers print without a fraction; `2.5` stays `2.5`.
fn scene_label_number(number: Option<f64>, index: usize) -> String {
    match number {
        Some(number) => {
            let clamped = number.clamp(f64::from(MIN_LABEL), f64::from(MAX_LABEL));
            match clamped.fract() == 0.0 {
                true => format!("{}", clamped as u32),
                false => format!("{clamped}"),
            }
        },
        None => label_number(None, index).to_string(),
    }
}
