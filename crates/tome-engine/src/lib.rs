//! Content resolution and orchestration for Tome.
//!
//! [`Engine`] ties the pipeline together: it resolves a raw logical path
//! to a version and a source file, assembles [`PageData`] (content, table
//! of contents, navigation, previous/next links, version list), answers
//! search queries — cross-version when no version is pinned — and serves
//! cached results while their sources are unchanged.
//!
//! Markdown conversion is delegated to a [`Formatter`]; everything else
//! (front matter, titles, permalinks, edit links) is handled here.
//!
//! # Example
//!
//! ```no_run
//! use tome_config::Config;
//! use tome_engine::Engine;
//!
//! let config = Config::load(None)?;
//! let engine = Engine::new(config);
//!
//! match engine.resolve(None, "guide/setup") {
//!     tome_engine::Resolution::Page(page) => println!("{}", page.title),
//!     tome_engine::Resolution::NotFound(_) => println!("404"),
//! }
//! # Ok::<(), tome_config::ConfigError>(())
//! ```

mod locate;
mod page;

use std::path::Path;
use std::sync::Arc;

use tome_cache::{CacheKey, DocCache};
use tome_config::Config;
use tome_nav::{FlatPage, NavNode, NavigationBuilder, flatten_pages};
use tome_renderer::{Formatter, HtmlFormatter};
use tome_search::{MAX_RESULTS, SearchHit, SearchIndexer};
use tome_source::{first_h1, split_front_matter};
use tome_versions::{VersionInfo, VersionRegistry, VersionSettings};

pub use page::{NotFoundPage, PageData, PageLink, Resolution};

use page::CachedPage;

/// Title used when neither front matter nor a heading provides one.
const FALLBACK_TITLE: &str = "Documentation";

/// Longest accepted search query, in characters.
const MAX_QUERY_LENGTH: usize = 200;

/// The documentation engine.
pub struct Engine {
    config: Config,
    cache: Arc<DocCache>,
    versions: VersionRegistry,
    formatter: Box<dyn Formatter>,
}

impl Engine {
    /// Create an engine with the reference HTML formatter.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self::with_formatter(config, Box::new(HtmlFormatter::new()))
    }

    /// Create an engine with a caller-supplied formatter.
    #[must_use]
    pub fn with_formatter(config: Config, formatter: Box<dyn Formatter>) -> Self {
        let cache = Arc::new(DocCache::new(
            config.cache_resolved.dir.clone(),
            config.cache_resolved.enabled,
        ));
        let versions = VersionRegistry::new(
            config.docs_resolved.source_dir.clone(),
            VersionSettings {
                enabled: config.versions.enabled,
                default: config.versions.default.clone(),
            },
            Arc::clone(&cache),
        );
        Self {
            config,
            cache,
            versions,
            formatter,
        }
    }

    /// Resolve a logical path to page data.
    ///
    /// `version` pins the version scope; pass `None` to take the version
    /// from the path's leading segment (or the default). An unknown
    /// version falls back to the default. A path that does not resolve to
    /// a document yields the fixed 404 payload, which still carries live
    /// navigation and version data.
    #[must_use]
    pub fn resolve(&self, version: Option<&str>, logical_path: &str) -> Resolution {
        // 1. Version resolution
        let requested = match version {
            Some(v) => Some(v.to_owned()),
            None => self.versions.extract_version(logical_path),
        };
        let current_version = self.validated_version(requested);

        // 2. Path normalization
        let mut doc_path = self.versions.strip_version(logical_path).trim_matches('/');
        if doc_path.is_empty() {
            doc_path = &self.config.site.default_page;
        }

        // 3. File resolution
        let version_root = self.versions.version_docs_path(current_version.as_deref());
        let Some(source_file) = locate::find_markdown_file(&version_root, doc_path) else {
            return self.not_found(current_version);
        };

        // 4. Cache check: hits still get fresh navigation and versions
        let cache_key = CacheKey::Page {
            version: current_version.clone(),
            path: doc_path.to_owned(),
        };
        let navigation = self.navigation_for(&version_root, current_version.clone());
        if let Some(cached) = self
            .cache
            .get::<CachedPage>(&cache_key, &[source_file.clone()])
        {
            return Resolution::Page(Box::new(cached.into_page_data(
                navigation,
                current_version,
                self.versions.list_versions(),
            )));
        }

        // 5. Assemble from source
        let Ok(raw) = std::fs::read_to_string(&source_file) else {
            tracing::warn!(path = %source_file.display(), "resolved file became unreadable");
            return self.not_found(current_version);
        };

        let page = self.assemble_page(
            doc_path,
            &raw,
            &source_file,
            current_version.as_deref(),
            &navigation,
        );
        self.cache.set(&cache_key, &page);

        Resolution::Page(Box::new(page.into_page_data(
            navigation,
            current_version,
            self.versions.list_versions(),
        )))
    }

    /// Build the cacheable page payload from raw source text.
    fn assemble_page(
        &self,
        doc_path: &str,
        raw: &str,
        source_file: &Path,
        version: Option<&str>,
        navigation: &[NavNode],
    ) -> CachedPage {
        let (front_matter, body) = split_front_matter(raw);

        let title = front_matter
            .as_ref()
            .and_then(|fm| fm.title())
            .map(str::to_owned)
            .or_else(|| first_h1(body).map(str::to_owned))
            .unwrap_or_else(|| FALLBACK_TITLE.to_owned());
        let description = front_matter
            .as_ref()
            .and_then(|fm| fm.description())
            .unwrap_or_default()
            .to_owned();

        let formatted = self.formatter.format(raw);
        let (previous_page, next_page) = neighbors(&flatten_pages(navigation), doc_path);

        CachedPage {
            content: formatted.html,
            title,
            description,
            table_of_contents: formatted.toc,
            canonical_path: doc_path.to_owned(),
            permalink: self.permalink(doc_path, version),
            edit_url: self.edit_url(source_file),
            previous_page,
            next_page,
        }
    }

    /// The fixed 404 payload. Never cached.
    fn not_found(&self, current_version: Option<String>) -> Resolution {
        let version_root = self.versions.version_docs_path(current_version.as_deref());
        Resolution::NotFound(Box::new(NotFoundPage {
            content: "<h1>404 - Page Not Found</h1>\
                      <p>The requested documentation page could not be found.</p>"
                .to_owned(),
            title: "404 - Not Found".to_owned(),
            navigation: self.navigation_for(&version_root, current_version.clone()),
            current_version,
            available_versions: self.versions.list_versions(),
        }))
    }

    /// Ranked search.
    ///
    /// With a version, only that version's index is queried. With `None`
    /// and versioning enabled, every version is searched, result paths are
    /// version-prefixed, and the merged set is re-ranked and capped. The
    /// merged result itself is not memoized; only per-version indexes are.
    #[must_use]
    pub fn search(&self, query: &str, version: Option<&str>) -> Vec<SearchHit> {
        if query.chars().count() > MAX_QUERY_LENGTH {
            return Vec::new();
        }

        if !self.versions.versioning_enabled() {
            return self.indexer_for(None).search(query);
        }

        if let Some(version) = version {
            // An unknown version simply has no documents to match
            return self.indexer_for(Some(version.to_owned())).search(query);
        }

        // Cross-version merge
        let mut merged = Vec::new();
        for info in self.versions.list_versions() {
            let hits = self.indexer_for(Some(info.slug.clone())).search(query);
            merged.extend(hits.into_iter().map(|mut hit| {
                hit.path = format!("{}/{}", info.slug, hit.path);
                hit
            }));
        }
        merged.sort_by(|a, b| b.score.cmp(&a.score));
        merged.truncate(MAX_RESULTS);
        merged
    }

    /// Navigation tree for a version scope (default scope for `None`).
    #[must_use]
    pub fn navigation(&self, version: Option<&str>) -> Vec<NavNode> {
        let version = self.validated_version(version.map(str::to_owned));
        let root = self.versions.version_docs_path(version.as_deref());
        self.navigation_for(&root, version)
    }

    /// All released versions, highest first.
    #[must_use]
    pub fn list_versions(&self) -> Vec<VersionInfo> {
        self.versions.list_versions()
    }

    /// The version registry.
    #[must_use]
    pub fn versions(&self) -> &VersionRegistry {
        &self.versions
    }

    /// Remove all cached entries. Operator maintenance, not request flow.
    pub fn clear_cache(&self) -> bool {
        self.cache.clear()
    }

    /// Validate a requested version, falling back to the default.
    fn validated_version(&self, requested: Option<String>) -> Option<String> {
        if !self.versions.versioning_enabled() {
            return None;
        }
        match requested {
            Some(v) if self.versions.version_exists(&v) => Some(v),
            _ => self.versions.default_version(),
        }
    }

    fn navigation_for(&self, root: &Path, version: Option<String>) -> Vec<NavNode> {
        NavigationBuilder::new(root.to_path_buf(), version, Arc::clone(&self.cache)).build()
    }

    fn indexer_for(&self, version: Option<String>) -> SearchIndexer {
        let root = self.versions.version_docs_path(version.as_deref());
        SearchIndexer::new(root, version, Arc::clone(&self.cache))
    }

    /// Absolute permalink: configured base URL plus the version-prefixed
    /// canonical path.
    fn permalink(&self, doc_path: &str, version: Option<&str>) -> String {
        let base = self.config.site.base_url.trim_end_matches('/');
        let full_path = match version {
            Some(v) => self.versions.add_version(doc_path, v),
            None => doc_path.to_owned(),
        };
        format!("{base}/{full_path}")
    }

    /// Repository edit link for a source file, `#` when unavailable.
    fn edit_url(&self, source_file: &Path) -> String {
        if !self.config.features.edit_link || self.config.site.repo_url.is_empty() {
            return "#".to_owned();
        }

        let source_dir = &self.config.docs_resolved.source_dir;
        let Ok(relative) = source_file.strip_prefix(source_dir) else {
            return "#".to_owned();
        };
        let docs_dir = source_dir
            .file_name()
            .map_or_else(|| "docs".to_owned(), |n| n.to_string_lossy().into_owned());

        format!(
            "{}/blob/main/{docs_dir}/{}",
            self.config.site.repo_url.trim_end_matches('/'),
            relative.display()
        )
    }
}

/// Previous/next links for a page within the flattened navigation.
///
/// No previous link at position 0, no next link at the last position, and
/// neither when the page is not in the navigation at all.
fn neighbors(flat: &[FlatPage], doc_path: &str) -> (Option<PageLink>, Option<PageLink>) {
    let Some(position) = flat.iter().position(|p| p.path == doc_path) else {
        return (None, None);
    };

    let link = |p: &FlatPage| PageLink {
        title: p.title.clone(),
        path: p.path.clone(),
    };

    let previous = (position > 0).then(|| link(&flat[position - 1]));
    let next = flat.get(position + 1).map(link);
    (previous, next)
}
