//! Navigation tree building for Tome.
//!
//! [`NavigationBuilder`] scans a (version-scoped) document directory into
//! an ordered tree of [`NavNode`]s. Directories become sections, markdown
//! files become pages, and numeric filename prefixes (`2.guides`) drive
//! explicit ordering without leaking into logical paths.
//!
//! The built tree is cached as a whole, watched against the scanned root;
//! a secondary build-timestamp entry guards against clock-resolution edge
//! cases.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use tome_cache::{CacheKey, DocCache, newest_modification_time};
use tome_source::{canonicalize_path, extract_order, first_h1, humanize, split_front_matter};

/// One node of the navigation tree.
///
/// Only sections carry children. `order` is the numeric filename prefix
/// (default 999 when absent); siblings sort ascending by it, stable on
/// ties. `path` is the canonical logical path with ordering prefixes and
/// trailing `index`/`README` segments stripped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NavNode {
    /// A directory with at least one markdown descendant.
    Section {
        /// Display title derived from the directory name.
        title: String,
        /// Canonical logical path.
        path: String,
        /// Sort key from the numeric filename prefix.
        order: u32,
        /// Child nodes, already ordered.
        children: Vec<NavNode>,
    },
    /// A markdown document.
    Page {
        /// Display title (front matter, first H1, or filename-derived).
        title: String,
        /// Canonical logical path.
        path: String,
        /// Sort key from the numeric filename prefix.
        order: u32,
    },
}

impl NavNode {
    /// Display title.
    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::Section { title, .. } | Self::Page { title, .. } => title,
        }
    }

    /// Canonical logical path.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Section { path, .. } | Self::Page { path, .. } => path,
        }
    }

    /// Sort key.
    #[must_use]
    pub fn order(&self) -> u32 {
        match self {
            Self::Section { order, .. } | Self::Page { order, .. } => *order,
        }
    }
}

/// A page reference from a flattened navigation tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatPage {
    /// Display title.
    pub title: String,
    /// Canonical logical path.
    pub path: String,
}

/// Flatten a navigation tree to its pages, pre-order.
///
/// Returns a freshly built sequence; the input is never mutated.
#[must_use]
pub fn flatten_pages(nodes: &[NavNode]) -> Vec<FlatPage> {
    let mut pages = Vec::new();
    for node in nodes {
        match node {
            NavNode::Page { title, path, .. } => pages.push(FlatPage {
                title: title.clone(),
                path: path.clone(),
            }),
            NavNode::Section { children, .. } => pages.extend(flatten_pages(children)),
        }
    }
    pages
}

/// Builds the ordered navigation tree for one document root.
pub struct NavigationBuilder {
    root: PathBuf,
    version: Option<String>,
    cache: Arc<DocCache>,
}

impl NavigationBuilder {
    /// Create a builder over `root`, cache-scoped to `version`.
    #[must_use]
    pub fn new(root: PathBuf, version: Option<String>, cache: Arc<DocCache>) -> Self {
        Self {
            root,
            version,
            cache,
        }
    }

    /// Build the navigation tree, serving a cached tree while fresh.
    ///
    /// A missing root directory yields an empty tree — a normal state for
    /// a version that has not been populated yet.
    #[must_use]
    pub fn build(&self) -> Vec<NavNode> {
        if !self.root.is_dir() {
            return Vec::new();
        }

        let tree_key = CacheKey::Navigation {
            version: self.version.clone(),
        };
        let stamp_key = CacheKey::NavigationBuiltAt {
            version: self.version.clone(),
        };

        if self.cache.is_enabled() {
            let watched = vec![self.root.clone()];
            if let Some(tree) = self.cache.get::<Vec<NavNode>>(&tree_key, &watched)
                && let Some(built_at) = self.cache.get::<f64>(&stamp_key, &[])
                && newest_modification_time(&watched) <= built_at
            {
                return tree;
            }

            tracing::debug!(root = %self.root.display(), "rebuilding navigation tree");
            let tree = scan_directory(&self.root, "");
            self.cache.set(&tree_key, &tree);
            self.cache.set(&stamp_key, &unix_now());
            return tree;
        }

        scan_directory(&self.root, "")
    }
}

/// Recursively scan a directory into ordered navigation nodes.
fn scan_directory(dir: &Path, base: &str) -> Vec<NavNode> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    // Deterministic directory-listing order before the stable order sort
    let mut names: Vec<(String, bool)> = entries
        .filter_map(Result::ok)
        .map(|e| {
            let is_dir = e.file_type().is_ok_and(|t| t.is_dir());
            (e.file_name().to_string_lossy().into_owned(), is_dir)
        })
        .filter(|(name, _)| !name.starts_with('.'))
        .collect();
    names.sort();

    let mut items = Vec::new();
    for (name, is_dir) in names {
        let full_path = dir.join(&name);
        let relative = if base.is_empty() {
            name.clone()
        } else {
            format!("{base}/{name}")
        };

        if is_dir {
            let children = scan_directory(&full_path, &relative);
            if !children.is_empty() {
                items.push(NavNode::Section {
                    title: humanize(&name),
                    path: canonicalize_path(&relative),
                    order: extract_order(&name),
                    children,
                });
            }
        } else if name.ends_with(".md") {
            items.push(NavNode::Page {
                title: page_title(&full_path, &name),
                path: canonicalize_path(&relative),
                order: extract_order(&name),
            });
        }
    }

    items.sort_by_key(NavNode::order);
    items
}

/// Derive a page title: front matter `title`, first H1, or the filename.
fn page_title(path: &Path, file_name: &str) -> String {
    let stem = file_name.strip_suffix(".md").unwrap_or(file_name);

    let Ok(content) = fs::read_to_string(path) else {
        return humanize(stem);
    };

    let (front_matter, body) = split_front_matter(&content);
    if let Some(title) = front_matter.as_ref().and_then(|fm| fm.title()) {
        return title.to_owned();
    }
    if let Some(h1) = first_h1(body) {
        return h1.to_owned();
    }
    humanize(stem)
}

/// Current wall-clock time as Unix seconds.
fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0.0, |d| d.as_secs_f64())
}
