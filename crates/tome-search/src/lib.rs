//! Free-text search indexing for Tome.
//!
//! [`SearchIndexer`] scans a (version-scoped) document directory into a
//! flat list of [`SearchDocument`]s and answers ranked substring queries
//! against it. Matching is case-insensitive and deliberately permissive:
//! substrings may span word boundaries.
//!
//! Scoring: +100 for a title match, +50 per matching heading, +10 per
//! occurrence in the body text. Zero-score documents are excluded and the
//! result is capped at the top 10, ties keeping scan order.
//!
//! The index is rebuilt wholesale whenever the scanned root is newer than
//! the cached copy; individual documents are never updated independently.

mod extract;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use tome_cache::{CacheKey, DocCache, newest_modification_time};
use tome_source::{canonicalize_path, split_front_matter};

use extract::extract_text;

/// Maximum number of results returned by a query.
pub const MAX_RESULTS: usize = 10;

/// Excerpt length in characters.
const EXCERPT_LENGTH: usize = 200;

/// One indexed document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchDocument {
    /// Canonical logical path.
    pub path: String,
    /// Document title (first H1, empty when absent).
    pub title: String,
    /// Headings at levels 2–4, in document order.
    pub headings: Vec<String>,
    /// Markdown-stripped body text.
    pub plain_text: String,
    /// First 200 characters of the body text.
    pub excerpt: String,
}

/// One ranked search result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    /// Canonical logical path (version-prefixed in cross-version results).
    pub path: String,
    /// Document title.
    pub title: String,
    /// Excerpt with query occurrences wrapped in `<mark>`.
    pub excerpt: String,
    /// Match score.
    pub score: u32,
}

/// Builds and queries the search index for one document root.
pub struct SearchIndexer {
    root: PathBuf,
    version: Option<String>,
    cache: Arc<DocCache>,
}

impl SearchIndexer {
    /// Create an indexer over `root`, cache-scoped to `version`.
    #[must_use]
    pub fn new(root: PathBuf, version: Option<String>, cache: Arc<DocCache>) -> Self {
        Self {
            root,
            version,
            cache,
        }
    }

    /// The indexed documents, rebuilt when the root has newer content.
    #[must_use]
    pub fn documents(&self) -> Vec<SearchDocument> {
        if !self.root.is_dir() {
            return Vec::new();
        }

        let index_key = CacheKey::SearchIndex {
            version: self.version.clone(),
        };
        let stamp_key = CacheKey::SearchIndexBuiltAt {
            version: self.version.clone(),
        };

        if self.cache.is_enabled() {
            let watched = vec![self.root.clone()];
            if let Some(index) = self.cache.get::<Vec<SearchDocument>>(&index_key, &watched)
                && let Some(built_at) = self.cache.get::<f64>(&stamp_key, &[])
                && newest_modification_time(&watched) <= built_at
            {
                return index;
            }

            tracing::debug!(root = %self.root.display(), "rebuilding search index");
            let index = self.scan();
            self.cache.set(&index_key, &index);
            self.cache.set(&stamp_key, &unix_now());
            return index;
        }

        self.scan()
    }

    /// Run a ranked query against the index.
    ///
    /// An empty or whitespace-only query yields no results without
    /// touching the index.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }
        let query_lower = query.to_lowercase();

        let mut hits: Vec<SearchHit> = self
            .documents()
            .into_iter()
            .filter_map(|doc| {
                let score = score_document(&doc, &query_lower);
                (score > 0).then(|| SearchHit {
                    excerpt: highlight(&doc.excerpt, query),
                    path: doc.path,
                    title: doc.title,
                    score,
                })
            })
            .collect();

        // Stable: equal scores keep scan order
        hits.sort_by(|a, b| b.score.cmp(&a.score));
        hits.truncate(MAX_RESULTS);
        hits
    }

    /// Scan the root for markdown files and extract searchable text.
    fn scan(&self) -> Vec<SearchDocument> {
        let mut documents = Vec::new();
        scan_directory(&self.root, "", &mut documents);
        documents
    }
}

/// Recursively collect indexed documents from a directory.
fn scan_directory(dir: &Path, base: &str, documents: &mut Vec<SearchDocument>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    let mut names: Vec<(String, bool)> = entries
        .filter_map(Result::ok)
        .map(|e| {
            let is_dir = e.file_type().is_ok_and(|t| t.is_dir());
            (e.file_name().to_string_lossy().into_owned(), is_dir)
        })
        .filter(|(name, _)| !name.starts_with('.'))
        .collect();
    names.sort();

    for (name, is_dir) in names {
        let full_path = dir.join(&name);
        let relative = if base.is_empty() {
            name.clone()
        } else {
            format!("{base}/{name}")
        };

        if is_dir {
            scan_directory(&full_path, &relative, documents);
        } else if name.ends_with(".md")
            && let Ok(content) = fs::read_to_string(&full_path)
        {
            documents.push(index_document(&relative, &content));
        }
    }
}

/// Build one [`SearchDocument`] from a source file.
fn index_document(relative: &str, content: &str) -> SearchDocument {
    let (_, body) = split_front_matter(content);
    let text = extract_text(body);

    SearchDocument {
        path: canonicalize_path(relative),
        title: text.title.unwrap_or_default(),
        headings: text.headings,
        excerpt: make_excerpt(&text.plain_text),
        plain_text: text.plain_text,
    }
}

/// First 200 characters of the text, with an ellipsis when cut.
fn make_excerpt(text: &str) -> String {
    let text = text.trim();
    if text.chars().count() <= EXCERPT_LENGTH {
        return text.to_owned();
    }
    let mut excerpt: String = text.chars().take(EXCERPT_LENGTH).collect();
    excerpt.push_str("...");
    excerpt
}

/// Score a document against a lowercased query.
///
/// Raw substring matching by design: occurrences spanning word boundaries
/// count, and body occurrences are counted, not capped.
fn score_document(doc: &SearchDocument, query_lower: &str) -> u32 {
    let mut score = 0;

    if doc.title.to_lowercase().contains(query_lower) {
        score += 100;
    }
    for heading in &doc.headings {
        if heading.to_lowercase().contains(query_lower) {
            score += 50;
        }
    }

    let occurrences = count_occurrences(&doc.plain_text.to_lowercase(), query_lower);
    score += 10 * u32::try_from(occurrences).unwrap_or(u32::MAX / 10);

    score
}

/// Non-overlapping occurrence count of `needle` in `haystack`.
fn count_occurrences(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

/// Wrap query occurrences in `<mark>`, case-insensitively, preserving the
/// excerpt's original casing.
fn highlight(excerpt: &str, query: &str) -> String {
    let Ok(pattern) = regex::RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
    else {
        return excerpt.to_owned();
    };
    pattern
        .replace_all(excerpt, "<mark>$0</mark>")
        .into_owned()
}

/// Current wall-clock time as Unix seconds.
fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0.0, |d| d.as_secs_f64())
}
