//! Markdown formatter seam for Tome.
//!
//! Content resolution does not convert markdown itself — it consumes a
//! [`Formatter`]: `format(text) -> {html, toc}`. This crate defines that
//! seam ([`Formatter`], [`FormattedDocument`], [`TocEntry`], [`slugify`])
//! and ships [`HtmlFormatter`], a pulldown-cmark implementation that
//! injects stable slug anchors on h2–h4 headings and collects the table
//! of contents.

mod html;

pub use html::HtmlFormatter;

use serde::{Deserialize, Serialize};

/// One table-of-contents entry, derived from a heading at levels 2–4.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Heading level (2–4).
    pub level: u8,
    /// Heading text.
    pub title: String,
    /// Anchor slug, stable across renders.
    pub slug: String,
}

/// Result of formatting a markdown document.
#[derive(Clone, Debug, Default)]
pub struct FormattedDocument {
    /// Rendered HTML with slug-anchored headings.
    pub html: String,
    /// Table of contents in document order.
    pub toc: Vec<TocEntry>,
}

/// Markdown-to-HTML conversion seam.
///
/// Implementations receive the full document source (front matter
/// included) and return rendered HTML plus the heading list.
pub trait Formatter: Send + Sync {
    /// Format a markdown document.
    fn format(&self, markdown: &str) -> FormattedDocument;
}

/// Derive an anchor slug from heading text.
///
/// Lowercases, collapses runs of non-alphanumeric characters to single
/// hyphens, and trims leading/trailing hyphens. An empty result becomes
/// the fixed placeholder `n-a`.
///
/// ```
/// use tome_renderer::slugify;
///
/// assert_eq!(slugify("Getting Started"), "getting-started");
/// assert_eq!(slugify("What's new in 2.0?"), "what-s-new-in-2-0");
/// assert_eq!(slugify("!!!"), "n-a");
/// ```
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    if slug.is_empty() {
        "n-a".to_owned()
    } else {
        slug
    }
}
