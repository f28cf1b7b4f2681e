//! Assembled page data and resolution outcomes.

use serde::{Deserialize, Serialize};

use tome_nav::NavNode;
use tome_renderer::TocEntry;
use tome_versions::VersionInfo;

/// A previous/next link between adjacent pages.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLink {
    /// Display title.
    pub title: String,
    /// Canonical logical path.
    pub path: String,
}

/// Everything needed to present one resolved page.
#[derive(Clone, Debug, Serialize)]
pub struct PageData {
    /// Rendered page body.
    pub content: String,
    /// Page title.
    pub title: String,
    /// Page description (front matter, empty when absent).
    pub description: String,
    /// Table of contents from headings at levels 2–4.
    pub table_of_contents: Vec<TocEntry>,
    /// Canonical logical path within the version scope.
    pub canonical_path: String,
    /// Absolute permalink for the page.
    pub permalink: String,
    /// Navigation tree for the page's version scope.
    pub navigation: Vec<NavNode>,
    /// Repository edit link, or `#` when disabled.
    pub edit_url: String,
    /// Link to the preceding page in navigation order.
    pub previous_page: Option<PageLink>,
    /// Link to the following page in navigation order.
    pub next_page: Option<PageLink>,
    /// Version the page was resolved in, if versioning is enabled.
    pub current_version: Option<String>,
    /// All released versions, highest first.
    pub available_versions: Vec<VersionInfo>,
}

/// The fixed payload for unresolvable paths.
///
/// Carries live navigation and version data so the surrounding chrome can
/// still render; never cached.
#[derive(Clone, Debug, Serialize)]
pub struct NotFoundPage {
    /// Fixed 404 body.
    pub content: String,
    /// Fixed 404 title.
    pub title: String,
    /// Navigation tree for the requested version scope.
    pub navigation: Vec<NavNode>,
    /// Version the request resolved to, if versioning is enabled.
    pub current_version: Option<String>,
    /// All released versions, highest first.
    pub available_versions: Vec<VersionInfo>,
}

/// Outcome of resolving a logical path.
#[derive(Clone, Debug)]
pub enum Resolution {
    /// The path resolved to a document.
    Page(Box<PageData>),
    /// The path did not resolve; recovered into a 404 payload.
    NotFound(Box<NotFoundPage>),
}

impl Resolution {
    /// The resolved page, if any.
    #[must_use]
    pub fn page(&self) -> Option<&PageData> {
        match self {
            Self::Page(page) => Some(page),
            Self::NotFound(_) => None,
        }
    }

    /// True for the 404 outcome.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// The cacheable subset of [`PageData`].
///
/// Navigation and version data are deliberately excluded: they have their
/// own caches and are merged in fresh on every hit.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CachedPage {
    pub content: String,
    pub title: String,
    pub description: String,
    pub table_of_contents: Vec<TocEntry>,
    pub canonical_path: String,
    pub permalink: String,
    pub edit_url: String,
    pub previous_page: Option<PageLink>,
    pub next_page: Option<PageLink>,
}

impl CachedPage {
    /// Combine the cached payload with freshly built navigation and
    /// version data.
    pub fn into_page_data(
        self,
        navigation: Vec<NavNode>,
        current_version: Option<String>,
        available_versions: Vec<VersionInfo>,
    ) -> PageData {
        PageData {
            content: self.content,
            title: self.title,
            description: self.description,
            table_of_contents: self.table_of_contents,
            canonical_path: self.canonical_path,
            permalink: self.permalink,
            navigation,
            edit_url: self.edit_url,
            previous_page: self.previous_page,
            next_page: self.next_page,
            current_version,
            available_versions,
        }
    }
}
