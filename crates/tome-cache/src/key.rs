//! Typed cache keys.
//!
//! Each cache domain gets its own [`CacheKey`] variant so that keys from
//! different domains can never collide through string concatenation. The
//! canonical string form is hashed (SHA-256) to produce the on-disk file
//! name, so key content never leaks into the filesystem namespace.

use sha2::{Digest, Sha256};

/// A typed key identifying one cache entry.
///
/// The `version` on scoped variants is the version slug the entry belongs
/// to, or `None` when versioning is disabled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheKey {
    /// Assembled page data, keyed by version and canonical path.
    Page {
        /// Version slug, if versioning is enabled.
        version: Option<String>,
        /// Canonical logical path of the page.
        path: String,
    },
    /// Navigation tree for one version scope.
    Navigation {
        /// Version slug, if versioning is enabled.
        version: Option<String>,
    },
    /// Build timestamp companion to [`CacheKey::Navigation`].
    NavigationBuiltAt {
        /// Version slug, if versioning is enabled.
        version: Option<String>,
    },
    /// Search index for one version scope.
    SearchIndex {
        /// Version slug, if versioning is enabled.
        version: Option<String>,
    },
    /// Build timestamp companion to [`CacheKey::SearchIndex`].
    SearchIndexBuiltAt {
        /// Version slug, if versioning is enabled.
        version: Option<String>,
    },
    /// The discovered version list (one per document root).
    VersionList,
}

impl CacheKey {
    /// Canonical string form: `domain:version:path`.
    fn canonical(&self) -> String {
        fn v(version: Option<&String>) -> &str {
            version.map_or("", String::as_str)
        }

        match self {
            Self::Page { version, path } => {
                format!("page:{}:{path}", v(version.as_ref()))
            }
            Self::Navigation { version } => format!("nav:{}", v(version.as_ref())),
            Self::NavigationBuiltAt { version } => {
                format!("nav-built-at:{}", v(version.as_ref()))
            }
            Self::SearchIndex { version } => format!("search:{}", v(version.as_ref())),
            Self::SearchIndexBuiltAt { version } => {
                format!("search-built-at:{}", v(version.as_ref()))
            }
            Self::VersionList => "version-list".to_owned(),
        }
    }

    /// On-disk file name: SHA-256 of the canonical form, hex-encoded,
    /// with a `.cache` suffix.
    #[must_use]
    pub fn file_name(&self) -> String {
        let digest = Sha256::digest(self.canonical().as_bytes());
        format!("{}.cache", hex::encode(digest))
    }
}
