//! Version discovery and path rewriting for Tome.
//!
//! A versioned document root holds one directory per released snapshot
//! (`v1.0`, `2.3`, `v3.0-beta`, ...). [`VersionRegistry`] discovers those
//! partitions, reads optional per-version metadata, resolves the
//! default/latest version, and rewrites logical paths to add or remove a
//! leading version segment.
//!
//! The discovered list is cached under a single key that watches the
//! document root, so creating or removing a version directory invalidates
//! it on the next lookup.

mod ordering;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use tome_cache::{CacheKey, DocCache};

pub use ordering::compare_version_numbers;

/// Pattern for version directory names: optional leading `v`, dot-separated
/// numeric groups, optional `-tag` suffix.
static VERSION_DIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^v?\d+(\.\d+)*(-[a-z0-9]+)?$").unwrap());

/// Release status of a version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VersionStatus {
    /// A stable release (the default).
    Stable,
    /// A pre-release, tagged with an arbitrary label (`beta`, `rc1`, ...).
    PreRelease(String),
}

impl From<String> for VersionStatus {
    fn from(s: String) -> Self {
        if s == "stable" {
            Self::Stable
        } else {
            Self::PreRelease(s)
        }
    }
}

impl From<VersionStatus> for String {
    fn from(status: VersionStatus) -> Self {
        match status {
            VersionStatus::Stable => "stable".to_owned(),
            VersionStatus::PreRelease(tag) => tag,
        }
    }
}

/// One discovered documentation version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    /// Directory name under the document root; unique per registry.
    pub slug: String,
    /// Comparable version number (dotted numeric, optional `-tag`).
    pub number: String,
    /// Display name.
    pub label: String,
    /// Release status.
    pub status: VersionStatus,
    /// Release date, if the metadata file provides one.
    pub released_at: Option<String>,
}

/// Optional per-version metadata file (`version.json`).
#[derive(Debug, Deserialize)]
struct VersionFile {
    number: Option<String>,
    label: Option<String>,
    status: Option<String>,
    #[serde(rename = "released")]
    released_at: Option<String>,
}

/// Versioning settings, supplied by the host configuration.
#[derive(Clone, Debug, Default)]
pub struct VersionSettings {
    /// Whether the document root is partitioned into version directories.
    pub enabled: bool,
    /// Explicit default version slug; highest discovered version if unset.
    pub default: Option<String>,
}

/// Discovers and orders version partitions of a document root.
pub struct VersionRegistry {
    docs_root: PathBuf,
    settings: VersionSettings,
    cache: Arc<DocCache>,
}

impl VersionRegistry {
    /// Create a registry over `docs_root`.
    #[must_use]
    pub fn new(docs_root: PathBuf, settings: VersionSettings, cache: Arc<DocCache>) -> Self {
        Self {
            docs_root,
            settings,
            cache,
        }
    }

    /// Whether versioning is enabled.
    #[must_use]
    pub fn versioning_enabled(&self) -> bool {
        self.settings.enabled
    }

    /// All available versions, highest number first.
    ///
    /// Returns an empty list when versioning is disabled. The list is
    /// cached, watching the document root for additions and removals.
    #[must_use]
    pub fn list_versions(&self) -> Vec<VersionInfo> {
        if !self.settings.enabled {
            return Vec::new();
        }

        let watched = vec![self.docs_root.clone()];
        if let Some(cached) = self.cache.get::<Vec<VersionInfo>>(&CacheKey::VersionList, &watched) {
            return cached;
        }

        let versions = self.scan_versions();
        self.cache.set(&CacheKey::VersionList, &versions);
        versions
    }

    /// Scan the document root for version directories.
    fn scan_versions(&self) -> Vec<VersionInfo> {
        let Ok(entries) = fs::read_dir(&self.docs_root) else {
            return Vec::new();
        };

        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_ok_and(|t| t.is_dir()))
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|name| is_version_dir(name))
            .collect();
        names.sort();

        let mut versions: Vec<VersionInfo> = names
            .into_iter()
            .map(|name| {
                let dir = self.docs_root.join(&name);
                version_info(&name, &dir)
            })
            .collect();

        versions.sort_by(|a, b| compare_version_numbers(&b.number, &a.number));
        versions
    }

    /// The default version: explicit setting if present, else the highest
    /// discovered version, else `None`.
    #[must_use]
    pub fn default_version(&self) -> Option<String> {
        if !self.settings.enabled {
            return None;
        }
        if let Some(default) = &self.settings.default {
            return Some(default.clone());
        }
        self.latest_version()
    }

    /// The highest discovered version, if any.
    #[must_use]
    pub fn latest_version(&self) -> Option<String> {
        self.list_versions().first().map(|v| v.slug.clone())
    }

    /// Look up a version by its slug.
    #[must_use]
    pub fn version_by_slug(&self, slug: &str) -> Option<VersionInfo> {
        self.list_versions().into_iter().find(|v| v.slug == slug)
    }

    /// Whether a version with this slug exists.
    #[must_use]
    pub fn version_exists(&self, slug: &str) -> bool {
        self.version_by_slug(slug).is_some()
    }

    /// Extract the version from a logical path's leading segment.
    ///
    /// Returns the segment when it syntactically matches the version
    /// pattern, otherwise the default version.
    #[must_use]
    pub fn extract_version(&self, path: &str) -> Option<String> {
        if !self.settings.enabled {
            return self.default_version();
        }
        match leading_version_segment(path) {
            Some(segment) => Some(segment.to_owned()),
            None => self.default_version(),
        }
    }

    /// The document directory for a version scope.
    ///
    /// The bare root when versioning is disabled or no slug is given.
    #[must_use]
    pub fn version_docs_path(&self, slug: Option<&str>) -> PathBuf {
        match slug {
            Some(slug) if self.settings.enabled => self.docs_root.join(slug),
            _ => self.docs_root.clone(),
        }
    }

    /// Remove a leading version segment from a logical path.
    ///
    /// A no-op when versioning is disabled or the path has no version
    /// segment.
    #[must_use]
    pub fn strip_version<'a>(&self, path: &'a str) -> &'a str {
        if !self.settings.enabled {
            return path;
        }
        let trimmed = path.trim_matches('/');
        match leading_version_segment(trimmed) {
            Some(segment) => trimmed[segment.len()..].trim_start_matches('/'),
            None => path,
        }
    }

    /// Prefix a logical path with a version segment.
    ///
    /// Any existing version segment is removed first, so the operation is
    /// idempotent. A no-op when versioning is disabled.
    #[must_use]
    pub fn add_version(&self, path: &str, slug: &str) -> String {
        if !self.settings.enabled {
            return path.to_owned();
        }
        let clean = self.strip_version(path);
        if clean.is_empty() {
            slug.to_owned()
        } else {
            format!("{slug}/{clean}")
        }
    }

    /// Display badge for a version: `Latest` and/or its capitalized
    /// pre-release status, or an empty string.
    #[must_use]
    pub fn version_badge(&self, slug: &str) -> String {
        let Some(info) = self.version_by_slug(slug) else {
            return String::new();
        };

        let mut badges = Vec::new();
        if self.latest_version().as_deref() == Some(slug) {
            badges.push("Latest".to_owned());
        }
        if let VersionStatus::PreRelease(tag) = &info.status {
            let mut chars = tag.chars();
            if let Some(first) = chars.next() {
                badges.push(first.to_uppercase().chain(chars).collect());
            }
        }

        if badges.is_empty() {
            String::new()
        } else {
            format!(" ({})", badges.join(", "))
        }
    }
}

/// Whether a directory name matches the version pattern.
#[must_use]
pub fn is_version_dir(name: &str) -> bool {
    VERSION_DIR.is_match(name)
}

/// The leading path segment, if it matches the version pattern.
fn leading_version_segment(path: &str) -> Option<&str> {
    let trimmed = path.trim_matches('/');
    let first = trimmed.split('/').next()?;
    (!first.is_empty() && is_version_dir(first)).then_some(first)
}

/// Build [`VersionInfo`] for a directory, preferring its metadata file.
///
/// A missing or unparsable `version.json` degrades to defaults derived
/// from the directory name (number with the `v` prefix stripped, label
/// equal to the name, stable status).
fn version_info(dir_name: &str, dir: &Path) -> VersionInfo {
    let defaults = || VersionInfo {
        slug: dir_name.to_owned(),
        number: dir_name.strip_prefix('v').unwrap_or(dir_name).to_owned(),
        label: dir_name.to_owned(),
        status: VersionStatus::Stable,
        released_at: None,
    };

    let meta_path = dir.join("version.json");
    let Ok(content) = fs::read_to_string(&meta_path) else {
        return defaults();
    };

    match serde_json::from_str::<VersionFile>(&content) {
        Ok(meta) => VersionInfo {
            slug: dir_name.to_owned(),
            number: meta.number.unwrap_or_else(|| dir_name.to_owned()),
            label: meta.label.unwrap_or_else(|| dir_name.to_owned()),
            status: meta
                .status
                .map_or(VersionStatus::Stable, VersionStatus::from),
            released_at: meta.released_at,
        },
        Err(e) => {
            tracing::warn!(path = %meta_path.display(), error = %e, "malformed version metadata, using directory defaults");
            defaults()
        }
    }
}
