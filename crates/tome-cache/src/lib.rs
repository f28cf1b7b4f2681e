//! Modification-time-validated cache store for Tome.
//!
//! [`DocCache`] memoizes expensive computations (directory scans, search
//! indexes, assembled pages) on disk, one file per [`CacheKey`]. Entries
//! are invalidated lazily: a `get` that names watched source paths returns
//! a miss when any of them was modified after the entry was written. Stale
//! entries are never evicted, only ignored and eventually overwritten.
//!
//! Persistence failures are never fatal — reads degrade to a miss and
//! writes report failure, so callers always fall back to recomputation.
//!
//! # Example
//!
//! ```no_run
//! use std::path::PathBuf;
//! use tome_cache::{CacheKey, DocCache};
//!
//! let cache = DocCache::new(PathBuf::from(".tome/cache"), true);
//! let key = CacheKey::VersionList;
//! cache.set(&key, &vec!["v1.0".to_owned()]);
//! let versions: Option<Vec<String>> = cache.get(&key, &[]);
//! ```

mod key;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use serde::de::DeserializeOwned;

pub use key::CacheKey;

/// On-disk entry envelope: write timestamp plus the serialized payload.
#[derive(serde::Serialize, serde::Deserialize)]
struct Envelope<T> {
    written_at: f64,
    payload: T,
}

/// File-backed cache store with source-file staleness checks.
pub struct DocCache {
    dir: PathBuf,
    enabled: bool,
}

impl DocCache {
    /// Create a cache store rooted at `dir`.
    ///
    /// The directory is created lazily on first write, not here.
    #[must_use]
    pub fn new(dir: PathBuf, enabled: bool) -> Self {
        Self { dir, enabled }
    }

    /// Whether caching is enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Retrieve a cached value if present and still fresh.
    ///
    /// Returns `None` when the store is disabled, no entry exists, the
    /// entry cannot be decoded, or any path in `watched` (files, or
    /// directories walked recursively) was modified strictly after the
    /// entry was written.
    #[must_use]
    pub fn get<T: DeserializeOwned>(&self, key: &CacheKey, watched: &[PathBuf]) -> Option<T> {
        if !self.enabled {
            return None;
        }

        let path = self.dir.join(key.file_name());
        let bytes = fs::read(&path).ok()?;
        let envelope: Envelope<T> = serde_json::from_slice(&bytes).ok()?;

        if !watched.is_empty() && newest_modification_time(watched) > envelope.written_at {
            tracing::debug!(key = ?key, "cache entry stale, ignoring");
            return None;
        }

        Some(envelope.payload)
    }

    /// Store a value, overwriting any existing entry for the key.
    ///
    /// The write goes to a temporary sibling file and is renamed into
    /// place, so a concurrent reader never observes a partial entry.
    /// Returns `false` (after logging) on any persistence error.
    pub fn set<T: Serialize>(&self, key: &CacheKey, value: &T) -> bool {
        if !self.enabled {
            return false;
        }
        if let Err(e) = fs::create_dir_all(&self.dir) {
            tracing::warn!(error = %e, "failed to create cache directory");
            return false;
        }

        let envelope = Envelope {
            written_at: unix_now(),
            payload: value,
        };
        let Ok(bytes) = serde_json::to_vec(&envelope) else {
            return false;
        };

        let file_name = key.file_name();
        let tmp = self.dir.join(format!("{file_name}.tmp"));
        let path = self.dir.join(file_name);

        if let Err(e) = fs::write(&tmp, &bytes) {
            tracing::warn!(error = %e, "failed to write cache entry");
            return false;
        }
        if let Err(e) = fs::rename(&tmp, &path) {
            tracing::warn!(error = %e, "failed to publish cache entry");
            let _ = fs::remove_file(&tmp);
            return false;
        }
        true
    }

    /// Delete one entry. Returns `true` if the entry is gone afterwards.
    pub fn delete(&self, key: &CacheKey) -> bool {
        if !self.enabled {
            return false;
        }
        let path = self.dir.join(key.file_name());
        if path.exists() {
            fs::remove_file(&path).is_ok()
        } else {
            true
        }
    }

    /// Remove all persisted entries.
    ///
    /// Operator-triggered maintenance; request handling never calls this.
    /// Returns `false` if the store is disabled or the directory is absent.
    pub fn clear(&self) -> bool {
        if !self.enabled || !self.dir.is_dir() {
            return false;
        }
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return false;
        };
        for entry in entries.filter_map(Result::ok) {
            let path = entry.path();
            if path.extension().is_some_and(|e| e == "cache") {
                let _ = fs::remove_file(&path);
            }
        }
        true
    }
}

/// Most recent modification time among the given paths, as Unix seconds.
///
/// Files contribute their own mtime. Directories are walked recursively
/// and contribute their own mtime plus that of everything below them, so
/// creating or removing a child entry is observed through the parent.
/// Missing paths contribute nothing; an empty or all-missing set yields 0.
#[must_use]
pub fn newest_modification_time(paths: &[PathBuf]) -> f64 {
    let mut newest: f64 = 0.0;
    for path in paths {
        let t = if path.is_dir() {
            directory_modification_time(path)
        } else {
            mtime(path)
        };
        newest = newest.max(t);
    }
    newest
}

/// Recursive most-recent mtime within a directory, including the
/// directory's own mtime.
fn directory_modification_time(dir: &Path) -> f64 {
    let mut newest = mtime(dir);
    let Ok(entries) = fs::read_dir(dir) else {
        return newest;
    };
    for entry in entries.filter_map(Result::ok) {
        let path = entry.path();
        let t = if path.is_dir() {
            directory_modification_time(&path)
        } else {
            mtime(&path)
        };
        newest = newest.max(t);
    }
    newest
}

/// A path's mtime as Unix seconds, or 0 when unreadable.
fn mtime(path: &Path) -> f64 {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map_or(0.0, |d| d.as_secs_f64())
}

/// Current wall-clock time as Unix seconds.
fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0.0, |d| d.as_secs_f64())
}
