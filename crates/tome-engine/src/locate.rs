//! Logical-path-to-file resolution.
//!
//! A logical path (`guide/setup`) is matched against the filesystem one
//! component at a time: a directory entry matches when its name, minus any
//! numeric ordering prefix and (for files) the `.md` extension, equals the
//! component. A final directory falls back to its `index.md`/`README.md`
//! child, matched prefix-insensitively.

use std::fs;
use std::path::{Path, PathBuf};

use tome_source::strip_order_prefix;

/// Resolve a normalized logical path to a markdown source file.
///
/// Returns `None` when any component fails to match, or when the path
/// lands on a directory without an index file.
pub(crate) fn find_markdown_file(root: &Path, logical_path: &str) -> Option<PathBuf> {
    let mut current = root.to_path_buf();

    for part in logical_path.split('/').filter(|p| !p.is_empty()) {
        let name = sorted_entries(&current)?
            .into_iter()
            .find(|name| matches_component(name, part))?;
        current.push(name);
    }

    if current.is_dir() {
        return find_index_file(&current);
    }
    current.is_file().then_some(current)
}

/// Whether a directory entry name matches a logical path component.
fn matches_component(name: &str, part: &str) -> bool {
    let clean = strip_order_prefix(name);
    let clean = clean.strip_suffix(".md").unwrap_or(clean);
    clean == part
}

/// Find an `index.md` or `README.md` child, ordering prefix allowed.
fn find_index_file(dir: &Path) -> Option<PathBuf> {
    let names = sorted_entries(dir)?;
    for index_name in ["index.md", "README.md"] {
        if let Some(name) = names
            .iter()
            .find(|name| strip_order_prefix(name) == index_name)
        {
            return Some(dir.join(name));
        }
    }
    None
}

/// Directory entry names in deterministic (lexicographic) order.
fn sorted_entries(dir: &Path) -> Option<Vec<String>> {
    let entries = fs::read_dir(dir).ok()?;
    let mut names: Vec<String> = entries
        .filter_map(Result::ok)
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    Some(names)
}
