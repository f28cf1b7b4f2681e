//! Document source utilities for Tome.
//!
//! Small pure helpers shared by every component that scans or parses
//! markdown sources:
//!
//! - [`FrontMatter`]: delimited `key: value` metadata block parsing
//! - [`first_h1`]: title extraction from the first level-1 heading
//! - [`extract_order`] / [`strip_order_prefix`]: numeric ordering prefixes
//! - [`humanize`]: filename-derived display labels
//! - [`canonicalize_path`]: logical document paths from relative file paths

mod front_matter;

pub use front_matter::{FrontMatter, split_front_matter};

/// Sort order assigned to entries without a numeric prefix.
///
/// Prefixed entries sort before unprefixed ones within a directory level.
pub const DEFAULT_ORDER: u32 = 999;

/// Extract the numeric ordering prefix from a file or directory name.
///
/// A prefix is one or more leading digits followed by a dot
/// (e.g. `2.guides` -> 2). Names without a prefix get [`DEFAULT_ORDER`].
///
/// # Examples
///
/// ```
/// use tome_source::{DEFAULT_ORDER, extract_order};
///
/// assert_eq!(extract_order("1.introduction.md"), 1);
/// assert_eq!(extract_order("guides"), DEFAULT_ORDER);
/// ```
#[must_use]
pub fn extract_order(name: &str) -> u32 {
    match order_prefix_len(name) {
        Some(len) => name[..len].parse().unwrap_or(DEFAULT_ORDER),
        None => DEFAULT_ORDER,
    }
}

/// Strip the numeric ordering prefix from a name, if present.
///
/// ```
/// use tome_source::strip_order_prefix;
///
/// assert_eq!(strip_order_prefix("2.guides"), "guides");
/// assert_eq!(strip_order_prefix("guides"), "guides");
/// ```
#[must_use]
pub fn strip_order_prefix(name: &str) -> &str {
    match order_prefix_len(name) {
        Some(len) => &name[len + 1..],
        None => name,
    }
}

/// Length of the digit run in a `<digits>.` prefix, or `None`.
fn order_prefix_len(name: &str) -> Option<usize> {
    let digits = name.bytes().take_while(u8::is_ascii_digit).count();
    if digits > 0 && name.as_bytes().get(digits) == Some(&b'.') {
        Some(digits)
    } else {
        None
    }
}

/// Derive a human-readable label from a file or directory name.
///
/// Strips the ordering prefix, replaces `-`/`_` with spaces, and
/// capitalizes the first letter of each word.
///
/// ```
/// use tome_source::humanize;
///
/// assert_eq!(humanize("1.getting-started"), "Getting Started");
/// assert_eq!(humanize("api_reference"), "Api Reference");
/// ```
#[must_use]
pub fn humanize(name: &str) -> String {
    let name = strip_order_prefix(name);
    let mut out = String::with_capacity(name.len());
    let mut at_word_start = true;
    for ch in name.chars() {
        if ch == '-' || ch == '_' || ch == ' ' {
            out.push(' ');
            at_word_start = true;
        } else if at_word_start {
            out.extend(ch.to_uppercase());
            at_word_start = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Extract the first level-1 heading from markdown text.
///
/// Matches lines of the form `# Title` (exactly one `#`).
#[must_use]
pub fn first_h1(text: &str) -> Option<&str> {
    for line in text.lines() {
        if let Some(rest) = line.strip_prefix('#')
            && rest.starts_with(char::is_whitespace)
        {
            return Some(rest.trim());
        }
    }
    None
}

/// Convert a relative source path to its canonical logical path.
///
/// Strips the `.md` extension, removes the numeric ordering prefix from
/// every segment, and collapses a trailing `index`/`README` segment to
/// nothing. Segments are `/`-separated. Idempotent: canonicalizing an
/// already-canonical path returns it unchanged.
///
/// # Examples
///
/// ```
/// use tome_source::canonicalize_path;
///
/// assert_eq!(canonicalize_path("2.guide/1.setup.md"), "guide/setup");
/// assert_eq!(canonicalize_path("guide/index.md"), "guide");
/// assert_eq!(canonicalize_path("README.md"), "");
/// ```
#[must_use]
pub fn canonicalize_path(relative: &str) -> String {
    let without_ext = relative.strip_suffix(".md").unwrap_or(relative);

    let mut segments: Vec<&str> = without_ext
        .split('/')
        .filter(|s| !s.is_empty())
        .map(strip_order_prefix)
        .collect();

    if matches!(segments.last(), Some(&"index" | &"README")) {
        segments.pop();
    }

    segments.join("/")
}
