//! Front matter parsing.
//!
//! Front matter is a metadata block at the very top of a document source,
//! delimited by `---` lines and containing `key: value` pairs:
//!
//! ```text
//! ---
//! title: Introduction
//! description: First steps
//! ---
//! # Introduction
//! ```
//!
//! Parsing is deliberately line-oriented: no nesting, no lists. Lines
//! without a colon are ignored. An unterminated block is treated as body
//! text, not metadata.

/// Parsed front matter fields, in document order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrontMatter {
    fields: Vec<(String, String)>,
}

impl FrontMatter {
    /// Look up a field value by key.
    ///
    /// Returns the first occurrence if a key is repeated.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The `title` field, if present and non-empty.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.get("title").filter(|t| !t.is_empty())
    }

    /// The `description` field, if present.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.get("description")
    }

    /// True if no fields were parsed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Split a document into front matter and body.
///
/// Returns `(None, text)` when the document has no front matter block.
/// The body slice starts after the closing delimiter line.
#[must_use]
pub fn split_front_matter(text: &str) -> (Option<FrontMatter>, &str) {
    let Some(rest) = strip_delimiter_line(text) else {
        return (None, text);
    };

    let mut fields = Vec::new();
    let mut offset = text.len() - rest.len();
    let mut block = rest;

    loop {
        if let Some(body) = strip_delimiter_line(block) {
            return (Some(FrontMatter { fields }), body);
        }
        let Some(line_end) = block.find('\n') else {
            // Unterminated block: not front matter at all
            return (None, text);
        };
        let line = &block[..line_end];
        if let Some((key, value)) = line.split_once(':') {
            fields.push((key.trim().to_owned(), value.trim().to_owned()));
        }
        offset += line_end + 1;
        block = &text[offset..];
    }
}

/// Strip a leading `---` delimiter line (trailing whitespace allowed),
/// returning the text after its newline.
fn strip_delimiter_line(text: &str) -> Option<&str> {
    let rest = text.strip_prefix("---")?;
    let line_end = rest.find('\n')?;
    if rest[..line_end].trim().is_empty() {
        Some(&rest[line_end + 1..])
    } else {
        None
    }
}
