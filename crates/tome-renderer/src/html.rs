//! Reference HTML formatter built on pulldown-cmark.

use pulldown_cmark::{CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd, html};

use tome_source::split_front_matter;

use crate::{FormattedDocument, Formatter, TocEntry, slugify};

/// HTML formatter with GFM extensions and slug-anchored headings.
///
/// Front matter is stripped before rendering. Headings at levels 2–4 get
/// an `id` attribute derived from their text and are collected into the
/// table of contents in document order.
#[derive(Debug, Default)]
pub struct HtmlFormatter;

impl HtmlFormatter {
    /// Create a formatter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn parser_options() -> Options {
        Options::ENABLE_TABLES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_GFM
    }
}

impl Formatter for HtmlFormatter {
    fn format(&self, markdown: &str) -> FormattedDocument {
        let (_, body) = split_front_matter(markdown);
        let events: Vec<Event<'_>> = Parser::new_ext(body, Self::parser_options()).collect();

        let mut toc = Vec::new();
        let annotated = annotate_headings(events, &mut toc);

        let mut out = String::with_capacity(body.len() * 2);
        html::push_html(&mut out, annotated.into_iter());

        FormattedDocument { html: out, toc }
    }
}

/// Attach slug ids to h2–h4 headings and collect the TOC.
fn annotate_headings<'a>(events: Vec<Event<'a>>, toc: &mut Vec<TocEntry>) -> Vec<Event<'a>> {
    let mut out = Vec::with_capacity(events.len());
    let mut iter = events.into_iter();

    while let Some(event) = iter.next() {
        let Event::Start(Tag::Heading {
            level,
            id,
            classes,
            attrs,
        }) = event
        else {
            out.push(event);
            continue;
        };

        // Buffer the heading body so its text is known before the tag is
        // emitted with an id.
        let mut body = Vec::new();
        let mut title = String::new();
        for inner in iter.by_ref() {
            if let Event::Text(text) | Event::Code(text) = &inner {
                title.push_str(text);
            }
            let is_end = matches!(inner, Event::End(TagEnd::Heading(_)));
            body.push(inner);
            if is_end {
                break;
            }
        }

        let id = if matches!(level, HeadingLevel::H2 | HeadingLevel::H3 | HeadingLevel::H4) {
            let slug = slugify(&title);
            toc.push(TocEntry {
                level: heading_level_to_num(level),
                title,
                slug: slug.clone(),
            });
            Some(CowStr::from(slug))
        } else {
            id
        };

        out.push(Event::Start(Tag::Heading {
            level,
            id,
            classes,
            attrs,
        }));
        out.extend(body);
    }

    out
}

/// Convert heading level enum to number (1–6).
fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn format(markdown: &str) -> FormattedDocument {
        HtmlFormatter::new().format(markdown)
    }

    #[test]
    fn test_basic_rendering() {
        let doc = format("# Title\n\nA paragraph.");
        assert!(doc.html.contains("<h1>Title</h1>"));
        assert!(doc.html.contains("<p>A paragraph.</p>"));
    }

    #[test]
    fn test_toc_collects_levels_2_to_4() {
        let doc = format("# Title\n\n## Setup\n\n### Details\n\n#### Fine Print\n\n##### Deep\n");
        let entries: Vec<_> = doc
            .toc
            .iter()
            .map(|e| (e.level, e.title.as_str(), e.slug.as_str()))
            .collect();
        assert_eq!(
            entries,
            vec![
                (2, "Setup", "setup"),
                (3, "Details", "details"),
                (4, "Fine Print", "fine-print"),
            ]
        );
    }

    #[test]
    fn test_heading_anchors_injected() {
        let doc = format("## Getting Started\n");
        assert!(doc.html.contains(r#"<h2 id="getting-started">"#));
    }

    #[test]
    fn test_h1_has_no_anchor() {
        let doc = format("# Top Title\n");
        assert!(doc.html.contains("<h1>Top Title</h1>"));
    }

    #[test]
    fn test_front_matter_stripped() {
        let doc = format("---\ntitle: Meta\n---\n# Real Title\n");
        assert!(!doc.html.contains("Meta"));
        assert!(doc.html.contains("<h1>Real Title</h1>"));
    }

    #[test]
    fn test_heading_with_inline_code() {
        let doc = format("## Using `tome.toml`\n");
        assert_eq!(doc.toc[0].title, "Using tome.toml");
        assert_eq!(doc.toc[0].slug, "using-tome-toml");
        assert!(doc.html.contains(r#"<h2 id="using-tome-toml">"#));
        assert!(doc.html.contains("<code>tome.toml</code>"));
    }

    #[test]
    fn test_gfm_table() {
        let doc = format("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(doc.html.contains("<table>"));
    }

    #[test]
    fn test_code_fence() {
        let doc = format("```rust\nfn main() {}\n```\n");
        assert!(doc.html.contains("<pre><code"));
        assert!(doc.html.contains("fn main()"));
    }

    #[test]
    fn test_duplicate_headings_share_slug() {
        let doc = format("## Usage\n\ntext\n\n## Usage\n");
        assert_eq!(doc.toc.len(), 2);
        assert_eq!(doc.toc[0].slug, doc.toc[1].slug);
    }
}
