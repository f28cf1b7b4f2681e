//! Searchable text extraction from markdown sources.
//!
//! One pulldown-cmark pass yields everything the index needs: the title
//! (first H1), headings at levels 2–4 in document order, and a plain-text
//! rendering. Code blocks and inline code spans are dropped, link text is
//! kept, image alt text is discarded, and heading/emphasis markers vanish
//! by construction.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};

/// Text extracted from one markdown document.
#[derive(Debug, Default)]
pub(crate) struct ExtractedText {
    /// First level-1 heading, if any.
    pub title: Option<String>,
    /// Headings at levels 2–4, in document order.
    pub headings: Vec<String>,
    /// Markdown-stripped body text.
    pub plain_text: String,
}

/// Extract searchable text from a markdown body (front matter already
/// removed).
pub(crate) fn extract_text(body: &str) -> ExtractedText {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_GFM;
    let parser = Parser::new_ext(body, options);

    let mut out = ExtractedText::default();
    let mut heading: Option<(HeadingLevel, String)> = None;
    let mut in_code_block = false;
    let mut image_depth = 0usize;

    for event in parser {
        match event {
            Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
            Event::End(TagEnd::CodeBlock) => in_code_block = false,
            Event::Start(Tag::Image { .. }) => image_depth += 1,
            Event::End(TagEnd::Image) => image_depth = image_depth.saturating_sub(1),
            Event::Start(Tag::Heading { level, .. }) => heading = Some((level, String::new())),
            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, text)) = heading.take() {
                    let text = text.trim().to_owned();
                    match level {
                        HeadingLevel::H1 => {
                            if out.title.is_none() && !text.is_empty() {
                                out.title = Some(text.clone());
                            }
                        }
                        HeadingLevel::H2 | HeadingLevel::H3 | HeadingLevel::H4 => {
                            out.headings.push(text.clone());
                        }
                        _ => {}
                    }
                    // Heading text stays in the plain text, markers gone
                    out.plain_text.push_str(&text);
                    out.plain_text.push('\n');
                }
            }
            Event::Text(text) => {
                if in_code_block || image_depth > 0 {
                    continue;
                }
                match &mut heading {
                    Some((_, buf)) => buf.push_str(&text),
                    None => out.plain_text.push_str(&text),
                }
            }
            Event::Code(_) => {
                // Inline code spans are dropped entirely
            }
            Event::SoftBreak | Event::HardBreak => {
                if heading.is_none() && !in_code_block && image_depth == 0 {
                    out.plain_text.push(' ');
                }
            }
            Event::End(TagEnd::Paragraph | TagEnd::Item) => out.plain_text.push('\n'),
            _ => {}
        }
    }

    out.plain_text = out.plain_text.trim().to_owned();
    out
}
