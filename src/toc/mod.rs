//! Table of contents extraction
//!
//! Headings are found with the same parser and the same slugger the HTML
//! renderer uses, so every TOC link points at an id that exists on the page.

mod slugger;

pub use slugger::{slugify, HeadingSlugger};

use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use serde::Serialize;

use crate::content::markdown::parser_options;

/// Shallowest heading level shown in navigation
pub const MIN_DEPTH: u8 = 2;
/// Deepest heading level shown in navigation
pub const MAX_DEPTH: u8 = 3;

/// One navigation entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadingEntry {
    pub depth: u8,
    pub title: String,
    pub anchor: String,
}

impl HeadingEntry {
    /// In-page link target, `#anchor`
    pub fn url(&self) -> String {
        format!("#{}", self.anchor)
    }
}

/// A heading of any level with its final anchor
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ScannedHeading {
    pub level: u8,
    pub text: String,
    pub anchor: String,
}

/// Every heading in document order, each with its anchor
///
/// An explicit `{#id}` attribute is used as-is and reserved, so no later
/// slug repeats it; all other headings go through one shared slugger.
pub(crate) fn scan_headings(markdown: &str) -> Vec<ScannedHeading> {
    let mut slugger = HeadingSlugger::new();
    let mut headings = Vec::new();
    let mut current: Option<(u8, Option<String>, String)> = None;

    for event in Parser::new_ext(markdown, parser_options()) {
        match event {
            Event::Start(Tag::Heading { level, id, .. }) => {
                current = Some((level as u8, id.map(|id| id.to_string()), String::new()));
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, id, text)) = current.take() {
                    let text = text.trim().to_string();
                    let anchor = match id {
                        Some(id) => {
                            slugger.reserve(&id);
                            id
                        }
                        None => slugger.slug(&text),
                    };
                    headings.push(ScannedHeading {
                        level,
                        text,
                        anchor,
                    });
                }
            }
            Event::Text(text) | Event::Code(text) | Event::InlineMath(text) => {
                if let Some((_, _, buf)) = current.as_mut() {
                    buf.push_str(&text);
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                if let Some((_, _, buf)) = current.as_mut() {
                    buf.push(' ');
                }
            }
            _ => {}
        }
    }

    headings
}

/// Level 2 and 3 headings of a Markdown body, in document order
pub fn extract(raw_body: &str) -> Vec<HeadingEntry> {
    scan_headings(raw_body)
        .into_iter()
        .filter(|h| (MIN_DEPTH..=MAX_DEPTH).contains(&h.level))
        .map(|h| HeadingEntry {
            depth: h.level,
            title: h.text,
            anchor: h.anchor,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn depths(entries: &[HeadingEntry]) -> Vec<u8> {
        entries.iter().map(|e| e.depth).collect()
    }

    #[test]
    fn test_duplicate_section_gets_distinct_anchor() {
        let body = "# Title\n\n## Section One\n\ntext\n\n### Sub\n\n## Section One";
        let toc = extract(body);

        assert_eq!(toc.len(), 3);
        assert_eq!(toc[0].title, "Section One");
        assert_eq!(toc[0].depth, 2);
        assert_eq!(toc[1].title, "Sub");
        assert_eq!(toc[1].depth, 3);
        assert_eq!(toc[2].title, "Section One");
        assert_eq!(toc[2].depth, 2);
        assert_ne!(toc[0].anchor, toc[2].anchor);
        assert_eq!(toc[0].url(), "#section-one");
        assert_eq!(toc[2].url(), "#section-one-1");
    }

    #[test]
    fn test_only_depth_two_and_three() {
        let body = "# h1\n\n## h2\n\n### h3\n\n#### h4\n\n##### h5\n\n###### h6\n\n## again";
        let toc = extract(body);
        assert_eq!(depths(&toc), vec![2, 3, 2]);
        assert_eq!(toc[2].title, "again");
    }

    #[test]
    fn test_hidden_levels_still_consume_slugs() {
        // The renderer ids every heading, so an h1 "Setup" takes the bare slug
        let toc = extract("# Setup\n\n## Setup");
        assert_eq!(toc[0].anchor, "setup-1");
    }

    #[test]
    fn test_explicit_id_is_not_reused() {
        let toc = extract("## Intro {#setup}\n\n## Setup");
        assert_eq!(toc[0].anchor, "setup");
        assert_eq!(toc[1].anchor, "setup-1");
    }

    #[test]
    fn test_heading_on_first_line_is_found() {
        let toc = extract("## First\nbody");
        assert_eq!(toc.len(), 1);
        assert_eq!(toc[0].title, "First");
    }

    #[test]
    fn test_hashes_in_code_blocks_are_not_headings() {
        let body = "```sh\n## not a heading\n```\n\n## Real";
        let toc = extract(body);
        assert_eq!(toc.len(), 1);
        assert_eq!(toc[0].title, "Real");
    }

    #[test]
    fn test_inline_markup_in_heading_text() {
        let toc = extract("## Using `cargo` with **care**");
        assert_eq!(toc[0].title, "Using cargo with care");
        assert_eq!(toc[0].anchor, "using-cargo-with-care");
    }

    #[test]
    fn test_explicit_id_attribute() {
        let toc = extract("## Long heading text {#short}");
        assert_eq!(toc[0].anchor, "short");
        assert_eq!(toc[0].title, "Long heading text");
    }

    #[test]
    fn test_marker_without_space_is_not_heading() {
        assert!(extract("##nospace").is_empty());
    }
}
