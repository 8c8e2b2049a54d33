//! Search corpus for the client-side palette

mod strip;

pub use strip::strip_markdown;

use serde::{Deserialize, Serialize};

use crate::content::SourceDocument;
use crate::helpers::encode_uri_component;

/// Characters of body text considered when matching, as the palette does
pub const MATCH_WINDOW: usize = 5000;
/// Characters of context kept before a match in a snippet
const SNIPPET_BEFORE: usize = 20;
/// Characters of context kept after a match in a snippet
const SNIPPET_AFTER: usize = 60;

/// One post as the search palette sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRecord {
    pub slug: String,
    pub title: String,
    pub tags: Vec<String>,
    /// Body with all Markdown syntax stripped
    pub content: String,
}

/// Build one record per document, keeping the reader's order
pub fn build_corpus(sources: &[SourceDocument]) -> Vec<SearchRecord> {
    sources
        .iter()
        .map(|doc| SearchRecord {
            slug: doc.slug.clone(),
            title: doc
                .front_matter
                .title
                .clone()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| doc.slug.clone()),
            tags: doc.front_matter.tags.clone(),
            content: strip_markdown(&doc.body),
        })
        .collect()
}

/// Corpus as JSON that is safe to inline inside a `<script>` element
pub fn corpus_script_json(corpus: &[SearchRecord]) -> serde_json::Result<String> {
    Ok(serde_json::to_string(corpus)?.replace("</", "<\\/"))
}

/// Context around the first body match
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snippet {
    pub before: String,
    pub matched: String,
    pub after: String,
    pub truncated_start: bool,
    pub truncated_end: bool,
}

impl Snippet {
    /// Plain rendering with ellipses where text was cut
    pub fn to_plain(&self) -> String {
        format!(
            "{}{}{}{}{}",
            if self.truncated_start { "..." } else { "" },
            self.before,
            self.matched,
            self.after,
            if self.truncated_end { "..." } else { "" }
        )
    }
}

/// A record matching a query
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub slug: String,
    pub title: String,
    pub tags: Vec<String>,
    pub snippet: Option<Snippet>,
    /// Post URL, with a text fragment for queries longer than one character
    pub url: String,
}

/// Case-insensitive match of every query term against title, tags and the
/// start of the body
///
/// Title hits come first, then tag hits, then body-only hits; order within
/// each group follows the corpus.
pub fn search(corpus: &[SearchRecord], query: &str) -> Vec<SearchHit> {
    let query = query.trim();
    let terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
    if terms.is_empty() {
        return Vec::new();
    }

    let mut ranked: Vec<(u8, SearchHit)> = corpus
        .iter()
        .filter_map(|record| {
            let title = record.title.to_lowercase();
            let tags = record.tags.join(" ").to_lowercase();
            let body: String = record.content.chars().take(MATCH_WINDOW).collect();
            let haystack = format!("{} {} {}", title, tags, body.to_lowercase());

            if !terms.iter().all(|t| haystack.contains(t.as_str())) {
                return None;
            }

            let rank = if terms.iter().any(|t| title.contains(t.as_str())) {
                0
            } else if terms.iter().any(|t| tags.contains(t.as_str())) {
                1
            } else {
                2
            };

            Some((
                rank,
                SearchHit {
                    slug: record.slug.clone(),
                    title: record.title.clone(),
                    tags: record.tags.clone(),
                    snippet: snippet(&record.content, query),
                    url: post_url(&record.slug, query),
                },
            ))
        })
        .collect();

    ranked.sort_by_key(|(rank, _)| *rank);
    ranked.into_iter().map(|(_, hit)| hit).collect()
}

/// Where selecting a hit navigates to
pub fn post_url(slug: &str, query: &str) -> String {
    let query = query.trim();
    if query.chars().count() > 1 {
        format!("/posts/{}#:~:text={}", slug, encode_uri_component(query))
    } else {
        format!("/posts/{}", slug)
    }
}

/// Text around the first case-insensitive occurrence of `query` in `content`
pub fn snippet(content: &str, query: &str) -> Option<Snippet> {
    let chars: Vec<char> = content.chars().collect();
    let needle: Vec<char> = query.chars().map(fold).collect();
    if needle.is_empty() || needle.len() > chars.len() {
        return None;
    }

    let index = chars
        .windows(needle.len())
        .position(|window| window.iter().zip(&needle).all(|(c, n)| fold(*c) == *n))?;

    let start = index.saturating_sub(SNIPPET_BEFORE);
    let match_end = index + needle.len();
    let end = (match_end + SNIPPET_AFTER).min(chars.len());

    Some(Snippet {
        before: chars[start..index].iter().collect(),
        matched: chars[index..match_end].iter().collect(),
        after: chars[match_end..end].iter().collect(),
        truncated_start: start > 0,
        truncated_end: end < chars.len(),
    })
}

fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}
