//! Post models

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// One source document as read from disk, before any derivation
#[derive(Debug, Clone)]
pub struct ContentDocument {
    /// File stem; unique across the corpus and never empty
    pub slug: String,

    pub title: String,

    pub description: String,

    /// `publishDate`, else `date`, else the time the index was built
    pub publish_date: DateTime<FixedOffset>,

    pub tags: Vec<String>,

    pub author: Option<String>,

    /// `readTime` from front-matter, used verbatim when present
    pub explicit_read_time: Option<String>,

    /// Unparsed Markdown/JSX body
    pub raw_body: String,
}

impl ContentDocument {
    /// Case-insensitive exact tag match
    pub fn has_tag(&self, tag: &str) -> bool {
        let tag = tag.to_lowercase();
        self.tags.iter().any(|t| t.to_lowercase() == tag)
    }
}

/// Render-ready projection of a document, without its body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub date: DateTime<FixedOffset>,
    pub tags: Vec<String>,
    pub author: Option<String>,
    /// Explicit override, or the estimate from the body word count
    #[serde(rename = "readTime")]
    pub read_time: String,
}

impl PostSummary {
    /// URL path of the post page
    pub fn path(&self) -> String {
        format!("/posts/{}", self.slug)
    }
}

/// A post together with its raw body, for the single-post page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostDetail {
    pub meta: PostSummary,
    pub content: String,
}
