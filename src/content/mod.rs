//! Content module - reads posts, derives their metadata and renders them

mod document;
mod frontmatter;
pub mod index;
pub mod markdown;
pub mod reader;

pub use document::{ContentDocument, PostDetail, PostSummary};
pub use frontmatter::{parse_date_string, FrontMatter};
pub use index::{IndexOptions, PostIndex};
pub use markdown::MarkdownRenderer;
pub use reader::{ContentReader, SourceDocument};

use std::time::Duration;
use thiserror::Error;

/// Failures of a bounded content read
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("reading content took longer than {0:?}")]
    Timeout(Duration),
    #[error("content reader task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
