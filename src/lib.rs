//! inkpost: a server-rendered Markdown blog
//!
//! Posts are read from a directory of Markdown/MDX files on every request,
//! indexed newest first, stripped into a client-side search corpus and
//! served together with per-post view and like counters.

pub mod commands;
pub mod config;
pub mod content;
pub mod counter;
pub mod helpers;
pub mod profile;
pub mod search;
pub mod server;
pub mod templates;
pub mod toc;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::time::Duration;

use content::{ContentError, ContentReader, IndexOptions, PostIndex};
use search::SearchRecord;

/// One read of the content root: the post index and the search corpus
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub index: PostIndex,
    pub corpus: Vec<SearchRecord>,
}

/// The main blog application
#[derive(Debug, Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Directory of post sources
    pub posts_dir: PathBuf,
    /// Static files served as-is
    pub public_dir: PathBuf,
}

impl Blog {
    /// Open a blog directory, loading its config and environment overrides
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        let mut config = config::SiteConfig::discover(base_dir)?;
        config.apply_env();
        Ok(Self::with_config(base_dir, config))
    }

    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let posts_dir = base_dir.join(&config.content.posts_dir);
        let public_dir = base_dir.join(&config.content.public_dir);

        Self {
            config,
            base_dir,
            posts_dir,
            public_dir,
        }
    }

    pub fn reader(&self) -> ContentReader {
        ContentReader::from_config(&self.base_dir, &self.config.content)
    }

    pub fn index_options(&self) -> IndexOptions {
        IndexOptions::from_config(&self.config)
    }

    /// Read the content root once and derive the index and corpus from it
    pub fn snapshot(&self) -> Snapshot {
        let sources = self.reader().read_all();
        let corpus = search::build_corpus(&sources);
        let index = PostIndex::build(sources, self.index_options());
        Snapshot { index, corpus }
    }

    /// `snapshot` on the blocking pool, bounded by `timeout`
    pub async fn snapshot_within(&self, timeout: Duration) -> Result<Snapshot, ContentError> {
        let blog = self.clone();
        let task = tokio::task::spawn_blocking(move || blog.snapshot());
        match tokio::time::timeout(timeout, task).await {
            Ok(joined) => Ok(joined?),
            Err(_) => Err(ContentError::Timeout(timeout)),
        }
    }

    /// Path of the Markdown file rendered at `/about`
    pub fn about_path(&self) -> PathBuf {
        self.base_dir.join(&self.config.content.about_page)
    }

    /// Create a new post
    pub fn new_post(&self, title: &str, tags: &[String]) -> Result<PathBuf> {
        commands::new::run(self, title, tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_snapshot_reads_index_and_corpus_together() {
        let dir = tempfile::tempdir().unwrap();
        let posts = dir.path().join("content/posts");
        fs::create_dir_all(&posts).unwrap();
        fs::write(
            posts.join("a.md"),
            "---\ntitle: A\npublishDate: 2024-01-01\n---\nAlpha **body**",
        )
        .unwrap();
        fs::write(
            posts.join("b.mdx"),
            "---\ntitle: B\npublishDate: 2024-02-01\n---\nBeta",
        )
        .unwrap();

        let blog = Blog::with_config(dir.path(), config::SiteConfig::default());
        let snapshot = blog.snapshot();

        let slugs: Vec<_> = snapshot
            .index
            .list_all()
            .into_iter()
            .map(|p| p.slug)
            .collect();
        assert_eq!(slugs, vec!["b", "a"]);
        assert_eq!(snapshot.corpus.len(), 2);
        assert_eq!(snapshot.corpus[0].slug, "a");
        assert_eq!(snapshot.corpus[0].content, "Alpha body");
    }

    #[tokio::test]
    async fn test_snapshot_within_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::with_config(dir.path(), config::SiteConfig::default());
        let snapshot = blog
            .snapshot_within(Duration::from_secs(5))
            .await
            .unwrap();
        assert!(snapshot.index.is_empty());
        assert!(snapshot.corpus.is_empty());
    }
}
