//! Content store reader - enumerates post sources on disk

use anyhow::Result;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::FrontMatter;
use crate::config::ContentConfig;

/// A post file split into front-matter and body, with nothing defaulted yet
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// File stem
    pub slug: String,
    pub path: PathBuf,
    pub front_matter: FrontMatter,
    pub body: String,
}

/// Reads every recognized document directly under a content root
#[derive(Debug, Clone)]
pub struct ContentReader {
    root: PathBuf,
    extensions: Vec<String>,
}

impl ContentReader {
    pub fn new<P: Into<PathBuf>>(root: P, extensions: &[String]) -> Self {
        Self {
            root: root.into(),
            extensions: extensions.to_vec(),
        }
    }

    /// Reader for `<base_dir>/<posts_dir>` with the configured extensions
    pub fn from_config(base_dir: &Path, config: &ContentConfig) -> Self {
        Self::new(base_dir.join(&config.posts_dir), &config.extensions)
    }

    /// Read all documents, in file-name order
    ///
    /// A missing root is an empty blog, not an error. Unreadable files are
    /// skipped with a warning, and a stem seen twice keeps its first file.
    pub fn read_all(&self) -> Vec<SourceDocument> {
        if !self.root.is_dir() {
            tracing::debug!("Content root {:?} does not exist", self.root);
            return Vec::new();
        }

        let mut seen = HashSet::new();
        let mut documents = Vec::new();

        for entry in WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || !self.is_recognized(path) {
                continue;
            }

            let Some(slug) = slug_of(path) else {
                tracing::warn!("Skipping {:?}: empty file name", path);
                continue;
            };

            if !seen.insert(slug.clone()) {
                tracing::warn!("Skipping {:?}: slug {:?} is already taken", path, slug);
                continue;
            }

            match read_document(path, slug) {
                Ok(doc) => documents.push(doc),
                Err(e) => tracing::warn!("Failed to read post {:?}: {}", path, e),
            }
        }

        tracing::debug!("Read {} documents from {:?}", documents.len(), self.root);
        documents
    }

    fn is_recognized(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.iter().any(|known| known.eq_ignore_ascii_case(e)))
            .unwrap_or(false)
    }
}

fn slug_of(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.starts_with('.'))
        .map(str::to_string)
}

fn read_document(path: &Path, slug: String) -> Result<SourceDocument> {
    let content = fs::read_to_string(path)?;
    let (front_matter, body) = FrontMatter::parse(&content)?;
    Ok(SourceDocument {
        slug,
        path: path.to_path_buf(),
        body: body.to_string(),
        front_matter,
    })
}
