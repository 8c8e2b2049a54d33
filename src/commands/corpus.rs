//! Export the search corpus

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::search::build_corpus;
use crate::Blog;

/// Print the corpus as JSON, or write it to `output`
pub fn run(blog: &Blog, output: Option<&Path>) -> Result<()> {
    let corpus = build_corpus(&blog.reader().read_all());
    let json = serde_json::to_string_pretty(&corpus)?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))?;
            println!("Wrote {} records to {:?}", corpus.len(), path);
        }
        None => println!("{}", json),
    }

    Ok(())
}
