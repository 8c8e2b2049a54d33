//! Create a new post

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use crate::Blog;

/// Write `<posts_dir>/<slug>.mdx` with a front-matter header for `title`
pub fn create_post(blog: &Blog, title: &str, tags: &[String]) -> Result<PathBuf> {
    let slug = slug::slugify(title);
    if slug.is_empty() {
        anyhow::bail!("Cannot derive a file name from title {:?}", title);
    }

    fs::create_dir_all(&blog.posts_dir)?;

    let extension = blog
        .config
        .content
        .extensions
        .first()
        .map(String::as_str)
        .unwrap_or("mdx");
    let file_path = blog.posts_dir.join(format!("{}.{}", slug, extension));

    // Check if file already exists
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let now = chrono::Local::now();
    let mut content = String::from("---\n");
    content.push_str(&format!("title: {}\n", yaml_string(title)));
    content.push_str("description: \"\"\n");
    content.push_str(&format!("publishDate: {}\n", now.format("%Y-%m-%d")));
    if tags.is_empty() {
        content.push_str("tags: []\n");
    } else {
        content.push_str("tags:\n");
        for tag in tags {
            content.push_str(&format!("  - {}\n", yaml_string(tag)));
        }
    }
    content.push_str("---\n\n");

    fs::write(&file_path, content)?;
    tracing::debug!("Wrote {:?}", file_path);

    Ok(file_path)
}

/// Double-quoted YAML scalar
fn yaml_string(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Run the new command
pub fn run(blog: &Blog, title: &str, tags: &[String]) -> Result<PathBuf> {
    let path = create_post(blog, title, tags)?;
    println!("Created: {:?}", path);
    Ok(path)
}
