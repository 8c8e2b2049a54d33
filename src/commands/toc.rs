//! Print a post's table of contents

use anyhow::Result;

use crate::toc::{extract, HeadingEntry, MIN_DEPTH};
use crate::Blog;

pub fn run(blog: &Blog, slug: &str) -> Result<()> {
    let index = blog.snapshot().index;
    let Some(post) = index.get_by_slug(slug) else {
        anyhow::bail!("No post with slug {:?}", slug);
    };
    print!("{}", format_toc(&extract(&post.content)));
    Ok(())
}

/// One line per heading, indented by depth
pub fn format_toc(entries: &[HeadingEntry]) -> String {
    entries
        .iter()
        .map(|entry| {
            let indent = "  ".repeat((entry.depth - MIN_DEPTH) as usize);
            format!("{}- {} ({})\n", indent, entry.title, entry.url())
        })
        .collect()
}
