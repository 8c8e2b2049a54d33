//! List site content

use anyhow::Result;

use crate::content::PostIndex;
use crate::Blog;

/// List site content by type
pub fn run(blog: &Blog, content_type: &str) -> Result<()> {
    let index = blog.snapshot().index;

    let output = match content_type {
        "post" | "posts" => format_posts(&index, &blog.config.date_format),
        "tag" | "tags" => format_tags(&index),
        _ => {
            anyhow::bail!("Unknown type: {}. Available: post, tag", content_type);
        }
    };
    print!("{}", output);

    Ok(())
}

/// Posts newest first, one per line
pub fn format_posts(index: &PostIndex, date_format: &str) -> String {
    let posts = index.list_all();
    let mut out = format!("Posts ({}):\n", posts.len());
    for post in posts {
        out.push_str(&format!(
            "  {} - {} [{}] ({})\n",
            post.date.format(date_format),
            post.title,
            post.slug,
            post.read_time
        ));
    }
    out
}

/// Tags by descending post count, ties in first-seen order
pub fn format_tags(index: &PostIndex) -> String {
    let mut tags: Vec<_> = index.tags().into_iter().collect();
    tags.sort_by(|a, b| b.1.cmp(&a.1));

    let mut out = format!("Tags ({}):\n", tags.len());
    for (tag, count) in tags {
        out.push_str(&format!("  {} ({})\n", tag, count));
    }
    out
}
