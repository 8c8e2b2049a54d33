//! Search posts from the command line

use anyhow::Result;

use crate::search::{build_corpus, search, SearchHit};
use crate::Blog;

pub fn run(blog: &Blog, query: &str) -> Result<()> {
    let corpus = build_corpus(&blog.reader().read_all());
    let hits = search(&corpus, query);
    print!("{}", format_hits(&hits));
    Ok(())
}

pub fn format_hits(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return "No results found.\n".to_string();
    }
    let mut out = format!("Results ({}):\n", hits.len());
    for hit in hits {
        out.push_str(&format!("  {} - {}\n", hit.title, hit.url));
        if let Some(snippet) = &hit.snippet {
            out.push_str(&format!("      {}\n", snippet.to_plain()));
        }
    }
    out
}
