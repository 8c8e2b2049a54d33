//! Post index - derived metadata, ordering and lookups over one read of the content root

use chrono::{DateTime, FixedOffset, Local};
use chrono_tz::Tz;
use indexmap::IndexMap;

use super::reader::SourceDocument;
use super::{ContentDocument, PostDetail, PostSummary};
use crate::config::SiteConfig;

/// Inputs to metadata derivation
#[derive(Debug, Clone, Copy)]
pub struct IndexOptions {
    /// Zone for dates without an offset; local time when `None`
    pub tz: Option<Tz>,
    pub words_per_minute: u32,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            tz: None,
            words_per_minute: 200,
        }
    }
}

impl IndexOptions {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            tz: config.tz(),
            words_per_minute: config.reading.words_per_minute,
        }
    }
}

/// Posts sorted newest first
///
/// An index is a snapshot of one read of the content root. Posts without a
/// usable date are stamped with the build time, so their position can change
/// between two builds of the same content.
#[derive(Debug, Clone, Default)]
pub struct PostIndex {
    documents: Vec<ContentDocument>,
    words_per_minute: u32,
}

impl PostIndex {
    /// Build an index, using the current time for undated posts
    pub fn build(sources: Vec<SourceDocument>, options: IndexOptions) -> Self {
        let now = match options.tz {
            Some(tz) => Local::now().with_timezone(&tz).fixed_offset(),
            None => Local::now().fixed_offset(),
        };
        Self::build_at(sources, options, now)
    }

    /// Build an index with an explicit fallback time for undated posts
    pub fn build_at(
        sources: Vec<SourceDocument>,
        options: IndexOptions,
        now: DateTime<FixedOffset>,
    ) -> Self {
        let mut documents: Vec<ContentDocument> = sources
            .into_iter()
            .map(|source| into_document(source, options.tz, now))
            .collect();

        // Stable: equal dates keep reader order
        documents.sort_by(|a, b| b.publish_date.cmp(&a.publish_date));

        Self {
            documents,
            words_per_minute: options.words_per_minute,
        }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// All posts, newest first
    pub fn list_all(&self) -> Vec<PostSummary> {
        self.documents.iter().map(|d| self.summarize(d)).collect()
    }

    /// Posts carrying `tag`, compared case-insensitively, newest first
    pub fn list_by_tag(&self, tag: &str) -> Vec<PostSummary> {
        self.documents
            .iter()
            .filter(|d| d.has_tag(tag))
            .map(|d| self.summarize(d))
            .collect()
    }

    /// Exact slug lookup
    pub fn get_by_slug(&self, slug: &str) -> Option<PostDetail> {
        self.documents
            .iter()
            .find(|d| d.slug == slug)
            .map(|d| PostDetail {
                meta: self.summarize(d),
                content: d.raw_body.clone(),
            })
    }

    /// Newer and older neighbours of a post
    pub fn neighbors(&self, slug: &str) -> (Option<PostSummary>, Option<PostSummary>) {
        let Some(pos) = self.documents.iter().position(|d| d.slug == slug) else {
            return (None, None);
        };
        let newer = pos
            .checked_sub(1)
            .and_then(|i| self.documents.get(i))
            .map(|d| self.summarize(d));
        let older = self.documents.get(pos + 1).map(|d| self.summarize(d));
        (newer, older)
    }

    /// Lower-cased tags with their post counts, in order of first appearance
    pub fn tags(&self) -> IndexMap<String, usize> {
        let mut tags = IndexMap::new();
        for doc in &self.documents {
            for tag in &doc.tags {
                *tags.entry(tag.to_lowercase()).or_insert(0) += 1;
            }
        }
        tags
    }

    fn summarize(&self, doc: &ContentDocument) -> PostSummary {
        let read_time = doc
            .explicit_read_time
            .clone()
            .unwrap_or_else(|| estimate_read_time(&doc.raw_body, self.words_per_minute));

        PostSummary {
            slug: doc.slug.clone(),
            title: doc.title.clone(),
            description: doc.description.clone(),
            date: doc.publish_date,
            tags: doc.tags.clone(),
            author: doc.author.clone(),
            read_time,
        }
    }
}

fn into_document(
    source: SourceDocument,
    tz: Option<Tz>,
    now: DateTime<FixedOffset>,
) -> ContentDocument {
    let fm = source.front_matter;
    let resolved = fm.resolve_date(tz);
    if resolved.is_none() {
        tracing::debug!("Post {:?} has no usable date, using build time", source.slug);
    }

    ContentDocument {
        title: fm
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| source.slug.clone()),
        description: fm.description.unwrap_or_default(),
        publish_date: resolved.unwrap_or(now),
        tags: fm.tags,
        author: fm.author,
        explicit_read_time: fm.read_time.filter(|r| !r.trim().is_empty()),
        raw_body: source.body,
        slug: source.slug,
    }
}

/// "N min read" for a body, rounding up with a one-minute floor
pub fn estimate_read_time(body: &str, words_per_minute: u32) -> String {
    let words = count_words(body);
    let wpm = words_per_minute.max(1) as usize;
    let minutes = words.div_ceil(wpm).max(1);
    format!("{} min read", minutes)
}

/// Whitespace-separated words, with each CJK character counted as one word
pub fn count_words(text: &str) -> usize {
    let mut count = 0;
    let mut in_word = false;

    for c in text.chars() {
        if is_cjk(c) {
            count += 1;
            in_word = false;
        } else if c.is_whitespace() {
            in_word = false;
        } else if !in_word {
            count += 1;
            in_word = true;
        }
    }

    count
}

fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}'
        | '\u{3400}'..='\u{4DBF}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{3040}'..='\u{30FF}'
        | '\u{AC00}'..='\u{D7AF}'
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::FrontMatter;
    use chrono::TimeZone;
    use std::path::PathBuf;

    fn source(slug: &str, front_matter: &str, body: &str) -> SourceDocument {
        let content = if front_matter.is_empty() {
            body.to_string()
        } else {
            format!("---\n{}\n---\n{}", front_matter, body)
        };
        let (front_matter, body) = FrontMatter::parse(&content).unwrap();
        SourceDocument {
            slug: slug.to_string(),
            path: PathBuf::from(format!("{}.mdx", slug)),
            front_matter,
            body: body.to_string(),
        }
    }

    fn options() -> IndexOptions {
        IndexOptions {
            tz: Some(chrono_tz::UTC),
            words_per_minute: 200,
        }
    }

    fn build_time() -> DateTime<FixedOffset> {
        chrono::Utc
            .with_ymd_and_hms(2030, 1, 1, 0, 0, 0)
            .unwrap()
            .fixed_offset()
    }

    fn slugs(posts: &[PostSummary]) -> Vec<&str> {
        posts.iter().map(|p| p.slug.as_str()).collect()
    }

    fn two_posts() -> PostIndex {
        PostIndex::build_at(
            vec![
                source("a", "publishDate: 2024-01-01\ntags: [ai]", "alpha"),
                source("b", "publishDate: 2024-06-01\ntags: [ai, go]", "beta"),
            ],
            options(),
            build_time(),
        )
    }

    #[test]
    fn test_list_all_newest_first() {
        let index = two_posts();
        assert_eq!(slugs(&index.list_all()), vec!["b", "a"]);
    }

    #[test]
    fn test_list_by_tag_case_insensitive() {
        let index = two_posts();
        assert_eq!(slugs(&index.list_by_tag("AI")), vec!["b", "a"]);
        assert_eq!(slugs(&index.list_by_tag("Go")), vec!["b"]);
        assert!(index.list_by_tag("rust").is_empty());
    }

    #[test]
    fn test_tag_match_is_exact_not_prefix() {
        let index = two_posts();
        assert!(index.list_by_tag("a").is_empty());
        assert!(index.list_by_tag("g").is_empty());
    }

    #[test]
    fn test_list_by_tag_is_subset_of_list_all() {
        let index = two_posts();
        let all = index.list_all();
        for tag in ["ai", "go", "AI", "missing"] {
            for post in index.list_by_tag(tag) {
                assert!(all.contains(&post));
                assert!(post.tags.iter().any(|t| t.eq_ignore_ascii_case(tag)));
            }
        }
    }

    #[test]
    fn test_equal_dates_keep_reader_order() {
        let index = PostIndex::build_at(
            vec![
                source("first", "date: 2024-03-03", ""),
                source("newest", "date: 2024-05-05", ""),
                source("second", "date: 2024-03-03", ""),
                source("third", "date: 2024-03-03", ""),
            ],
            options(),
            build_time(),
        );
        assert_eq!(
            slugs(&index.list_all()),
            vec!["newest", "first", "second", "third"]
        );
    }

    #[test]
    fn test_get_by_slug() {
        let index = two_posts();
        let post = index.get_by_slug("a").unwrap();
        assert_eq!(post.meta.slug, "a");
        assert_eq!(post.content, "alpha");

        assert!(index.get_by_slug("c").is_none());
        assert!(index.get_by_slug("A").is_none());
        assert!(index.get_by_slug("").is_none());
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let index = PostIndex::build_at(
            vec![source("untitled-post", "author: Ada", "some words here")],
            options(),
            build_time(),
        );
        let post = &index.list_all()[0];
        assert_eq!(post.title, "untitled-post");
        assert_eq!(post.description, "");
        assert!(post.tags.is_empty());
        assert_eq!(post.date, build_time());
        assert_eq!(post.author.as_deref(), Some("Ada"));
        assert_eq!(post.read_time, "1 min read");
    }

    #[test]
    fn test_date_field_used_when_publish_date_missing() {
        let index = PostIndex::build_at(
            vec![source("old", "date: 2020-02-02", "")],
            options(),
            build_time(),
        );
        assert_eq!(index.list_all()[0].date.format("%Y-%m-%d").to_string(), "2020-02-02");
    }

    #[test]
    fn test_explicit_read_time_wins() {
        let body = "word ".repeat(1000);
        let index = PostIndex::build_at(
            vec![
                source("explicit", "readTime: 42 min", &body),
                source("computed", "", &body),
            ],
            options(),
            build_time(),
        );
        assert_eq!(index.get_by_slug("explicit").unwrap().meta.read_time, "42 min");
        assert_eq!(index.get_by_slug("computed").unwrap().meta.read_time, "5 min read");
    }

    #[test]
    fn test_count_words() {
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("one two  three\nfour"), 4);
        assert_eq!(count_words("你好世界"), 4);
        assert_eq!(count_words("Rust 很好"), 3);
    }

    #[test]
    fn test_estimate_read_time_rounds_up() {
        assert_eq!(estimate_read_time("", 200), "1 min read");
        assert_eq!(estimate_read_time(&"w ".repeat(201), 200), "2 min read");
        assert_eq!(estimate_read_time(&"w ".repeat(400), 200), "2 min read");
    }

    #[test]
    fn test_tags_and_neighbors() {
        let index = PostIndex::build_at(
            vec![
                source("a", "date: 2024-01-01\ntags: [AI]", ""),
                source("b", "date: 2024-02-01\ntags: [ai, Go]", ""),
                source("c", "date: 2024-03-01", ""),
            ],
            options(),
            build_time(),
        );

        let tags = index.tags();
        assert_eq!(tags.get("ai"), Some(&2));
        assert_eq!(tags.get("go"), Some(&1));
        assert_eq!(tags.keys().next().map(String::as_str), Some("ai"));

        let (newer, older) = index.neighbors("b");
        assert_eq!(newer.unwrap().slug, "c");
        assert_eq!(older.unwrap().slug, "a");
        assert_eq!(index.neighbors("missing"), (None, None));
    }
}
