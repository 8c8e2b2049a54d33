//! Built-in theme templates using Tera template engine
//!
//! Templates, client scripts and the stylesheet are embedded directly in
//! the binary.

use anyhow::Result;
use chrono::Datelike;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::PostSummary;
use crate::helpers::{date_xml, format_date, tag_url};
use crate::profile::Profile;
use crate::toc::HeadingEntry;

/// Client script for the search palette
pub const SEARCH_JS: &str = include_str!("assets/search.js");
/// Client script for view/like counters
pub const POST_STATS_JS: &str = include_str!("assets/post-stats.js");
pub const STYLE_CSS: &str = include_str!("assets/style.css");

/// Template renderer with the embedded theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all theme templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("theme/layout.html")),
            ("home.html", include_str!("theme/home.html")),
            ("posts.html", include_str!("theme/posts.html")),
            ("tag.html", include_str!("theme/tag.html")),
            ("post.html", include_str!("theme/post.html")),
            ("page.html", include_str!("theme/page.html")),
            ("not_found.html", include_str!("theme/not_found.html")),
            // Partials
            (
                "partials/header.html",
                include_str!("theme/partials/header.html"),
            ),
            (
                "partials/footer.html",
                include_str!("theme/partials/footer.html"),
            ),
            (
                "partials/search.html",
                include_str!("theme/partials/search.html"),
            ),
            (
                "partials/post_list.html",
                include_str!("theme/partials/post_list.html"),
            ),
            ("partials/tags.html", include_str!("theme/partials/tags.html")),
        ])?;

        tera.register_filter("truncate_chars", truncate_chars_filter);
        tera.register_filter("tag_url", tag_url_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => "...".to_string(),
    };

    if s.chars().count() <= length {
        Ok(tera::Value::String(s))
    } else {
        let truncated: String = s.chars().take(length).collect();
        Ok(tera::Value::String(format!(
            "{}{}",
            truncated.trim_end(),
            omission
        )))
    }
}

/// Tera filter: link to a tag page
fn tag_url_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let tag = tera::try_get_value!("tag_url", "value", String, value);
    Ok(tera::Value::String(tag_url(&tag)))
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub author: String,
    pub url: String,
    pub language: String,
    pub year: i32,
    pub featured_tags: Vec<String>,
}

impl SiteData {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            url: config.url.clone(),
            language: config.language.clone(),
            year: chrono::Local::now().year(),
            featured_tags: config.featured_tags.clone(),
        }
    }
}

/// A post as listed on index pages
#[derive(Debug, Clone, Serialize)]
pub struct PostCard {
    pub slug: String,
    pub title: String,
    pub description: String,
    /// Display date in the site's `date_format`
    pub date: String,
    pub datetime: String,
    pub tags: Vec<String>,
    pub read_time: String,
    pub author: Option<String>,
    pub url: String,
}

impl PostCard {
    pub fn new(summary: &PostSummary, date_format: &str) -> Self {
        Self {
            slug: summary.slug.clone(),
            title: summary.title.clone(),
            description: summary.description.clone(),
            date: format_date(&summary.date, date_format),
            datetime: date_xml(&summary.date),
            tags: summary.tags.clone(),
            read_time: summary.read_time.clone(),
            author: summary.author.clone(),
            url: summary.path(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NavPost {
    pub title: String,
    pub url: String,
}

impl From<&PostSummary> for NavPost {
    fn from(summary: &PostSummary) -> Self {
        Self {
            title: summary.title.clone(),
            url: summary.path(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TagData {
    pub name: String,
    pub url: String,
    pub count: usize,
}

/// Context shared by every page: site data and the inline search corpus
pub fn base_context(site: &SiteData, corpus_json: &str) -> Context {
    let mut context = Context::new();
    context.insert("site", site);
    context.insert("corpus_json", corpus_json);
    context
}

pub fn home_context(
    mut context: Context,
    profile: &Profile,
    posts: &[PostCard],
    has_more: bool,
) -> Context {
    context.insert("profile", profile);
    context.insert("profile_name", profile.display_name());
    context.insert("posts", posts);
    context.insert("has_more", &has_more);
    context
}

pub fn post_context(
    mut context: Context,
    post: &PostCard,
    content_html: &str,
    toc: &[HeadingEntry],
    newer: Option<NavPost>,
    older: Option<NavPost>,
) -> Context {
    context.insert("post", post);
    context.insert("content", content_html);
    context.insert("toc", toc);
    context.insert("newer", &newer);
    context.insert("older", &older);
    context
}
