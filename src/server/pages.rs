//! HTML pages

use anyhow::Context as _;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use super::{AppError, AppState};
use crate::content::{ContentError, FrontMatter, PostSummary};
use crate::helpers::{full_url_for, tag_url};
use crate::search::corpus_script_json;
use crate::templates::{self, NavPost, PostCard, TagData};
use crate::toc;
use crate::Snapshot;

/// Posts listed on the home page before linking to the archive
const HOME_POSTS: usize = 10;

impl AppState {
    fn cards(&self, posts: &[PostSummary]) -> Vec<PostCard> {
        posts
            .iter()
            .map(|p| PostCard::new(p, &self.blog.config.date_format))
            .collect()
    }

    fn page(&self, name: &str, context: &tera::Context) -> Result<Response, AppError> {
        Ok(Html(self.templates.render(name, context)?).into_response())
    }

    /// The themed 404 page
    pub(crate) fn not_found(&self, corpus_json: &str, message: &str) -> Response {
        let mut context = templates::base_context(&self.site, corpus_json);
        context.insert("message", message);
        match self.templates.render("not_found.html", &context) {
            Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
            Err(e) => {
                tracing::error!("Failed to render not-found page: {}", e);
                (StatusCode::NOT_FOUND, message.to_string()).into_response()
            }
        }
    }

    async fn render_markdown(&self, body: String) -> Result<String, AppError> {
        let renderer = self.markdown.clone();
        let html = tokio::task::spawn_blocking(move || renderer.render(&body))
            .await
            .map_err(ContentError::from)??;
        Ok(html)
    }
}

fn corpus_json(snapshot: &Snapshot) -> Result<String, AppError> {
    Ok(corpus_script_json(&snapshot.corpus).context("Failed to serialize search corpus")?)
}

/// GET /
pub async fn home(State(state): State<AppState>) -> Result<Response, AppError> {
    let snapshot = state.snapshot().await?;
    let corpus = corpus_json(&snapshot)?;
    let posts = snapshot.index.list_all();
    let has_more = posts.len() > HOME_POSTS;
    let cards = state.cards(&posts[..posts.len().min(HOME_POSTS)]);
    let profile = state.profiles.get().await;

    let context = templates::home_context(
        templates::base_context(&state.site, &corpus),
        &profile,
        &cards,
        has_more,
    );
    state.page("home.html", &context)
}

/// GET /posts
pub async fn posts(State(state): State<AppState>) -> Result<Response, AppError> {
    let snapshot = state.snapshot().await?;
    let corpus = corpus_json(&snapshot)?;
    let cards = state.cards(&snapshot.index.list_all());
    let tags: Vec<TagData> = snapshot
        .index
        .tags()
        .into_iter()
        .map(|(name, count)| TagData {
            url: tag_url(&name),
            name,
            count,
        })
        .collect();

    let mut context = templates::base_context(&state.site, &corpus);
    context.insert("posts", &cards);
    context.insert("tags", &tags);
    state.page("posts.html", &context)
}

/// GET /posts/:slug
pub async fn post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    let snapshot = state.snapshot().await?;
    let corpus = corpus_json(&snapshot)?;

    let Some(detail) = snapshot.index.get_by_slug(&slug) else {
        tracing::debug!("No post {:?}", slug);
        return Ok(state.not_found(&corpus, "This post does not exist."));
    };

    let headings = toc::extract(&detail.content);
    let (newer, older) = snapshot.index.neighbors(&slug);
    let card = PostCard::new(&detail.meta, &state.blog.config.date_format);
    let html = state.render_markdown(detail.content).await?;

    let mut context = templates::post_context(
        templates::base_context(&state.site, &corpus),
        &card,
        &html,
        &headings,
        newer.as_ref().map(NavPost::from),
        older.as_ref().map(NavPost::from),
    );
    context.insert("canonical", &full_url_for(&state.blog.config, &card.url));
    state.page("post.html", &context)
}

/// GET /tags/:tag
pub async fn tag(
    State(state): State<AppState>,
    Path(tag): Path<String>,
) -> Result<Response, AppError> {
    let snapshot = state.snapshot().await?;
    let corpus = corpus_json(&snapshot)?;
    let posts = snapshot.index.list_by_tag(&tag);
    if posts.is_empty() {
        return Ok(state.not_found(&corpus, "No posts carry this tag."));
    }

    let mut context = templates::base_context(&state.site, &corpus);
    context.insert("tag", &tag);
    context.insert("posts", &state.cards(&posts));
    state.page("tag.html", &context)
}

/// GET /about
pub async fn about(State(state): State<AppState>) -> Result<Response, AppError> {
    let snapshot = state.snapshot().await?;
    let corpus = corpus_json(&snapshot)?;
    let path = state.blog.about_path();

    let raw = match tokio::fs::read_to_string(&path).await {
        Ok(raw) => raw,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Failed to read {:?}: {}", path, e);
            }
            return Ok(state.not_found(&corpus, "There is no about page yet."));
        }
    };

    let (front_matter, body) = FrontMatter::parse(&raw)?;
    let title = front_matter.title.unwrap_or_else(|| "About".to_string());
    let html = state.render_markdown(body.to_string()).await?;

    let mut context = templates::base_context(&state.site, &corpus);
    context.insert("title", &title);
    context.insert("content", &html);
    state.page("page.html", &context)
}
