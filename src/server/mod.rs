//! HTTP server: pages, counter and search APIs, static files

mod api;
mod error;
mod pages;

pub use error::{AppError, COUNTER_WRITE_FAILED};

use anyhow::Result;
use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::content::{ContentError, MarkdownRenderer};
use crate::counter::CounterService;
use crate::profile::ProfileService;
use crate::search::corpus_script_json;
use crate::templates::{self, SiteData, TemplateRenderer};
use crate::{Blog, Snapshot};

/// Shared, read-only request state
#[derive(Clone)]
pub struct AppState {
    pub blog: Arc<Blog>,
    pub site: Arc<SiteData>,
    pub counters: CounterService,
    pub profiles: ProfileService,
    pub templates: Arc<TemplateRenderer>,
    pub markdown: Arc<MarkdownRenderer>,
}

impl AppState {
    pub fn new(blog: Blog) -> Result<Self> {
        let counters = CounterService::from_config(&blog.config.counter);
        Self::with_counters(blog, counters)
    }

    pub fn with_counters(blog: Blog, counters: CounterService) -> Result<Self> {
        Ok(Self {
            site: Arc::new(SiteData::from_config(&blog.config)),
            profiles: ProfileService::new(blog.config.github.clone())?,
            templates: Arc::new(TemplateRenderer::new()?),
            markdown: Arc::new(MarkdownRenderer::new()),
            counters,
            blog: Arc::new(blog),
        })
    }

    /// Fresh read of the content root, bounded by `content.read_timeout_ms`
    pub async fn snapshot(&self) -> Result<Snapshot, ContentError> {
        let timeout = self.blog.config.content.read_timeout();
        self.blog.snapshot_within(timeout).await.map_err(|e| {
            tracing::error!("Failed to read content from {:?}: {}", self.blog.posts_dir, e);
            e
        })
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::home))
        .route("/posts", get(pages::posts))
        .route("/posts/:slug", get(pages::post))
        .route("/tags/:tag", get(pages::tag))
        .route("/about", get(pages::about))
        .route(
            "/api/posts/:slug",
            get(api::get_stats).post(api::increment),
        )
        .route("/api/search", get(api::search))
        .route("/assets/search.js", get(search_js))
        .route("/assets/post-stats.js", get(post_stats_js))
        .route("/assets/style.css", get(style_css))
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(blog: Blog, ip: &str, port: u16, open: bool) -> Result<()> {
    tracing::info!("Serving posts from {:?}", blog.posts_dir);
    let state = AppState::new(blog)?;
    if state.counters.is_degraded() {
        tracing::warn!("No counter store configured; views and likes are not persisted");
    }
    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

async fn search_js() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/javascript; charset=utf-8")],
        templates::SEARCH_JS,
    )
}

async fn post_stats_js() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/javascript; charset=utf-8")],
        templates::POST_STATS_JS,
    )
}

async fn style_css() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        templates::STYLE_CSS,
    )
}

/// Serve files from the public directory, or the themed 404 page
async fn fallback_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let mut service =
        ServeDir::new(&state.blog.public_dir).append_index_html_on_directories(true);
    match service.try_call(request).await {
        Ok(response) if response.status() != StatusCode::NOT_FOUND => response.into_response(),
        Ok(_) => {
            let corpus = state
                .snapshot()
                .await
                .ok()
                .and_then(|snapshot| corpus_script_json(&snapshot.corpus).ok())
                .unwrap_or_else(|| "[]".to_string());
            state.not_found(&corpus, "The page you are looking for does not exist.")
        }
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
    }
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}
