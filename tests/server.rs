use std::fs;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use inkpost::config::SiteConfig;
use inkpost::counter::{CounterError, CounterService, CounterStore, MemoryStore};
use inkpost::server::{router, AppState};
use inkpost::Blog;

fn site() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let posts = tmp.path().join("content/posts");
    fs::create_dir_all(&posts).unwrap();
    fs::create_dir_all(tmp.path().join("public")).unwrap();

    fs::write(
        posts.join("older.md"),
        "---\ntitle: Older Post\npublishDate: 2024-01-01\ntags: [Rust]\n---\nFirst words about ownership.",
    )
    .unwrap();
    fs::write(
        posts.join("newer.mdx"),
        "---\ntitle: Newer Post\ndate: 2024-06-01\ntags: [rust, web]\ndescription: Fresh\n---\n# Top\n\n## Section One\n\ntext\n\n### Sub\n\n## Section One\n",
    )
    .unwrap();
    fs::write(
        tmp.path().join("content/about.mdx"),
        "---\ntitle: About Me\n---\nHello **there**.",
    )
    .unwrap();
    fs::write(tmp.path().join("public/robots.txt"), "User-agent: *\n").unwrap();
    tmp
}

fn app_with(tmp: &TempDir, counters: CounterService) -> Router {
    let blog = Blog::with_config(tmp.path(), SiteConfig::default());
    router(AppState::with_counters(blog, counters).unwrap())
}

fn app(tmp: &TempDir) -> Router {
    app_with(
        tmp,
        CounterService::backed(Arc::new(MemoryStore::new()), Duration::from_secs(1)),
    )
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, String) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .unwrap();
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let req = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, text) = send(app, req).await;
    (status, serde_json::from_str(&text).unwrap())
}

struct DownStore;

#[async_trait]
impl CounterStore for DownStore {
    async fn get_many(&self, _keys: &[String]) -> Result<Vec<Option<u64>>, CounterError> {
        Err(CounterError::Protocol("connection refused".to_string()))
    }

    async fn incr(&self, _key: &str) -> Result<u64, CounterError> {
        Err(CounterError::Protocol("connection refused".to_string()))
    }
}

#[tokio::test]
async fn home_lists_newest_first_and_embeds_corpus() {
    let tmp = site();
    let (status, html) = get(&app(&tmp), "/").await;
    assert_eq!(status, StatusCode::OK);

    let newer = html.find("Newer Post").unwrap();
    let older = html.find("Older Post").unwrap();
    assert!(newer < older);
    assert!(html.contains(r#"<script id="search-corpus" type="application/json">"#));
    assert!(html.contains("First words about ownership."));
}

#[tokio::test]
async fn post_page_has_toc_matching_heading_ids() {
    let tmp = site();
    let (status, html) = get(&app(&tmp), "/posts/newer").await;
    assert_eq!(status, StatusCode::OK);

    assert!(html.contains(r#"id="section-one""#));
    assert!(html.contains(r#"id="section-one-1""#));
    assert!(html.contains(r##"href="#section-one-1""##));
    assert!(html.contains("toc-depth-3"));
    assert!(html.contains(r#"data-slug="newer""#));
}

#[tokio::test]
async fn unknown_post_is_not_found() {
    let tmp = site();
    let (status, html) = get(&app(&tmp), "/posts/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(html.contains("404"));
}

#[tokio::test]
async fn tag_pages_are_case_insensitive() {
    let tmp = site();
    let app = app(&tmp);

    let (status, html) = get(&app, "/tags/RUST").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Newer Post"));
    assert!(html.contains("Older Post"));

    let (status, html) = get(&app, "/tags/web").await;
    assert_eq!(status, StatusCode::OK);
    let listing = html.split(r#"id="search-corpus""#).next().unwrap();
    assert!(listing.contains("Newer Post"));
    assert!(!listing.contains("Older Post"));

    let (status, _) = get(&app, "/tags/cooking").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn counters_accumulate() {
    let tmp = site();
    let app = app(&tmp);

    let (status, body) = post_json(&app, "/api/posts/newer", json!({"type": "view"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"value": 1}));
    let (_, body) = post_json(&app, "/api/posts/newer", json!({"type": "view"})).await;
    assert_eq!(body, json!({"value": 2}));

    let (status, text) = get(&app, "/api/posts/newer").await;
    assert_eq!(status, StatusCode::OK);
    let counts: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(counts, json!({"views": 2, "likes": 0}));
}

#[tokio::test]
async fn unknown_counter_type_is_a_noop() {
    let tmp = site();
    let app = app(&tmp);

    let (status, body) = post_json(&app, "/api/posts/newer", json!({"type": "share"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"value": 0}));

    let (_, text) = get(&app, "/api/posts/newer").await;
    let counts: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(counts, json!({"views": 0, "likes": 0}));
}

#[tokio::test]
async fn degraded_counters() {
    let tmp = site();
    let app = app_with(&tmp, CounterService::degraded());

    let (status, text) = get(&app, "/api/posts/newer").await;
    assert_eq!(status, StatusCode::OK);
    let counts: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(counts, json!({"views": 0, "likes": 0}));

    let (status, body) = post_json(&app, "/api/posts/newer", json!({"type": "like"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"value": 1}));
}

#[tokio::test]
async fn store_outage_reports_errors() {
    let tmp = site();
    let app = app_with(
        &tmp,
        CounterService::backed(Arc::new(DownStore), Duration::from_secs(1)),
    );

    let (status, text) = get(&app, "/api/posts/newer").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let counts: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(counts, json!({"views": 0, "likes": 0}));

    let (status, body) = post_json(&app, "/api/posts/newer", json!({"type": "view"})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Failed to update stats"}));

    // Pages still render without counters
    let (status, _) = get(&app, "/posts/newer").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn search_api() {
    let tmp = site();
    let app = app(&tmp);

    let (status, text) = get(&app, "/api/search").await;
    assert_eq!(status, StatusCode::OK);
    let corpus: Value = serde_json::from_str(&text).unwrap();
    let corpus = corpus.as_array().unwrap();
    assert_eq!(corpus.len(), 2);
    assert_eq!(corpus[0]["slug"], "newer");
    assert_eq!(corpus[0]["content"], "Top Section One text Sub Section One");

    let (status, text) = get(&app, "/api/search?q=ownership").await;
    assert_eq!(status, StatusCode::OK);
    let hits: Value = serde_json::from_str(&text).unwrap();
    let hits = hits.as_array().unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["slug"], "older");
    assert_eq!(hits[0]["url"], "/posts/older#:~:text=ownership");
}

#[tokio::test]
async fn about_page_and_assets() {
    let tmp = site();
    let app = app(&tmp);

    let (status, html) = get(&app, "/about").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("About Me"));
    assert!(html.contains("<strong>there</strong>"));

    let resp = app
        .clone()
        .oneshot(Request::get("/assets/post-stats.js").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()[header::CONTENT_TYPE],
        "text/javascript; charset=utf-8"
    );
}

#[tokio::test]
async fn static_files_and_fallback_404() {
    let tmp = site();
    let app = app(&tmp);

    let (status, body) = get(&app, "/robots.txt").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("User-agent"));

    let (status, html) = get(&app, "/nope/nothing.html").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(html.contains("does not exist"));
}
