//! JSON endpoints: counters and search

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::{AppError, AppState};
use crate::counter::CounterKind;
use crate::search;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct IncrementRequest {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct IncrementResponse {
    pub value: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// GET /api/posts/:slug
pub async fn get_stats(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    let outcome = state.counters.read(&slug).await;
    match outcome.fault {
        None => Json(outcome.counts).into_response(),
        Some(e) => {
            tracing::error!("Failed to read counters for {}: {}", slug, e);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(outcome.counts)).into_response()
        }
    }
}

/// POST /api/posts/:slug with `{"type": "view" | "like"}`
pub async fn increment(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(request): Json<IncrementRequest>,
) -> Result<Json<IncrementResponse>, AppError> {
    let Some(kind) = request.kind.as_deref().and_then(CounterKind::parse) else {
        tracing::debug!("Ignoring counter update {:?} for {}", request.kind, slug);
        return Ok(Json(IncrementResponse { value: 0 }));
    };

    let value = state.counters.increment(&slug, kind).await?;
    Ok(Json(IncrementResponse { value }))
}

/// GET /api/search returns the whole corpus; `?q=` returns ranked hits
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Response, AppError> {
    let snapshot = state.snapshot().await?;
    let response = match query.q.as_deref() {
        Some(q) => Json(search::search(&snapshot.corpus, q)).into_response(),
        None => Json(snapshot.corpus).into_response(),
    };
    Ok(response)
}
