use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::content::ContentError;
use crate::counter::CounterError;

/// Message returned to clients when a counter write fails
pub const COUNTER_WRITE_FAILED: &str = "Failed to update stats";

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error(transparent)]
    Counter(#[from] CounterError),
    #[error("rendering failed: {0}")]
    Render(#[from] anyhow::Error),
    #[error("{0}")]
    NotFound(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Content(ContentError::Timeout(_)) => {
                (StatusCode::SERVICE_UNAVAILABLE, self.to_string())
            }
            AppError::Content(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            AppError::Counter(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                COUNTER_WRITE_FAILED.to_string(),
            ),
            AppError::Render(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to render page".to_string(),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
        };

        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}
