//! Error types for the chat server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chat_core::{FormatError, ModelError};
use thiserror::Error;

/// Errors a request handler can fail with.
///
/// Client errors are returned as-is; server-side failures are logged and
/// reported with status 500.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Missing identity, or the resource belongs to someone else.
    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    BadRequest(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] database::DatabaseError),

    /// Model provider error.
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Stored content that no longer parses.
    #[error("Format error: {0}")]
    Format(#[from] FormatError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServerError::Unauthorized => StatusCode::UNAUTHORIZED,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Database(err) => {
                tracing::error!("Database error: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ServerError::Model(err) => {
                tracing::error!("Model error: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ServerError::Format(err) => {
                tracing::error!("Format error: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = serde_json::json!({
            "error": self.to_string()
        });

        (status, Json(body)).into_response()
    }
}

/// Result type for request handlers.
pub type Result<T> = std::result::Result<T, ServerError>;
