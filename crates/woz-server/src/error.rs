//! Error types for the HTTP surface.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use woz_store::StoreError;

/// Errors that can occur while handling a request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Collection error.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// No transcript for the requested session.
    #[error("Session not found")]
    SessionNotFound,

    /// Request body missing, not JSON, or not the expected shape.
    #[error("{}", .0.body_text())]
    InvalidBody(#[from] JsonRejection),

    /// Unknown relay endpoint.
    #[error(transparent)]
    Relay(#[from] relay::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Store(StoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Store(StoreError::InvalidOrder { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::SessionNotFound => StatusCode::NOT_FOUND,
            ApiError::Relay(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidBody(rejection) => rejection.status(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!("Request failed: {}", message);
        } else {
            tracing::debug!(status = %status, "Request rejected: {}", message);
        }

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}

/// Result type for handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
