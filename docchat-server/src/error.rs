//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`] so errors are automatically converted
//! to a `{"error": "..."}` JSON body with an appropriate status code.
//!
//! Document and completion failures carry their description to the caller.
//! Storage faults are logged with full detail but only a generic message is
//! returned, so SQL and file paths never leak to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::services::completion::CompletionError;
use crate::services::document::DocumentError;

/// All errors that can occur in the docchat-server request lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// A required request field was absent or empty.
    #[error("{0}")]
    BadRequest(String),

    /// The request body exceeded the configured upload limit.
    #[error("{0}")]
    PayloadTooLarge(String),

    /// The uploaded payload is not a readable document.
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// The external completion API failed or answered with garbage.
    #[error(transparent)]
    Upstream(#[from] CompletionError),

    /// Propagated from the SQLite store.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// An unclassified internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, client_message) = match &self {
            ServerError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
            ServerError::PayloadTooLarge(m) => (StatusCode::PAYLOAD_TOO_LARGE, m.clone()),
            ServerError::Document(e @ DocumentError::TooLarge { .. }) => {
                (StatusCode::PAYLOAD_TOO_LARGE, e.to_string())
            }

            ServerError::Document(e) => {
                error!(error = %e, "document parse failed");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            ServerError::Upstream(e) => {
                error!(error = %e, "completion API call failed");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            ServerError::Database(e) => {
                error!(error = %e, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_owned(),
                )
            }
            ServerError::Internal(m) => {
                error!(message = %m, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_owned(),
                )
            }
        };
        (status, Json(json!({ "error": client_message }))).into_response()
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(e: anyhow::Error) -> Self {
        error!(error = ?e, "converting anyhow error to ServerError::Internal");
        ServerError::Internal(e.to_string())
    }
}
