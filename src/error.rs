//! HTTP Error Taxonomy
//!
//! Every failing route answers `{"success": false, "error": "<message>"}`.
//! Upstream messages (storage, media provider) are passed through verbatim.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::media::types::MediaError;
use crate::storage::types::KeyError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A required field is missing or malformed.
    #[error("{0}")]
    Validation(String),
    /// The caller asked to touch an asset outside its namespace.
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Upload(String),
    #[error("{0}")]
    Delete(String),
    /// Storage failure.
    #[error("{0}")]
    Upstream(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Upload(_) | ApiError::Delete(_) | ApiError::Upstream(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn missing(field: &str) -> Self {
        ApiError::Validation(format!("{} is required", field))
    }
}

impl From<KeyError> for ApiError {
    fn from(err: KeyError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<MediaError> for ApiError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::Upload(message) => ApiError::Upload(message),
            MediaError::Delete(message) => ApiError::Delete(message),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Upstream(format!("{:#}", err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::warn!("Request rejected: {}", self);
        }
        (
            status,
            Json(ErrorBody {
                success: false,
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Reads a required, non-blank user id from a request body.
pub fn require_user_id(user_id: Option<String>) -> Result<String, ApiError> {
    match user_id {
        Some(id) if !id.trim().is_empty() => Ok(id),
        _ => Err(ApiError::missing("userId")),
    }
}
