//! Error types for moodtune-api
//!
//! [`PlaylistError`] holds the only failures that leave the generation
//! pipeline. [`ApiError`] maps them (and request validation) onto HTTP.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use moodtune_common::api::ErrorResponse;
use thiserror::Error;

/// Pipeline failures visible to the caller
#[derive(Debug, Error)]
pub enum PlaylistError {
    /// No usable catalog credential
    #[error("Catalog credentials unavailable: {0}")]
    Configuration(String),

    /// Every query came back without usable tracks
    #[error("No tracks found for queries: {}", .0.join(" / "))]
    NoResults(Vec<String>),

    /// Playlist creation or item addition failed
    #[error("Playlist write failed: {0}")]
    RemoteWrite(String),
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Generation failure (503 / 404 / 502)
    #[error(transparent)]
    Playlist(#[from] PlaylistError),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<moodtune_common::Error> for ApiError {
    fn from(err: moodtune_common::Error) -> Self {
        match err {
            moodtune_common::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Playlist(PlaylistError::Configuration(_)) => {
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE")
            }
            ApiError::Playlist(PlaylistError::NoResults(_)) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Playlist(PlaylistError::RemoteWrite(_)) => {
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR")
            }
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let message = match self {
            ApiError::BadRequest(msg) | ApiError::Internal(msg) => msg,
            ApiError::Playlist(err) => err.to_string(),
        };

        (status, Json(ErrorResponse::new(error_code, message))).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
