//! Error types for the HTTP server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::loader::Superseded;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ServerError {
    /// Locale or slug that cannot name a document.
    #[error("Invalid document path: {0}")]
    InvalidPath(String),

    /// Locale file missing or without readable navigation.
    #[error("Locale unavailable: {0}")]
    LocaleUnavailable(String),

    /// A newer route from the same client replaced this load.
    #[error(transparent)]
    Superseded(#[from] Superseded),

    /// Controller lifecycle failure.
    #[error("Offline controller error: {0}")]
    Lifecycle(#[from] vd_offline::LifecycleError),

    /// Request URL could not be mapped onto the scope.
    #[error("Invalid request URL: {0}")]
    Url(#[from] url::ParseError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::InvalidPath(path) => (
                StatusCode::BAD_REQUEST,
                json!({"error": "Invalid document path", "path": path}),
            ),
            Self::LocaleUnavailable(locale) => (
                StatusCode::NOT_FOUND,
                json!({"error": "Locale unavailable", "locale": locale}),
            ),
            Self::Superseded(superseded) => (
                StatusCode::CONFLICT,
                json!({"error": "Superseded", "path": superseded.path}),
            ),
            Self::Lifecycle(e) => (StatusCode::CONFLICT, json!({"error": e.to_string()})),
            Self::Url(e) => (StatusCode::BAD_REQUEST, json!({"error": e.to_string()})),
        };

        (status, axum::Json(body)).into_response()
    }
}
