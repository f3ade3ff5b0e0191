//! Core error type for crewboard.
//!
//! `ServerError` is used throughout the core domain (stores, service, CLI).
//! When the `axum` feature is enabled, it also implements `IntoResponse`
//! so it can be used directly as an axum handler error type.

use std::io;
use std::path::Path;

use crate::workflow::validator::ValidationReport;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid id: {0}")]
    InvalidId(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation failed: {}", .0.errors.join("; "))]
    Validation(ValidationReport),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ServerError {
    /// Map an I/O failure on `path`, keeping "not found" distinct from
    /// every other filesystem error.
    pub(crate) fn from_io(err: io::Error, path: &Path) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            ServerError::NotFound(path.display().to_string())
        } else {
            ServerError::Io(format!("{}: {}", path.display(), err))
        }
    }
}

// ---------------------------------------------------------------------------
// axum integration (opt-in via feature flag)
// ---------------------------------------------------------------------------

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let status = match &self {
            ServerError::InvalidId(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Validation(_) => StatusCode::BAD_REQUEST,
            ServerError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = match &self {
            ServerError::Validation(report) => serde_json::json!({
                "error": self.to_string(),
                "errors": report.errors,
                "warnings": report.warnings,
            }),
            _ => serde_json::json!({ "error": self.to_string() }),
        };
        (status, axum::Json(body)).into_response()
    }
}
