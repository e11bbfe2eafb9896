//! Request error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors a request can fail with.
///
/// Diagnostic detail (resolved key, original host) stays in the server
/// log; the client only ever sees the status line and a bare phrase.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("cannot derive a subdomain from host: {0}")]
    MalformedHost(String),

    #[error("object not found: {0}")]
    NotFound(String),

    #[error("method not supported: {0}")]
    MethodNotAllowed(String),

    #[error("upstream store unavailable: {0}")]
    Upstream(String),
}

impl ProxyError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MalformedHost(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // The 404 body is deliberately the store's bare not-found shape,
        // not a custom page.
        let body = status.canonical_reason().unwrap_or("Error");
        (status, body).into_response()
    }
}

/// Result type for request handlers.
pub type ProxyResult<T> = std::result::Result<T, ProxyError>;
