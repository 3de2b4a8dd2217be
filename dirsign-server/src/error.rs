use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use dirsign_core::error::DirsignError;
use dirsign_core::protocol::status_code;
use serde_json::json;
use thiserror::Error;

/// Server-level error type covering all subsystems.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error(transparent)]
    Protocol(#[from] DirsignError),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TLS error: {0}")]
    Tls(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServerError::Protocol(e) => {
                StatusCode::from_u16(status_code(e)).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            ServerError::Unauthorized => {
                return (
                    StatusCode::UNAUTHORIZED,
                    [(header::WWW_AUTHENTICATE, r#"Basic realm="Restricted""#)],
                    axum::Json(json!({ "error": "Unauthorized" })),
                )
                    .into_response();
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

/// Convenience alias for server results.
pub type Result<T> = std::result::Result<T, ServerError>;
