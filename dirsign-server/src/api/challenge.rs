use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;

use crate::error::{Result, ServerError};
use crate::state::AppState;

/// POST /v1/api/challenge
///
/// Registers the folder described by the negotiate body and answers with the
/// marshaled challenge message. 409 when the key is already registered.
pub async fn register(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse> {
    // Registration rewrites the store file; keep it off the async workers.
    let reply = tokio::task::spawn_blocking(move || state.protocol.register(&body))
        .await
        .map_err(|e| ServerError::Internal(format!("register task failed: {e}")))??;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/octet-stream")],
        reply,
    ))
}
