use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;

use crate::error::Result;
use crate::state::AppState;

/// POST /v1/api/retrieve/
///
/// 200 when the folder still matches its registration, 403 on mismatch and
/// 404 for an unknown key.
pub async fn verify(State(state): State<Arc<AppState>>, body: Bytes) -> Result<StatusCode> {
    state.protocol.verify(&body)?;
    Ok(StatusCode::OK)
}
