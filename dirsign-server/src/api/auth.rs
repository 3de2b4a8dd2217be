use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use base64::Engine;
use dirsign_core::crypto::hash_password;
use subtle::ConstantTimeEq;

use crate::error::ServerError;
use crate::state::AppState;

/// Split an `Authorization: Basic ...` value into user and password.
pub fn parse_basic(value: &str) -> Option<(String, String)> {
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, password) = decoded.split_once(':')?;
    Some((user.to_string(), password.to_string()))
}

fn check(accounts: &HashMap<String, String>, user: &str, password: &str) -> bool {
    match accounts.get(user) {
        Some(expected) => {
            let actual = hash_password(password);
            bool::from(expected.as_bytes().ct_eq(actual.as_bytes()))
        }
        None => false,
    }
}

/// Basic-auth gate in front of every route when accounts are configured.
pub async fn basic_auth(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(accounts) = &state.accounts else {
        return Ok(next.run(request).await);
    };

    let credentials = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_basic);

    match credentials {
        Some((user, password)) if check(accounts, &user, &password) => {
            tracing::debug!(user = %user, "basic auth accepted");
            Ok(next.run(request).await)
        }
        Some((user, _)) => {
            tracing::warn!(user = %user, "basic auth rejected");
            Err(ServerError::Unauthorized)
        }
        None => {
            tracing::warn!(path = %request.uri().path(), "missing basic auth credentials");
            Err(ServerError::Unauthorized)
        }
    }
}
