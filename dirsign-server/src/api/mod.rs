pub mod auth;
pub mod challenge;
pub mod retrieve;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use dirsign_core::constants::{API_CHALLENGE, API_RETRIEVE};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the Axum router with the protocol routes, optional basic auth,
/// panic recovery and tracing middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route(API_CHALLENGE, post(challenge::register))
        .route(API_RETRIEVE, post(retrieve::verify))
        .route(API_RETRIEVE.trim_end_matches('/'), post(retrieve::verify))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth::basic_auth,
        ));

    Router::new()
        .merge(api_routes)
        .route("/health", get(health_check))
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Simple health check endpoint.
async fn health_check() -> &'static str {
    "ok"
}
