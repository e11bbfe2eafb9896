//! Route configuration.

use crate::handlers;
use crate::state::AppState;
use axum::Router;
use tower_http::trace::TraceLayer;

/// Create the application router.
///
/// The entire path space belongs to artifact lookups, so the router is a
/// single fallback handler; no named route may shadow a published file.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .fallback(handlers::serve_artifact)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
