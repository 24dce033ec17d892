//! Top-level router.
//!
//! There are no per-path routes: every method and path reaches the dispatch engine
//! through the router fallback, which decides between shorten, redirect, template,
//! index and 404 itself.

use crate::api::handlers::dispatch_handler;
use crate::api::middleware::tracing;
use crate::state::AppState;
use axum::Router;

/// Constructs the application router.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .fallback(dispatch_handler)
        .with_state(state)
        .layer(tracing::layer())
}
