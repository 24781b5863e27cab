//! Route definitions for the HTTP host.

use crate::middleware::{handlers, identity::resolve_identity};
use crate::state::AppState;
use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Create the router with identity resolution applied to every route.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/whoami", get(handlers::whoami))
        .route("/session/refresh", post(handlers::session_refresh))
        .route("/logout", get(handlers::logout).post(handlers::logout))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            resolve_identity,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
