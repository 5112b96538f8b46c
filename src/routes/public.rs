use crate::AppState;
use axum::{Router, routing::get};
use tower_http::services::ServeDir;

/// Public Router Module
///
/// Endpoints that never go through the edge gate, the same way an edge matcher skips
/// framework assets. Keep this list short: anything mounted here is reachable with or
/// without a credential, and is not subject to the role table.
pub fn public_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        // GET /health
        // Load balancer probe. Returns "ok" while the process is serving.
        .route("/health", get(|| async { "ok" }))
        // GET /assets/*
        // Hashed JS/CSS bundles of the dashboard. The login page needs them before
        // any credential exists.
        .nest_service("/assets", ServeDir::new(state.config.static_dir.join("assets")))
}
