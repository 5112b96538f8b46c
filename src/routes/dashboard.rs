use crate::AppState;
use axum::Router;
use tower_http::services::{ServeDir, ServeFile};

/// Dashboard Router Module
///
/// Serves the single-page dashboard for every path not claimed elsewhere: the auth
/// pages and each role's area alike. Unknown paths fall back to `index.html` so the
/// client router can render them.
///
/// Access Control:
/// This router must be wrapped by `edge_router` (see `create_router`). The shell itself
/// performs no checks.
pub fn dashboard_routes(state: &AppState) -> Router<AppState> {
    let static_dir = &state.config.static_dir;
    // `fallback` keeps the 200 from ServeFile; `not_found_service` would force a 404.
    let shell = ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new().fallback_service(shell)
}
