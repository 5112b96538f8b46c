use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
    middleware,
};
use std::sync::Arc;

use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Static access policy: role table, public routes and their bundle.
pub mod roles;
pub mod paths;
pub mod policy;

// Decision engines.
pub mod decision;
pub mod auth;
pub mod bootstrap;

pub mod config;

// Module for routing segregation (ungated, gated).
pub mod routes;
use routes::{dashboard, public};

// --- Public Re-exports ---

pub use auth::edge_router;
pub use bootstrap::SessionBootstrap;
pub use config::AppConfig;
pub use decision::{AuthorizationDecision, Credential, decide};
pub use policy::{AccessPolicy, PolicyError, PolicyState};

/// AppState
///
/// Shared by every request. Both members are immutable after startup, so cloning the
/// state is cheap and no request can observe another's changes.
#[derive(Clone)]
pub struct AppState {
    /// Configuration: the loaded, immutable environment configuration.
    pub config: AppConfig,
    /// Role table and public routes consulted by the edge router.
    pub policy: PolicyState,
}

impl AppState {
    /// State with the built-in access policy.
    pub fn new(config: AppConfig) -> Self {
        Self::with_policy(config, AccessPolicy::standard())
    }

    pub fn with_policy(config: AppConfig, policy: AccessPolicy) -> Self {
        Self {
            config,
            policy: Arc::new(policy),
        }
    }

    /// The client bootstrap engine, sharing this state's policy and configured delay.
    pub fn session_bootstrap(&self) -> SessionBootstrap {
        SessionBootstrap::new(self.policy.clone(), self.config.bootstrap_delay)
    }
}

// --- Axum FromRef Extractor Implementations ---

// Lets the gate extract only the policy from the shared state.
impl FromRef<AppState> for PolicyState {
    fn from_ref(app_state: &AppState) -> PolicyState {
        app_state.policy.clone()
    }
}

/// create_router
///
/// Assembles the routing structure: ungated public routes, the dashboard shell behind
/// the edge gate, and the observability layers around both.
pub fn create_router(state: AppState) -> Router {
    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 1. Gated Dashboard
    // `layer` (not `route_layer`) so the gate also covers the fallback shell.
    let gated = dashboard::dashboard_routes(&state).layer(middleware::from_fn_with_state(
        state.clone(),
        edge_router,
    ));

    // 2. Base Router Assembly
    let base_router = Router::new()
        .merge(public::public_routes(&state))
        .merge(gated)
        .with_state(state);

    // 3. Observability and Correlation Layers (Applied outermost)
    base_router.layer(
        ServiceBuilder::new()
            // 3a. Request ID Generation: a UUID for every incoming request.
            .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
            // 3b. Request Tracing: one span per request, carrying the request ID, so
            // the gate's decision logs correlate with the response log.
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(trace_span_logger)
                    .on_response(
                        DefaultOnResponse::new()
                            .level(Level::INFO)
                            .latency_unit(tower_http::LatencyUnit::Millis),
                    ),
            )
            // 3c. Request ID Propagation: echo x-request-id back to the client.
            .layer(PropagateRequestIdLayer::new(x_request_id)),
    )
}

/// trace_span_logger
///
/// Builds the per-request span for `TraceLayer`, tagged with the `x-request-id` set by
/// the layer above it.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
