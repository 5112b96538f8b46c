use fleet_gate::{AppState, config::{AppConfig, Env}, create_router};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Entry point: loads configuration, installs logging, builds the access policy once,
/// and serves the gated dashboard.
#[tokio::main]
async fn main() {
    // 1. Configuration & Environment Loading (Fail-Fast)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging Filter Setup
    // RUST_LOG wins; otherwise decision logs at debug, HTTP spans at info.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "fleet_gate=debug,tower_http=info".into());

    // 3. Initialize Logging based on Environment
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Edge gate starting in {:?} mode", config.env);

    // 4. Access Policy
    // Built once here and shared read-only with every request.
    let state = AppState::new(config);
    for role in state.policy.roles.roles() {
        tracing::debug!(
            role = %role,
            base = state.policy.roles.resolve_base_path(role.as_str()).unwrap_or("-"),
            "role route registered"
        );
    }

    let bind_addr = state.config.bind_addr.clone();
    let app = create_router(state);

    // 5. Server Startup
    let listener = TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|err| panic!("FATAL: cannot bind {bind_addr}: {err}"));

    tracing::info!("Listening on {}", bind_addr);

    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!(error = %err, "server stopped");
    }
}
