pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Build the axum Router with all routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Listeners
        .route("/ws", get(routes::ws::ws_handler))
        .route("/api/events", get(routes::events::sse_events))
        // Pipeline
        .route("/api/trigger", post(routes::trigger::trigger_scenario))
        .route("/api/dispatch", post(routes::trigger::dispatch_event))
        .route("/api/classify", post(routes::classify::classify_event))
        // Read-only views
        .route("/api/counters", get(routes::counters::get_counters))
        .route("/api/history", get(routes::counters::get_history))
        .route("/api/stats", get(routes::counters::get_stats))
        .route("/api/health", get(routes::counters::health))
        .route("/api/config", get(routes::config::get_config))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Load the project at `root` and serve it on `host:port`.
pub async fn serve(root: PathBuf, host: &str, port: u16) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    serve_on(root, listener).await
}

/// Serve on a pre-bound listener.
///
/// Lets the caller read the actual port before starting (useful when
/// `port = 0` and the OS picks a free port).
pub async fn serve_on(root: PathBuf, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    let app_state = AppState::load(root)?;
    let app = build_router(app_state);

    tracing::info!("dialectic listening on http://{addr} (ws://{addr}/ws)");

    axum::serve(listener, app).await?;
    Ok(())
}
