//! Rate-limited HTTP server.
//!
//! Routes:
//! - `GET /status` - admitted or rejected by the per-client fixed-window controller
//! - anything else - static files from the configured root (`tower_http::services::ServeDir`)
//!
//! Each connection is handled on its own task; the admission decision itself
//! is synchronous.

mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::services::ServeDir;

use crate::admission::AdmissionController;
use crate::config::ServerConfig;
use handlers::status_handler;
pub use types::ServerState;

/// Builds the router for the given state.
///
/// Every path other than `/status` goes to a `ServeDir` rooted at the static
/// root. It answers GET and HEAD, serves `index.html` for directories, and
/// returns 404 for paths that leave the root.
pub fn router(state: ServerState) -> Router {
    let static_files = ServeDir::new(state.static_root.as_path());

    Router::new()
        .route("/status", get(status_handler))
        .fallback_service(static_files)
        .with_state(state)
}

/// Serves on an already-bound listener until `shutdown` is cancelled.
pub async fn serve(
    listener: TcpListener,
    state: ServerState,
    shutdown: CancellationToken,
) -> Result<(), anyhow::Error> {
    let app = router(state).into_make_service_with_connect_info::<SocketAddr>();

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}

/// Binds the configured port and runs the server until Ctrl-C.
///
/// Background tasks (the counter sweeper and the Ctrl-C listener) start only
/// once the port is bound, and are stopped however the server exits.
pub async fn start_server(config: &ServerConfig) -> Result<(), anyhow::Error> {
    let listener = TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("Failed to bind server to port {}", config.port))?;

    let controller = Arc::new(AdmissionController::new(
        config.max_requests,
        config.window_size(),
    ));
    let shutdown = CancellationToken::new();

    if let Some(every) = config.sweep_interval {
        controller.spawn_sweeper(every, shutdown.clone());
    }

    log::info!("Serving at port: {}", config.port);
    log::info!(
        "  - Status: http://127.0.0.1:{}/status ({} requests per {}s per client)",
        config.port,
        config.max_requests,
        config.window_size_secs
    );
    log::info!("  - Static files from {}", config.static_root.display());

    crate::app::spawn_ctrl_c_listener(shutdown.clone());

    let state = ServerState::new(controller, config.static_root.clone());
    let result = serve(listener, state, shutdown.clone()).await;

    shutdown.cancel();
    log::info!("Server stopped");
    result
}
