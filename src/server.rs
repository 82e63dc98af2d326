//! Router assembly and server lifecycle.

use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::app_state::AppState;
use crate::auth::{AcceptTruthy, CredentialVerifier};
use crate::config::RelayConfig;
use crate::cors::{OriginPolicy, enforce_origin};
use crate::domain::ConnectionManager;
use crate::service::RelayService;
use crate::ws::handler::ws_handler;

/// Builds application state from configuration with the given verifier.
#[must_use]
pub fn build_state(config: &RelayConfig, verifier: Arc<dyn CredentialVerifier>) -> AppState {
    let connections = Arc::new(ConnectionManager::new(config.outbound_buffer_capacity));
    AppState::new(RelayService::new(connections, verifier))
}

/// Builds the full router: HTTP API, `/ws`, CORS headers, the origin gate,
/// and request tracing.
///
/// The origin gate wraps the CORS layer, so preflights from foreign origins
/// are refused too.
pub fn build_app(state: AppState, policy: OriginPolicy) -> Router {
    Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws_handler))
        .layer(policy.cors_layer())
        .layer(middleware::from_fn_with_state(policy, enforce_origin))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves `app` on `listener` until Ctrl-C or SIGTERM.
///
/// # Errors
///
/// Returns an error if the server fails while accepting connections.
pub async fn serve(listener: TcpListener, app: Router) -> std::io::Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

/// Binds the configured address and runs the relay with the default
/// credential verifier.
///
/// # Errors
///
/// Returns an error if binding or serving fails.
pub async fn run(config: RelayConfig) -> std::io::Result<()> {
    let state = build_state(&config, Arc::new(AcceptTruthy));
    let policy = OriginPolicy::new(config.allowed_origins.iter().cloned());
    let app = build_app(state, policy);

    let listener = TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "WebSocket server listening");
    serve(listener, app).await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(%err, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                tracing::error!(%err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
