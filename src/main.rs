//! relay-gateway server entry point.
//!
//! Starts the Axum HTTP server with the publish endpoint and the
//! WebSocket relay.

use tracing_subscriber::EnvFilter;

use relay_gateway::config::RelayConfig;
use relay_gateway::server;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json")) {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    // Load configuration
    let config = RelayConfig::from_env()?;
    tracing::info!(
        addr = %config.listen_addr,
        origins = ?config.allowed_origins,
        "starting relay-gateway"
    );

    server::run(config).await?;

    Ok(())
}
