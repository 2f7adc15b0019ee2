//! Snapshare server
//!
//! Serves `GET /health` and the WebSocket upgrade route, and pushes
//! `post_created` events to every connected client.
//!
//! # Usage
//!
//! ```bash
//! # Start with defaults (0.0.0.0:8080, WebSocket on /ws)
//! snapshare
//!
//! # Custom port and liveness window
//! SNAPSHARE__SERVER__PORT=3000 SNAPSHARE__REALTIME__PONG_WAIT_SECS=30 snapshare
//!
//! # Enable debug logging
//! RUST_LOG=snapshare=trace snapshare
//! ```
//!
//! # Signal Handling
//!
//! - Ctrl-C: Graceful shutdown

use std::error::Error;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use snapshare::adapters::{app_router, Hub};
use snapshare::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config);

    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(e.into());
    }

    let addr = config.server.socket_addr()?;
    let hub = Hub::spawn(config.realtime.hub_settings());
    let app = app_router(hub, &config);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        %addr,
        ws_path = %config.realtime.ws_path,
        environment = ?config.server.environment,
        "Snapshare listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Snapshare stopped");
    Ok(())
}

/// Installs the global subscriber. `RUST_LOG` overrides the configured level.
fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.is_production() {
        builder.json().init();
    } else {
        builder.compact().init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
