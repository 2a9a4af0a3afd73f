//! Chat Room Broadcast Server - Entry Point
//!
//! Loads configuration, starts the room store actor and serves the HTTP API.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use chat_broadcast_server::{router, AppState, Broadcaster, ChatRoomStore, Config, HttpNotifier};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=chat_broadcast_server=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("chat_broadcast_server=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    // Outbound delivery and the room store actor
    let notifier = HttpNotifier::new(config.callback_timeout)?;
    let broadcaster = Broadcaster::new(Arc::new(notifier), config.callback_timeout);
    let store = ChatRoomStore::spawn(broadcaster.clone());

    let app = router(AppState::new(Arc::new(store)));

    let listener = TcpListener::bind(&config.addr).await?;
    info!(
        "Chat broadcast server listening on {} (callback timeout {:?})",
        config.addr, config.callback_timeout
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let stats = broadcaster.stats();
    info!(
        "Server stopped: {} deliveries succeeded, {} failed",
        stats.delivered, stats.failed
    );

    Ok(())
}

/// Resolve once Ctrl-C is received
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            // Keep serving; only an explicit signal stops the server
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
