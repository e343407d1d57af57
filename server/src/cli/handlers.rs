// server/src/cli/handlers.rs

use std::net::SocketAddr;

use anyhow::{Context, Result};
use chrono::Utc;
use lib::{AppConfig, create_storage};
use rest_api::{AppState, start_server};
use tokio::sync::oneshot;
use tracing::{info, warn};

use super::commands::ServeArgs;

/// Resolves when the process receives Ctrl+C or, on unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to register SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}

pub async fn handle_serve(mut config: AppConfig, args: &ServeArgs) -> Result<()> {
    args.apply(&mut config);
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!("Invalid listen address {}:{}", config.server.host, config.server.port)
        })?;
    info!(
        "Starting Yideshare ({} environment, {} storage)",
        config.environment, config.storage.engine_type
    );

    let state = AppState::from_config(config)?;
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(());
    });

    start_server(state, addr, shutdown_rx).await
}

/// One-off run of the expired ride sweep, for schedulers that prefer a
/// command over calling `/api/cleanup-rides`.
pub async fn handle_close_expired(config: AppConfig) -> Result<usize> {
    let storage = create_storage(&config.storage).with_context(|| {
        format!(
            "Failed to open storage at {}",
            config.storage.data_directory.display()
        )
    })?;
    let closed = storage
        .close_expired_rides(Utc::now())
        .await
        .context("Failed to close expired rides")?;
    storage.flush().await.context("Failed to flush storage")?;
    info!("Closed {} expired rides", closed);
    println!("Closed {} expired rides", closed);
    Ok(closed)
}
