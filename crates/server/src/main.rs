mod api;
mod health;

use std::time::Duration;

use anyhow::Result;
use oilwise_core::config::{AppConfig, LoadOptions};

fn init_logging(config: &AppConfig) {
    use oilwise_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Load config and initialize logging before any other operations.
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let state = api::AppState::from_config(&config);
    let app = health::router().merge(api::router(state));

    let address = format!("{}:{}", config.server.bind_address, config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;

    tracing::info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        bind_address = %address,
        "oilwise-server started"
    );

    let grace_secs = config.server.graceful_shutdown_secs;
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal(grace_secs)).await?;

    tracing::info!(
        event_name = "system.server.stopped",
        correlation_id = "shutdown",
        "oilwise-server stopped"
    );

    Ok(())
}

/// Resolves when SIGINT arrives, then arms a watchdog so a connection that
/// never drains cannot hold the process open past the configured window.
async fn shutdown_signal(grace_secs: u64) {
    if tokio::signal::ctrl_c().await.is_err() {
        return;
    }

    tracing::info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        grace_secs,
        "shutdown signal received, draining connections"
    );

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(grace_secs)).await;
        tracing::warn!(
            event_name = "system.server.forced_exit",
            correlation_id = "shutdown",
            "graceful shutdown window elapsed, exiting"
        );
        std::process::exit(0);
    });
}
