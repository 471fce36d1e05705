//! Headless display client.
//!
//! Mirrors the queue from the server, keeps working from its local snapshot
//! when the server is unreachable, and logs what a wall display would show.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use queueline_core::{
    create_sync_system, load_config, validate_config, FileSnapshotStore, HttpTicketRemote,
    SyncOptions, SystemClock,
};
use queueline_server::monitor::{BoardEvent, BoardWatcher};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = std::env::var("QUEUELINE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;

    let remote = HttpTicketRemote::from_config(&config.sync).context("Failed to create HTTP client")?;
    let snapshot = FileSnapshotStore::new(&config.sync.snapshot_dir);
    info!(
        server = %config.sync.server_url,
        snapshot = %snapshot.path().display(),
        "Monitoring queue"
    );

    let options = SyncOptions::from(&config.sync);
    let (queue, forwarder) = create_sync_system(
        options.clone(),
        Arc::new(remote),
        Arc::new(snapshot),
        Arc::new(SystemClock::new()),
    );
    let forwarder_handle = tokio::spawn(forwarder.run());

    // What is already on the board when the monitor starts is not news.
    if let Err(e) = queue.poll_once().await {
        warn!("Initial poll failed, starting from local snapshot: {}", e);
    }
    let mut watcher = BoardWatcher::new();
    watcher.observe(&queue.tickets(), queue.is_online());

    let poll_handle = queue.start();
    let mut interval = tokio::time::interval(options.poll_interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let shutdown = signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = &mut shutdown => {
                if let Err(e) = result {
                    error!("Failed to listen for Ctrl+C: {}", e);
                }
                break;
            }
            _ = interval.tick() => {
                for event in watcher.observe(&queue.tickets(), queue.is_online()) {
                    match event {
                        BoardEvent::WentOffline => warn!("{}", event),
                        _ => info!("{}", event),
                    }
                }
            }
        }
    }

    info!("Stopping monitor");
    queue.stop();
    if let Some(handle) = poll_handle {
        let _ = handle.await;
    }

    // The forwarder ends once the last queue handle is gone.
    drop(queue);
    let _ = forwarder_handle.await;

    Ok(())
}
