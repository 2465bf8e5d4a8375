//! Memcached KV - host binary
//!
//! Loads the host configuration, wires the memcached plugin and serves every
//! memcached-backed storage over HTTP.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use memcached_kv::api::{create_router, AppState};
use memcached_kv::config::{Configurer, JsonConfig, ServerConfig};
use memcached_kv::kv::Storage;
use memcached_kv::plugin::{memcached_storages, Plugin, TracingLogger};
use memcached_kv::PluginError;

/// Main entry point for the KV server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load server settings from environment variables
/// 3. Load the host configuration file
/// 4. Initialize the plugin (exit cleanly when disabled)
/// 5. Create one driver per memcached storage
/// 6. Serve the HTTP facade until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "memcached_kv=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Memcached KV server");

    let server = ServerConfig::from_env();
    let cfg: Arc<dyn Configurer> = Arc::new(JsonConfig::from_file(&server.config_path)?);
    info!(
        "Configuration loaded: config_path={}, port={}",
        server.config_path, server.server_port
    );

    let plugin = match Plugin::init(&TracingLogger, cfg.clone()) {
        Ok(plugin) => plugin,
        Err(PluginError::Disabled) => {
            info!(
                "No kv section in configuration, {} plugin disabled",
                memcached_kv::plugin::PLUGIN_NAME
            );
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    // Pool threads are spawned per storage; keep that off the runtime
    let storages = tokio::task::spawn_blocking(move || connect_storages(&plugin, cfg.as_ref()))
        .await
        .context("storage construction task failed")??;
    info!("Serving {} storage(s)", storages.len());

    let state = AppState::new(storages);
    let app = create_router(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], server.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.stop_all();
    info!("Server shutdown complete");
    Ok(())
}

/// Builds a driver for every storage configured with the memcached driver.
fn connect_storages(
    plugin: &Plugin,
    cfg: &dyn Configurer,
) -> anyhow::Result<HashMap<String, Arc<dyn Storage>>> {
    let mut storages = HashMap::new();
    for (name, key) in memcached_storages(cfg) {
        let storage = plugin
            .kv_from_config(&key)
            .with_context(|| format!("creating storage {name}"))?;
        info!(storage = %name, "storage ready");
        storages.insert(name, storage);
    }
    if storages.is_empty() {
        warn!("No storage uses the {} driver", plugin.name());
    }
    Ok(storages)
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
