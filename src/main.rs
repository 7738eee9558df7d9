//! Coordinator Store admin server
//!
//! Builds the adapter factory from the environment, starts the optional
//! maintenance tasks and serves the admin API until SIGINT/SIGTERM.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coordinator_store::api::create_router;
use coordinator_store::{
    spawn_cache_sweep_task, spawn_stale_service_reaper, AdapterConfig, AdapterFactory, AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coordinator_store=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AdapterConfig::from_env();
    info!(
        service_name = %config.service_name,
        service_version = %config.service_version,
        admin_port = config.admin_port,
        cache_sweep_interval = config.cache_sweep_interval,
        heartbeat_interval = config.heartbeat_interval,
        stale_service_threshold = config.stale_service_threshold,
        "configuration_loaded"
    );

    let factory = Arc::new(AdapterFactory::new(config.clone()));
    factory
        .initialize()
        .await
        .context("failed to initialize adapter factory")?;

    let mut background = Vec::new();
    if config.cache_sweep_interval > 0 {
        background.push(spawn_cache_sweep_task(
            factory.in_memory_cache(),
            config.cache_sweep_interval,
        ));
    }
    background.push(spawn_stale_service_reaper(
        factory.service_discovery(true).await,
        config.heartbeat_interval,
        config.stale_service_threshold,
    ));

    let app = create_router(AppState::new(factory.clone()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.admin_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind admin listener on {addr}"))?;
    info!(%addr, "admin_server_listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(background))
        .await
        .context("admin server failed")?;

    factory.cleanup().await;
    info!("server_shutdown_complete");
    Ok(())
}

/// Waits for Ctrl+C or SIGTERM, then aborts the background tasks.
async fn shutdown_signal(background: Vec<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "ctrl_c_handler_unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "sigterm_handler_unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!(signal = "SIGINT", "shutdown_requested"),
        _ = terminate => info!(signal = "SIGTERM", "shutdown_requested"),
    }

    for handle in background {
        handle.abort();
    }
    warn!("background_tasks_aborted");
}
