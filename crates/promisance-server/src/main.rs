use anyhow::Context;
use promisance_server::{AppState, housekeeping, routes};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let path = promisance_config::config_path();
    let cfg = promisance_config::load_config()
        .with_context(|| format!("failed to load config from {}", path.display()))?;
    let prune_every = cfg.jot.prune_interval()?;

    let state = Arc::new(AppState::init(cfg)?);
    let _pruner = housekeeping::spawn_pruner(Arc::clone(&state.factory), prune_every);

    let app = routes::create_router(Arc::clone(&state));

    let addr = state.config.server.bind.clone();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("promisance-server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
