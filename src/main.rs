//src/main.rs

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod common;
mod config;
mod db;
mod handlers;
mod middleware;
mod models;
mod routes;
mod services;
#[cfg(test)]
mod test_support;

use crate::config::{AppState, Config};
use crate::services::KitchenHub;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    // If configuration or the database is unavailable the server must not start.
    let config = Config::from_env()?;
    let bind_addr = config.bind_addr.clone();
    let app_state = AppState::new(config).await?;

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .context("database migrations failed")?;

    tracing::info!("✅ Database migrations applied");

    let hub = app_state.kitchen_hub.clone();
    let app = routes::router(app_state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("could not bind {bind_addr}"))?;
    tracing::info!("🚀 Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(hub))
        .await
        .context("server error")?;

    Ok(())
}

// Waits for Ctrl-C, then closes every kitchen display so their sockets do not
// hold the graceful shutdown open.
async fn shutdown_signal(hub: Arc<KitchenHub>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
    hub.close_all();
}
