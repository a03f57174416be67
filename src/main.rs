mod config;
mod db;
mod routes;
mod state;

use std::sync::Arc;

use board::{MemoryStore, SharedStateStore};
use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, StoreKind};
use crate::state::AppState;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env();
    let store: Arc<dyn SharedStateStore> = match config.store {
        StoreKind::Memory => {
            tracing::info!(users = config.demo_users.len(), "using in-memory store");
            Arc::new(MemoryStore::with_users(&config.demo_users))
        }
        StoreKind::Postgres => db::connect_store(config.database_url.as_deref(), config.db_max_connections).await,
    };

    let state = AppState::open(store).await;
    let app = routes::app(state.clone());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;

    tracing::info!(port = config.port, "logboard listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await
}

/// Wait for ctrl-c, then remember who was editing.
async fn shutdown_signal(state: AppState) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "ctrl-c handler failed; shutting down");
    }
    let mut session = state.session.lock().await;
    if let Err(err) = session.shutdown().await {
        tracing::warn!(error = %err, "could not record last editor on shutdown");
    }
}
