//! Database initialization and migration runner.
//!
//! SYSTEM CONTEXT
//! ==============
//! Startup uses this module to build the shared store. A reachable database
//! gets migrated and wrapped in [`PgStore`]. An unreachable one still yields a
//! store, backed by a lazily connecting pool, so the board opens degraded and
//! an explicit refresh can reconnect once Postgres is back.

pub mod store;

use std::sync::Arc;

use board::SharedStateStore;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

pub use store::{OfflineStore, PgStore};

/// Initialize the `PostgreSQL` connection pool and run migrations.
///
/// # Errors
///
/// Returns an error if the connection or migrations fail.
pub async fn init_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    sqlx::migrate!("src/db/migrations").run(&pool).await?;

    Ok(pool)
}

/// Build the Postgres-backed store, falling back to a degraded one when the
/// database cannot be reached or migrated.
pub async fn connect_store(database_url: Option<&str>, max_connections: u32) -> Arc<dyn SharedStateStore> {
    let Some(url) = database_url else {
        warn!("DATABASE_URL not set; board starts without a store");
        return Arc::new(OfflineStore::new("DATABASE_URL is not configured"));
    };

    match init_pool(url, max_connections).await {
        Ok(pool) => {
            info!(max_connections, "database ready");
            Arc::new(PgStore::new(pool))
        }
        Err(err) => {
            warn!(error = %err, "database init failed; board starts degraded");
            match PgPoolOptions::new().max_connections(max_connections).connect_lazy(url) {
                Ok(pool) => Arc::new(PgStore::new(pool)),
                Err(err) => Arc::new(OfflineStore::new(err.to_string())),
            }
        }
    }
}
