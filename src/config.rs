//! Service configuration from the environment.
//!
//! `.env` is loaded first when present; real environment variables win.
//! Malformed numbers fall back to their defaults rather than aborting startup.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use tracing::debug;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_DEMO_USERS: &[&str] = &["Alice", "Bob", "Carol"];

/// Which shared store backs the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

impl StoreKind {
    /// Parse `LOGBOARD_STORE`. Anything other than `memory` means Postgres.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("memory") { Self::Memory } else { Self::Postgres }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub store: StoreKind,
    /// Display names seeded into the in-memory store.
    pub demo_users: Vec<String>,
}

impl AppConfig {
    #[must_use]
    pub fn from_env() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "loaded .env"),
            Err(err) => debug!(error = %err, "no .env loaded"),
        }
        Self {
            port: env_parse("PORT", DEFAULT_PORT),
            database_url: std::env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty()),
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS),
            store: std::env::var("LOGBOARD_STORE").map_or(StoreKind::Postgres, |raw| StoreKind::parse(&raw)),
            demo_users: std::env::var("LOGBOARD_DEMO_USERS").map_or_else(|_| default_demo_users(), |raw| parse_names(&raw)),
        }
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

/// Split a comma-separated name list, dropping blanks. An empty result falls
/// back to the default roster.
pub(crate) fn parse_names(raw: &str) -> Vec<String> {
    let names: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .collect();
    if names.is_empty() { default_demo_users() } else { names }
}

fn default_demo_users() -> Vec<String> {
    DEFAULT_DEMO_USERS.iter().map(|name| (*name).to_owned()).collect()
}
