//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the one board session behind an async mutex, so every request runs
//! against the session in turn and no two transitions interleave.

#[cfg(test)]
#[path = "state_test.rs"]
mod state_test;

use std::sync::Arc;

use board::{Session, SharedStateStore};
use tokio::sync::Mutex;

/// Clone is required by Axum; the session is shared through the `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Mutex<Session>>,
}

impl AppState {
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self { session: Arc::new(Mutex::new(session)) }
    }

    /// Open the board session against `store` and wrap it.
    pub async fn open(store: Arc<dyn SharedStateStore>) -> Self {
        Self::new(Session::open(store).await)
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use super::*;
    use board::MemoryStore;

    /// A state backed by a fresh in-memory store. The returned store shares
    /// data with the session, so tests can inspect it or take it offline.
    pub async fn test_app_state(names: &[&str]) -> (AppState, MemoryStore) {
        let store = MemoryStore::with_users(names);
        let state = AppState::open(Arc::new(store.clone())).await;
        (state, store)
    }
}
