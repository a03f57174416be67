//! Shared state store contract.
//!
//! DESIGN
//! ======
//! The store is the single source of truth across processes: every running
//! instance of the board reads and writes the same leader/editor ids, window
//! flags, and item rows. Writes are unconditional last-write-wins. A value read
//! from the store is a snapshot; if another process writes afterwards, the
//! local copy is stale until the next explicit read. That staleness is
//! expected and never retried away.
//!
//! `MemoryStore` keeps everything behind one shared mutex. Clones share the
//! same state, which is how tests model two processes on one store.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::model::{Deliverable, Item, User, UserId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Connection, setup, or query failure.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Cross-process session state.
#[async_trait]
pub trait SharedStateStore: Send + Sync {
    async fn current_leader_id(&self) -> Result<Option<UserId>, StoreError>;

    async fn set_current_leader_id(&self, id: UserId) -> Result<(), StoreError>;

    /// Current editor. The store encodes "nobody" as a raw id `<= 0`.
    async fn current_editor_id(&self) -> Result<Option<UserId>, StoreError>;

    /// Persist the current editor. `None` is written as `0`.
    async fn set_current_editor_id(&self, id: Option<UserId>) -> Result<(), StoreError>;

    async fn last_editor_id(&self) -> Result<Option<UserId>, StoreError>;

    async fn set_last_editor_id(&self, id: UserId) -> Result<(), StoreError>;

    /// Deliverable attached to the given leader, if one is recorded.
    async fn deliverable(&self, leader: UserId) -> Result<Option<Deliverable>, StoreError>;

    async fn window_maximized(&self) -> Result<bool, StoreError>;

    async fn set_window_maximized(&self, maximized: bool) -> Result<(), StoreError>;

    async fn horizontal_scroll_offset(&self) -> Result<i64, StoreError>;

    async fn set_horizontal_scroll_offset(&self, offset: i64) -> Result<(), StoreError>;

    /// All users in stable ascending-id order.
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    /// Stored rows for `user` with `first_row <= row_index < first_row + count`,
    /// ascending by row. Slots without stored content are simply absent.
    async fn item_rows(&self, user: UserId, first_row: usize, count: usize) -> Result<Vec<Item>, StoreError>;
}

// =============================================================================
// MEMORY STORE
// =============================================================================

#[derive(Debug, Default)]
struct MemoryState {
    available: bool,
    users: Vec<User>,
    leader_id: Option<UserId>,
    editor_raw: i64,
    last_editor_id: Option<UserId>,
    deliverables: BTreeMap<UserId, Deliverable>,
    maximized: bool,
    horizontal_offset: i64,
    items: BTreeMap<(UserId, usize), Item>,
    writes: usize,
}

/// In-process store. Clones share state.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryState>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self { inner: Arc::new(Mutex::new(MemoryState { available: true, ..MemoryState::default() })) }
    }

    /// Build a store holding users named in order, with ids starting at 1.
    #[must_use]
    pub fn with_users<S: AsRef<str>>(names: &[S]) -> Self {
        let store = Self::new();
        {
            let mut state = store.lock();
            state.users = names
                .iter()
                .zip(1_i64..)
                .filter_map(|(name, raw)| {
                    UserId::from_raw(raw).map(|id| User { id, display_name: name.as_ref().to_owned() })
                })
                .collect();
        }
        store
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read<T>(&self, f: impl FnOnce(&MemoryState) -> T) -> Result<T, StoreError> {
        let state = self.lock();
        if !state.available {
            return Err(StoreError::Unavailable("memory store offline".into()));
        }
        Ok(f(&state))
    }

    fn write(&self, f: impl FnOnce(&mut MemoryState)) -> Result<(), StoreError> {
        let mut state = self.lock();
        if !state.available {
            return Err(StoreError::Unavailable("memory store offline".into()));
        }
        f(&mut state);
        state.writes += 1;
        Ok(())
    }

    /// Simulate losing or regaining the connection.
    pub fn set_available(&self, available: bool) {
        self.lock().available = available;
    }

    /// Record a deliverable for a user.
    pub fn put_deliverable(&self, user: UserId, deliverable: Deliverable) {
        self.lock().deliverables.insert(user, deliverable);
    }

    /// Record content for one row slot.
    pub fn put_item(&self, item: Item) {
        self.lock().items.insert((item.user_id, item.row_index), item);
    }

    /// Raw editor value, including non-positive "none" encodings.
    #[must_use]
    pub fn raw_editor_id(&self) -> i64 {
        self.lock().editor_raw
    }

    /// Overwrite the raw editor value, as another process (or a legacy
    /// client writing `-1`) might.
    pub fn set_raw_editor_id(&self, raw: i64) {
        self.lock().editor_raw = raw;
    }

    /// Number of successful writes since creation.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }
}

#[async_trait]
impl SharedStateStore for MemoryStore {
    async fn current_leader_id(&self) -> Result<Option<UserId>, StoreError> {
        self.read(|s| s.leader_id)
    }

    async fn set_current_leader_id(&self, id: UserId) -> Result<(), StoreError> {
        self.write(|s| s.leader_id = Some(id))
    }

    async fn current_editor_id(&self) -> Result<Option<UserId>, StoreError> {
        self.read(|s| UserId::from_raw(s.editor_raw))
    }

    async fn set_current_editor_id(&self, id: Option<UserId>) -> Result<(), StoreError> {
        self.write(|s| s.editor_raw = UserId::raw_or_zero(id))
    }

    async fn last_editor_id(&self) -> Result<Option<UserId>, StoreError> {
        self.read(|s| s.last_editor_id)
    }

    async fn set_last_editor_id(&self, id: UserId) -> Result<(), StoreError> {
        self.write(|s| s.last_editor_id = Some(id))
    }

    async fn deliverable(&self, leader: UserId) -> Result<Option<Deliverable>, StoreError> {
        self.read(|s| s.deliverables.get(&leader).cloned())
    }

    async fn window_maximized(&self) -> Result<bool, StoreError> {
        self.read(|s| s.maximized)
    }

    async fn set_window_maximized(&self, maximized: bool) -> Result<(), StoreError> {
        self.write(|s| s.maximized = maximized)
    }

    async fn horizontal_scroll_offset(&self) -> Result<i64, StoreError> {
        self.read(|s| s.horizontal_offset)
    }

    async fn set_horizontal_scroll_offset(&self, offset: i64) -> Result<(), StoreError> {
        self.write(|s| s.horizontal_offset = offset)
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        self.read(|s| s.users.clone())
    }

    async fn item_rows(&self, user: UserId, first_row: usize, count: usize) -> Result<Vec<Item>, StoreError> {
        let end = first_row.saturating_add(count);
        self.read(|s| {
            s.items
                .range((user, first_row)..(user, end))
                .map(|(_, item)| item.clone())
                .collect()
        })
    }
}
