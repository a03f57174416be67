//! Chunked materialization of item rows.
//!
//! DESIGN
//! ======
//! Every user has a fixed grid of [`MAX_ROWS`] row slots. Rows are
//! materialized in chunks of [`ROWS_PER_CHUNK`], ascending, and only as many
//! as the viewport needs:
//!
//! - maximized window, fewer than [`MAXIMIZED_FILL_ROWS`] rows: load enough
//!   chunks to reach the target (rounded up to whole chunks);
//! - normal window, fewer than [`NORMAL_FILL_ROWS`] rows: load exactly one
//!   chunk per evaluation;
//! - otherwise nothing.
//!
//! The policy runs once per evaluation cycle. A cycle starts when the pane
//! is created or reloaded, or when [`ItemsPane::invalidate`] reports that the
//! viewport changed (pane shown, window resized, maximize toggled). Filling
//! again within the same cycle is a no-op, so a normal window grows by one
//! chunk per viewport change rather than filling without bound.
//!
//! Filling never removes rows. Only [`ChunkLoader::reload`] clears a pane,
//! and it immediately re-applies the same policy.

#[cfg(test)]
#[path = "chunks_test.rs"]
mod chunks_test;

use std::collections::BTreeMap;

use tracing::debug;

use crate::consts::{MAX_ROWS, MAXIMIZED_FILL_ROWS, NORMAL_FILL_ROWS, ROWS_PER_CHUNK};
use crate::model::{Item, UserId};
use crate::store::{SharedStateStore, StoreError};

// =============================================================================
// POLICY
// =============================================================================

/// Sizing knobs for the fill policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPolicy {
    pub rows_per_chunk: usize,
    pub max_rows: usize,
    pub maximized_fill: usize,
    pub normal_fill: usize,
}

impl Default for ChunkPolicy {
    fn default() -> Self {
        Self {
            rows_per_chunk: ROWS_PER_CHUNK,
            max_rows: MAX_ROWS,
            maximized_fill: MAXIMIZED_FILL_ROWS,
            normal_fill: NORMAL_FILL_ROWS,
        }
    }
}

impl ChunkPolicy {
    /// Chunks to load for a pane currently holding `rows`.
    #[must_use]
    pub fn chunks_to_load(&self, rows: usize, maximized: bool) -> usize {
        let per_chunk = self.rows_per_chunk.max(1);
        let wanted = if maximized {
            self.maximized_fill.saturating_sub(rows).div_ceil(per_chunk)
        } else if rows < self.normal_fill {
            1
        } else {
            0
        };
        let room = self.max_rows.saturating_sub(rows).div_ceil(per_chunk);
        wanted.min(room)
    }
}

// =============================================================================
// ITEMS PANE
// =============================================================================

/// One user's materialized rows.
#[derive(Debug, Clone)]
pub struct ItemsPane {
    user_id: UserId,
    rows: Vec<Item>,
    loaded_chunks: usize,
    fill_pending: bool,
}

impl ItemsPane {
    #[must_use]
    pub fn new(user_id: UserId) -> Self {
        Self { user_id, rows: Vec::new(), loaded_chunks: 0, fill_pending: true }
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn rows(&self) -> &[Item] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn loaded_chunks(&self) -> usize {
        self.loaded_chunks
    }

    /// Whether the next [`ChunkLoader::fill`] will evaluate the policy.
    #[must_use]
    pub fn fill_pending(&self) -> bool {
        self.fill_pending
    }

    /// Start a new evaluation cycle after a viewport change.
    pub fn invalidate(&mut self) {
        self.fill_pending = true;
    }

    fn clear(&mut self) {
        self.rows.clear();
        self.loaded_chunks = 0;
        self.fill_pending = true;
    }

    fn append_chunk(&mut self, chunk: &[Item]) {
        self.rows.extend_from_slice(chunk);
        self.loaded_chunks += 1;
    }
}

// =============================================================================
// LOADER
// =============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct ChunkLoader {
    policy: ChunkPolicy,
}

impl ChunkLoader {
    #[must_use]
    pub fn new(policy: ChunkPolicy) -> Self {
        Self { policy }
    }

    #[must_use]
    pub fn policy(&self) -> ChunkPolicy {
        self.policy
    }

    /// Apply the fill policy for the current evaluation cycle. Returns the
    /// appended chunks in order; empty if this cycle was already evaluated.
    ///
    /// # Errors
    ///
    /// Propagates the store error if row content cannot be read; chunks
    /// loaded before the failure stay in the pane and the cycle stays open.
    pub async fn fill(
        &self,
        pane: &mut ItemsPane,
        maximized: bool,
        store: &dyn SharedStateStore,
    ) -> Result<Vec<Vec<Item>>, StoreError> {
        if !pane.fill_pending {
            return Ok(Vec::new());
        }
        let chunks = self.policy.chunks_to_load(pane.len(), maximized);
        let mut appended = Vec::with_capacity(chunks);
        for _ in 0..chunks {
            let chunk = self.load_chunk(pane, store).await?;
            if chunk.is_empty() {
                break;
            }
            appended.push(chunk);
        }
        pane.fill_pending = false;
        if !appended.is_empty() {
            debug!(user = %pane.user_id, chunks = appended.len(), rows = pane.len(), maximized, "pane filled");
        }
        Ok(appended)
    }

    /// Clear the pane and fill it again from scratch.
    ///
    /// # Errors
    ///
    /// Propagates the store error from the refill.
    pub async fn reload(
        &self,
        pane: &mut ItemsPane,
        maximized: bool,
        store: &dyn SharedStateStore,
    ) -> Result<Vec<Vec<Item>>, StoreError> {
        pane.clear();
        self.fill(pane, maximized, store).await
    }

    /// Materialize the next chunk regardless of viewport size, up to the
    /// row ceiling. Returns the new rows (empty when the pane is full).
    ///
    /// # Errors
    ///
    /// Propagates the store error if row content cannot be read.
    pub async fn load_chunk(&self, pane: &mut ItemsPane, store: &dyn SharedStateStore) -> Result<Vec<Item>, StoreError> {
        let first = pane.len();
        let count = self.policy.rows_per_chunk.min(self.policy.max_rows.saturating_sub(first));
        if count == 0 {
            return Ok(Vec::new());
        }

        let mut stored: BTreeMap<usize, Item> = store
            .item_rows(pane.user_id, first, count)
            .await?
            .into_iter()
            .map(|item| (item.row_index, item))
            .collect();

        let chunk: Vec<Item> = (first..first + count)
            .map(|row| match stored.remove(&row) {
                Some(item) => Item { user_id: pane.user_id, ..item },
                None => Item::blank(pane.user_id, row),
            })
            .collect();
        pane.append_chunk(&chunk);
        Ok(chunk)
    }
}
