//! Scroll synchronization.
//!
//! Two independent offsets live here:
//!
//! - one vertical offset per item pane. In overview, the pane that scrolls
//!   broadcasts its offset and every other visible pane adopts it in the same
//!   call. Adoption never broadcasts, and a pane reporting the offset it
//!   already holds is treated as an echo, so a synced pane cannot feed the
//!   value back. While focused, the focused pane scrolls alone.
//! - the horizontal offset of the shared user-selector strip. It is one value
//!   for the whole board, unaffected by focus, and the session persists it on
//!   every change.

#[cfg(test)]
#[path = "scroll_test.rs"]
mod scroll_test;

use std::collections::BTreeMap;

use tracing::debug;

use crate::model::{PaneKind, UserId};
use crate::view::ViewCoordinator;

/// What a vertical scroll input did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrollOutcome {
    /// Hidden pane or an echo of the current offset.
    Ignored,
    /// Only the originating pane moved.
    Local,
    /// The origin moved and the listed panes adopted its offset.
    Broadcast { adopted: Vec<UserId> },
}

#[derive(Debug, Default)]
pub struct ScrollSynchronizer {
    vertical: BTreeMap<UserId, i64>,
    horizontal: i64,
}

impl ScrollSynchronizer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn vertical_offset(&self, user: UserId) -> i64 {
        self.vertical.get(&user).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn horizontal_offset(&self) -> i64 {
        self.horizontal
    }

    /// Handle a vertical scroll reported by `origin`'s pane.
    pub fn scroll_vertical(&mut self, origin: UserId, offset: i64, view: &ViewCoordinator) -> ScrollOutcome {
        let offset = offset.max(0);
        if !view.is_visible(PaneKind::ItemPane, origin) {
            debug!(%origin, offset, "scroll from hidden pane ignored");
            return ScrollOutcome::Ignored;
        }
        if self.vertical_offset(origin) == offset {
            return ScrollOutcome::Ignored;
        }
        self.vertical.insert(origin, offset);

        if !view.mode().is_overview() {
            return ScrollOutcome::Local;
        }

        let adopted: Vec<UserId> = view
            .visible_panes()
            .into_iter()
            .filter(|&pane| pane != origin)
            .collect();
        for pane in &adopted {
            self.vertical.insert(*pane, offset);
        }
        debug!(%origin, offset, adopted = adopted.len(), "vertical offset broadcast");
        ScrollOutcome::Broadcast { adopted }
    }

    /// Back to the top, as after a full reload.
    pub fn reset(&mut self, user: UserId) {
        self.vertical.insert(user, 0);
    }

    /// Record a new horizontal offset. Returns `true` if it changed.
    pub fn set_horizontal(&mut self, offset: i64) -> bool {
        let offset = offset.max(0);
        if self.horizontal == offset {
            return false;
        }
        self.horizontal = offset;
        true
    }
}
