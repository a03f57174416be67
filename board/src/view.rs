//! View projection: which per-user elements are visible, and which controls
//! are live, given the current edit focus.
//!
//! The coordinator is a two-state machine:
//!
//! - `Overview`: every user row, header row, and item pane is visible, and
//!   every control is enabled.
//! - `Focused(u)`: only `u`'s elements are visible. `u`'s leader control is
//!   disabled until focus is released, so the focused user cannot claim
//!   leadership mid-edit.
//!
//! Transitions report which panes need a full reload: entering overview
//! reloads every pane so edits made while focused show up for everyone;
//! entering focus reloads only the focused pane.

#[cfg(test)]
#[path = "view_test.rs"]
mod view_test;

use serde::{Deserialize, Serialize};

use crate::model::{PaneKind, RoleState, UserId};

/// Current view mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", content = "user_id", rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Overview,
    Focused(UserId),
}

impl ViewMode {
    #[must_use]
    pub fn focused_user(self) -> Option<UserId> {
        match self {
            Self::Overview => None,
            Self::Focused(user) => Some(user),
        }
    }

    #[must_use]
    pub fn is_overview(self) -> bool {
        matches!(self, Self::Overview)
    }
}

/// Panes to reload after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshScope {
    All,
    Pane(UserId),
}

/// Render state of one user's controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct UserControls {
    /// Leader badge is lit.
    pub is_leader: bool,
    /// Leader badge accepts clicks.
    pub leader_enabled: bool,
    /// Edit button accepts clicks.
    pub edit_enabled: bool,
    /// Edit button shows as pressed.
    pub edit_active: bool,
}

#[derive(Debug, Default)]
pub struct ViewCoordinator {
    mode: ViewMode,
    users: Vec<UserId>,
}

impl ViewCoordinator {
    #[must_use]
    pub fn new(users: Vec<UserId>) -> Self {
        Self { mode: ViewMode::Overview, users }
    }

    #[must_use]
    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    #[must_use]
    pub fn users(&self) -> &[UserId] {
        &self.users
    }

    // --- Transitions ---

    /// Overview -> Focused(user). Returns `None` if already focused on `user`.
    ///
    /// Callers resolve any other focus first (see [`Self::release`]); this
    /// method never jumps directly between two focused users.
    pub fn focus(&mut self, user: UserId) -> Option<RefreshScope> {
        match self.mode {
            ViewMode::Focused(current) if current == user => None,
            ViewMode::Focused(_) | ViewMode::Overview => {
                self.mode = ViewMode::Focused(user);
                Some(RefreshScope::Pane(user))
            }
        }
    }

    /// Focused(_) -> Overview. Returns the released user, or `None` if the
    /// view was already in overview.
    pub fn release(&mut self) -> Option<(UserId, RefreshScope)> {
        let user = self.mode.focused_user()?;
        self.mode = ViewMode::Overview;
        Some((user, RefreshScope::All))
    }

    /// Align the local mode with the editor id read from the shared store.
    /// Returns the reload required, or `None` if nothing changed.
    pub fn reconcile(&mut self, editor: Option<UserId>) -> Option<RefreshScope> {
        match (self.mode, editor) {
            (ViewMode::Overview, None) => None,
            (ViewMode::Focused(current), Some(user)) if current == user => None,
            (_, None) => self.release().map(|(_, scope)| scope),
            (_, Some(user)) => {
                self.mode = ViewMode::Focused(user);
                Some(RefreshScope::Pane(user))
            }
        }
    }

    // --- Projection ---

    /// Whether `user`'s element of the given kind is shown.
    #[must_use]
    pub fn is_visible(&self, kind: PaneKind, user: UserId) -> bool {
        match (self.mode, kind) {
            (ViewMode::Overview, _) => true,
            (ViewMode::Focused(focused), PaneKind::UserRow | PaneKind::HeaderRow | PaneKind::ItemPane) => {
                focused == user
            }
        }
    }

    /// Users whose item panes are currently visible.
    #[must_use]
    pub fn visible_panes(&self) -> Vec<UserId> {
        self.users
            .iter()
            .copied()
            .filter(|&u| self.is_visible(PaneKind::ItemPane, u))
            .collect()
    }

    /// Whether `user` may claim leadership right now.
    #[must_use]
    pub fn leader_enabled(&self, user: UserId) -> bool {
        self.mode != ViewMode::Focused(user)
    }

    /// Render state of `user`'s leader and edit controls.
    #[must_use]
    pub fn controls(&self, user: UserId, roles: &RoleState) -> UserControls {
        let row_visible = self.is_visible(PaneKind::UserRow, user);
        UserControls {
            is_leader: roles.is_leader(user),
            leader_enabled: row_visible && self.leader_enabled(user),
            edit_enabled: row_visible,
            edit_active: self.mode == ViewMode::Focused(user),
        }
    }
}
