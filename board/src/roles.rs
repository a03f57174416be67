//! Leader/editor arbitration.
//!
//! DESIGN
//! ======
//! `RoleArbiter` is the only component that reads or writes role ids in the
//! shared store. Everything else asks it for the cached [`RoleState`], which
//! is a snapshot taken at the last store round trip. Any process may have
//! written since; `refresh` is the only way to observe that.
//!
//! Claims are cooperative: anyone may take leadership or edit focus at any
//! time, and a later write from another process silently wins.
//!
//! ERROR HANDLING
//! ==============
//! The first failed store call flips the arbiter into degraded mode: the cache
//! falls back to "no leader, overview", the failure message is kept, and
//! every operation except `refresh` fails fast without touching the store.

#[cfg(test)]
#[path = "roles_test.rs"]
mod roles_test;

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::BoardError;
use crate::model::{Deliverable, RoleState, UserId};
use crate::store::{SharedStateStore, StoreError};

/// Connection state as seen by the arbiter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum StoreHealth {
    Connected,
    Unavailable(String),
}

/// Result of a leadership claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaderOutcome {
    /// The claimant already led; nothing was written or refetched.
    Unchanged,
    /// Leadership moved to the claimant.
    Claimed { previous: Option<UserId> },
}

pub struct RoleArbiter {
    store: Arc<dyn SharedStateStore>,
    roster: BTreeSet<UserId>,
    roles: RoleState,
    deliverable: Option<Deliverable>,
    health: StoreHealth,
}

impl RoleArbiter {
    #[must_use]
    pub fn new(store: Arc<dyn SharedStateStore>) -> Self {
        Self {
            store,
            roster: BTreeSet::new(),
            roles: RoleState::default(),
            deliverable: None,
            health: StoreHealth::Connected,
        }
    }

    /// Replace the set of users role targets are validated against.
    pub fn set_roster(&mut self, users: impl IntoIterator<Item = UserId>) {
        self.roster = users.into_iter().collect();
    }

    // --- Queries ---

    #[must_use]
    pub fn roles(&self) -> RoleState {
        self.roles
    }

    #[must_use]
    pub fn current_leader_id(&self) -> Option<UserId> {
        self.roles.leader_id
    }

    #[must_use]
    pub fn current_editor_id(&self) -> Option<UserId> {
        self.roles.editor_id
    }

    #[must_use]
    pub fn last_editor_id(&self) -> Option<UserId> {
        self.roles.last_editor_id
    }

    #[must_use]
    pub fn deliverable(&self) -> Option<&Deliverable> {
        self.deliverable.as_ref()
    }

    #[must_use]
    pub fn health(&self) -> &StoreHealth {
        &self.health
    }

    #[must_use]
    pub fn is_degraded(&self) -> bool {
        matches!(self.health, StoreHealth::Unavailable(_))
    }

    #[must_use]
    pub fn is_known(&self, user: UserId) -> bool {
        self.roster.contains(&user)
    }

    // --- Store round trips ---

    /// Re-read every role id from the store. Also the only way out of
    /// degraded mode.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` (and degrades) if any read fails.
    pub async fn refresh(&mut self) -> Result<RoleState, BoardError> {
        let leader = self.store.current_leader_id().await;
        let leader = self.check(leader)?;
        let editor = self.store.current_editor_id().await;
        let editor = self.check(editor)?;
        let last = self.store.last_editor_id().await;
        let last = self.check(last)?;

        self.health = StoreHealth::Connected;
        let previous_leader = self.roles.leader_id;
        self.roles = RoleState {
            leader_id: self.sanitize(leader, "leader"),
            editor_id: self.sanitize(editor, "editor"),
            last_editor_id: self.sanitize(last, "last editor"),
        };

        if self.roles.leader_id != previous_leader || self.deliverable.is_none() {
            self.reload_deliverable().await?;
        }
        debug!(roles = ?self.roles, "role state refreshed");
        Ok(self.roles)
    }

    /// Claim leadership for `user`. Always permitted; a repeat claim by the
    /// current leader is a no-op.
    ///
    /// # Errors
    ///
    /// `InvalidRoleTarget` for unknown users, `StoreUnavailable` when degraded
    /// or when the write fails.
    pub async fn become_leader(&mut self, user: UserId) -> Result<LeaderOutcome, BoardError> {
        self.ensure_connected()?;
        self.validate(user)?;
        if self.roles.leader_id == Some(user) {
            debug!(%user, "leader claim ignored; already leader");
            return Ok(LeaderOutcome::Unchanged);
        }

        let written = self.store.set_current_leader_id(user).await;
        self.check(written)?;
        let previous = self.roles.leader_id.replace(user);
        self.reload_deliverable().await?;
        info!(%user, previous = ?previous, "leadership claimed");
        Ok(LeaderOutcome::Claimed { previous })
    }

    /// Move edit focus to `user`. Returns the accepted editor.
    ///
    /// # Errors
    ///
    /// `InvalidRoleTarget` for unknown users, `StoreUnavailable` when degraded
    /// or when the write fails.
    pub async fn request_editor_focus(&mut self, user: UserId) -> Result<UserId, BoardError> {
        self.ensure_connected()?;
        self.validate(user)?;
        if self.roles.editor_id != Some(user) {
            let written = self.store.set_current_editor_id(Some(user)).await;
            self.check(written)?;
            let previous = self.roles.editor_id.replace(user);
            info!(%user, previous = ?previous, "editor focus granted");
        }
        Ok(user)
    }

    /// Clear edit focus and remember who held it, so the same user can
    /// resume later. The holder is read from the store, not the cache, since
    /// another process may have taken focus since the last refresh. Returns
    /// the released editor, if any.
    ///
    /// # Errors
    ///
    /// `StoreUnavailable` when degraded or when a write fails.
    pub async fn release_editor_focus(&mut self) -> Result<Option<UserId>, BoardError> {
        self.ensure_connected()?;
        let previous = self.stored_editor().await?;
        let written = self.store.set_current_editor_id(None).await;
        self.check(written)?;
        self.roles.editor_id = None;

        if let Some(prev) = previous {
            let written = self.store.set_last_editor_id(prev).await;
            self.check(written)?;
            self.roles.last_editor_id = Some(prev);
        }
        info!(released = ?previous, "editor focus released");
        Ok(previous)
    }

    /// Read the last-editor record back from the store.
    ///
    /// # Errors
    ///
    /// `StoreUnavailable` when degraded or when the read fails.
    pub async fn fetch_last_editor(&mut self) -> Result<Option<UserId>, BoardError> {
        self.ensure_connected()?;
        let last = self.store.last_editor_id().await;
        let last = self.check(last)?;
        self.roles.last_editor_id = self.sanitize(last, "last editor");
        Ok(self.roles.last_editor_id)
    }

    /// Persist the store's current editor as the last editor without releasing
    /// focus. Used when a session closes while someone is still focused.
    ///
    /// # Errors
    ///
    /// `StoreUnavailable` when degraded or when the write fails.
    pub async fn record_last_editor(&mut self) -> Result<Option<UserId>, BoardError> {
        self.ensure_connected()?;
        let stored = self.stored_editor().await?;
        self.roles.editor_id = stored;
        let Some(editor) = stored else {
            return Ok(None);
        };
        let written = self.store.set_last_editor_id(editor).await;
        self.check(written)?;
        self.roles.last_editor_id = Some(editor);
        Ok(Some(editor))
    }

    /// Drop to local defaults and remember why.
    pub fn degrade(&mut self, message: &str) {
        if !self.is_degraded() {
            warn!(error = %message, "shared store unavailable; falling back to overview");
        }
        self.health = StoreHealth::Unavailable(message.to_owned());
        self.roles = RoleState::default();
        self.deliverable = None;
    }

    // --- Helpers ---

    async fn reload_deliverable(&mut self) -> Result<(), BoardError> {
        self.deliverable = match self.roles.leader_id {
            Some(leader) => {
                let fetched = self.store.deliverable(leader).await;
                self.check(fetched)?
            }
            None => None,
        };
        Ok(())
    }

    async fn stored_editor(&mut self) -> Result<Option<UserId>, BoardError> {
        let editor = self.store.current_editor_id().await;
        let editor = self.check(editor)?;
        Ok(self.sanitize(editor, "editor"))
    }

    fn ensure_connected(&self) -> Result<(), BoardError> {
        match &self.health {
            StoreHealth::Connected => Ok(()),
            StoreHealth::Unavailable(message) => Err(BoardError::StoreUnavailable(message.clone())),
        }
    }

    fn validate(&self, user: UserId) -> Result<(), BoardError> {
        if self.roster.contains(&user) {
            Ok(())
        } else {
            warn!(%user, "role target rejected; not a board user");
            Err(BoardError::InvalidRoleTarget(user))
        }
    }

    fn check<T>(&mut self, result: Result<T, StoreError>) -> Result<T, BoardError> {
        match result {
            Ok(value) => Ok(value),
            Err(err) => {
                let err = BoardError::from(err);
                if let BoardError::StoreUnavailable(message) = &err {
                    self.degrade(message);
                }
                Err(err)
            }
        }
    }

    fn sanitize(&self, id: Option<UserId>, role: &'static str) -> Option<UserId> {
        let id = id?;
        if self.roster.contains(&id) {
            Some(id)
        } else {
            warn!(%id, role, "store holds an id outside the roster; treating as none");
            None
        }
    }
}
