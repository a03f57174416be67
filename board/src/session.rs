//! The board session: one logical actor owning every coordination component.
//!
//! DESIGN
//! ======
//! A `Session` wires the [`RoleArbiter`], [`ViewCoordinator`],
//! [`ScrollSynchronizer`], and [`ChunkLoader`] together for one client. All
//! mutation goes through `&mut self`, so callers that share a session across
//! tasks wrap it in a single async mutex; nothing in here is re-entrant.
//!
//! Presentation is decoupled through an outbox of [`BoardEvent`]s. Every
//! operation appends the events it caused, in order, and the host drains them
//! with [`Session::take_events`]. A full picture is always available from
//! [`Session::snapshot`].
//!
//! DEGRADED MODE
//! =============
//! Any store failure drops the session into a connection-error state: no
//! users, no roles, overview only. Every operation then fails fast with the
//! same `StoreUnavailable` message until [`Session::refresh`] manages to
//! reopen the board from the store.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::chunks::{ChunkLoader, ItemsPane};
use crate::consts::COLUMN_HEADERS;
use crate::error::BoardError;
use crate::model::{Deliverable, Item, Pane, PaneKind, RoleState, User, UserId, WindowState};
use crate::roles::{LeaderOutcome, RoleArbiter, StoreHealth};
use crate::scroll::{ScrollOutcome, ScrollSynchronizer};
use crate::store::SharedStateStore;
use crate::view::{RefreshScope, UserControls, ViewCoordinator, ViewMode};

// =============================================================================
// EVENTS
// =============================================================================

/// Something the presentation layer must reflect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BoardEvent {
    /// Leader or editor assignment changed; badges and edit buttons re-render.
    RoleStateChanged { roles: RoleState },
    /// Pane visibility changed after a focus transition.
    VisibilityChanged { panes: Vec<Pane> },
    /// Panes adopted a vertical offset broadcast from `pane`.
    ScrollBroadcast { pane: UserId, offset: i64 },
    /// Rows appended to the bottom of a pane.
    ChunkAppended { pane: UserId, items: Vec<Item> },
    /// The leader's deliverable banner changed.
    DeliverableChanged { deliverable: Option<Deliverable> },
    /// A pane was emptied ahead of a full reload.
    PaneCleared { pane: UserId },
    /// The store went away; the board shows the connection error only.
    StoreUnavailable { message: String },
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// One user's row in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserView {
    pub id: UserId,
    pub display_name: String,
    pub row_visible: bool,
    pub header_visible: bool,
    pub controls: UserControls,
}

/// Everything needed to render the board from scratch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardSnapshot {
    pub status: StoreHealth,
    pub mode: ViewMode,
    pub roles: RoleState,
    pub deliverable: Option<Deliverable>,
    pub deliverable_label: Option<String>,
    pub window: WindowState,
    pub columns: Vec<&'static str>,
    pub users: Vec<UserView>,
    pub panes: Vec<Pane>,
}

// =============================================================================
// SESSION
// =============================================================================

pub struct Session {
    store: Arc<dyn SharedStateStore>,
    users: Vec<User>,
    arbiter: RoleArbiter,
    view: ViewCoordinator,
    scroll: ScrollSynchronizer,
    loader: ChunkLoader,
    panes: BTreeMap<UserId, ItemsPane>,
    maximized: bool,
    degraded: bool,
    events: Vec<BoardEvent>,
}

impl Session {
    /// Open the board against `store`. Never fails: if the store cannot be
    /// read, the session starts degraded and `refresh` retries.
    pub async fn open(store: Arc<dyn SharedStateStore>) -> Self {
        Self::open_with(store, ChunkLoader::default()).await
    }

    /// Open with a custom chunk loader.
    pub async fn open_with(store: Arc<dyn SharedStateStore>, loader: ChunkLoader) -> Self {
        let mut session = Self {
            arbiter: RoleArbiter::new(Arc::clone(&store)),
            store,
            users: Vec::new(),
            view: ViewCoordinator::default(),
            scroll: ScrollSynchronizer::new(),
            loader,
            panes: BTreeMap::new(),
            maximized: false,
            degraded: false,
            events: Vec::new(),
        };
        let loaded = session.load().await;
        if let Err(err) = session.settle(loaded) {
            debug!(error = %err, "board opened degraded");
        }
        session
    }

    // --- Queries ---

    #[must_use]
    pub fn mode(&self) -> ViewMode {
        self.view.mode()
    }

    #[must_use]
    pub fn roles(&self) -> RoleState {
        self.arbiter.roles()
    }

    #[must_use]
    pub fn users(&self) -> &[User] {
        &self.users
    }

    #[must_use]
    pub fn status(&self) -> &StoreHealth {
        self.arbiter.health()
    }

    #[must_use]
    pub fn deliverable(&self) -> Option<&Deliverable> {
        self.arbiter.deliverable()
    }

    #[must_use]
    pub fn window(&self) -> WindowState {
        WindowState { maximized: self.maximized, horizontal_scroll_offset: self.scroll.horizontal_offset() }
    }

    #[must_use]
    pub fn items_pane(&self, user: UserId) -> Option<&ItemsPane> {
        self.panes.get(&user)
    }

    /// Read-only projection of every pane, in user order.
    #[must_use]
    pub fn panes(&self) -> Vec<Pane> {
        self.panes
            .values()
            .map(|pane| Pane {
                user_id: pane.user_id(),
                visible: self.view.is_visible(PaneKind::ItemPane, pane.user_id()),
                vertical_offset: self.scroll.vertical_offset(pane.user_id()),
                loaded_chunks: pane.loaded_chunks(),
                total_rows: pane.len(),
            })
            .collect()
    }

    #[must_use]
    pub fn snapshot(&self) -> BoardSnapshot {
        let roles = self.arbiter.roles();
        let deliverable = self.arbiter.deliverable().cloned();
        BoardSnapshot {
            status: self.arbiter.health().clone(),
            mode: self.view.mode(),
            roles,
            deliverable_label: deliverable.as_ref().map(Deliverable::label),
            deliverable,
            window: self.window(),
            columns: COLUMN_HEADERS.to_vec(),
            users: self
                .users
                .iter()
                .map(|user| UserView {
                    id: user.id,
                    display_name: user.display_name.clone(),
                    row_visible: self.view.is_visible(PaneKind::UserRow, user.id),
                    header_visible: self.view.is_visible(PaneKind::HeaderRow, user.id),
                    controls: self.view.controls(user.id, &roles),
                })
                .collect(),
            panes: self.panes(),
        }
    }

    /// Drain the outbox.
    pub fn take_events(&mut self) -> Vec<BoardEvent> {
        std::mem::take(&mut self.events)
    }

    // --- Operations ---

    /// Claim leadership for `user`.
    ///
    /// # Errors
    ///
    /// `InvalidRoleTarget` for unknown users, `LeaderLocked` while `user`
    /// holds edit focus, `StoreUnavailable` when degraded or on store failure.
    pub async fn claim_leader(&mut self, user: UserId) -> Result<LeaderOutcome, BoardError> {
        let result = self.claim_leader_inner(user).await;
        self.settle(result)
    }

    /// Toggle edit focus for `user`: enter focus from overview, leave it when
    /// `user` already edits, or hand it over when someone else does.
    ///
    /// # Errors
    ///
    /// `InvalidRoleTarget` for unknown users, `StoreUnavailable` when degraded
    /// or on store failure.
    pub async fn toggle_editor_focus(&mut self, user: UserId) -> Result<ViewMode, BoardError> {
        let result = self.toggle_inner(user).await;
        self.settle(result)
    }

    /// Focus whoever edited last. Returns that user, or `None` if nobody has.
    ///
    /// # Errors
    ///
    /// `StoreUnavailable` when degraded or on store failure.
    pub async fn resume_editing(&mut self) -> Result<Option<UserId>, BoardError> {
        let result = self.resume_inner().await;
        self.settle(result)
    }

    /// Re-read shared state and reload the visible panes. Reopens the board
    /// when degraded.
    ///
    /// # Errors
    ///
    /// `StoreUnavailable` if the store is still unreachable.
    pub async fn refresh(&mut self) -> Result<(), BoardError> {
        let result = if self.degraded { self.load().await } else { self.refresh_inner().await };
        self.settle(result)
    }

    /// Vertical scroll reported by `user`'s pane.
    ///
    /// # Errors
    ///
    /// `InvalidRoleTarget` for unknown panes, `StoreUnavailable` when degraded.
    pub fn scroll_vertical(&mut self, user: UserId, offset: i64) -> Result<ScrollOutcome, BoardError> {
        self.ensure_available()?;
        self.ensure_known(user)?;
        let outcome = self.scroll.scroll_vertical(user, offset, &self.view);
        if matches!(outcome, ScrollOutcome::Broadcast { .. }) {
            self.events.push(BoardEvent::ScrollBroadcast { pane: user, offset: self.scroll.vertical_offset(user) });
        }
        Ok(outcome)
    }

    /// Move the user-selector strip and persist the offset.
    ///
    /// # Errors
    ///
    /// `StoreUnavailable` when degraded or when the write fails.
    pub async fn scroll_horizontal(&mut self, offset: i64) -> Result<i64, BoardError> {
        let result = self.scroll_horizontal_inner(offset).await;
        self.settle(result)
    }

    /// Maximize or restore the window. The flag is persisted on every call,
    /// then read back; the stored value wins.
    ///
    /// # Errors
    ///
    /// `StoreUnavailable` when degraded or on store failure.
    pub async fn set_maximized(&mut self, maximized: bool) -> Result<WindowState, BoardError> {
        let result = self.set_maximized_inner(maximized).await;
        self.settle(result)
    }

    /// The viewport changed size; re-run the fill policy on visible panes.
    ///
    /// # Errors
    ///
    /// `StoreUnavailable` when degraded or on store failure.
    pub async fn resize(&mut self) -> Result<(), BoardError> {
        let result = self.resize_inner().await;
        self.settle(result)
    }

    /// `user`'s pane was scrolled to its end; append one more chunk. Only
    /// applies in overview. Returns the number of rows added.
    ///
    /// # Errors
    ///
    /// `InvalidRoleTarget` for unknown panes, `StoreUnavailable` when degraded
    /// or on store failure.
    pub async fn load_next_chunk(&mut self, user: UserId) -> Result<usize, BoardError> {
        let result = self.load_next_chunk_inner(user).await;
        self.settle(result)
    }

    /// Record the current editor as last editor before the session goes away.
    ///
    /// # Errors
    ///
    /// `StoreUnavailable` if the write fails. A degraded session skips the
    /// write and succeeds.
    pub async fn shutdown(&mut self) -> Result<Option<UserId>, BoardError> {
        if self.degraded {
            return Ok(None);
        }
        let result = self.arbiter.record_last_editor().await;
        let recorded = self.settle(result)?;
        info!(last_editor = ?recorded, "board session closed");
        Ok(recorded)
    }

    // --- Operation bodies ---

    async fn load(&mut self) -> Result<(), BoardError> {
        let users = self.store.list_users().await?;
        let maximized = self.store.window_maximized().await?;
        let horizontal = self.store.horizontal_scroll_offset().await?;

        let ids: Vec<UserId> = users.iter().map(|user| user.id).collect();
        self.arbiter.set_roster(ids.iter().copied());
        self.view = ViewCoordinator::new(ids.clone());
        self.scroll = ScrollSynchronizer::new();
        self.scroll.set_horizontal(horizontal);
        self.panes = ids.iter().map(|&id| (id, ItemsPane::new(id))).collect();
        self.users = users;
        self.maximized = maximized;

        let roles = self.arbiter.refresh().await?;
        if let Some(editor) = roles.editor_id {
            self.view.focus(editor);
        }
        self.degraded = false;

        self.events.push(BoardEvent::RoleStateChanged { roles });
        self.events.push(BoardEvent::DeliverableChanged { deliverable: self.arbiter.deliverable().cloned() });
        self.events.push(BoardEvent::VisibilityChanged { panes: self.panes() });
        self.fill_visible().await?;
        info!(users = self.users.len(), mode = ?self.view.mode(), maximized, "board session opened");
        Ok(())
    }

    async fn claim_leader_inner(&mut self, user: UserId) -> Result<LeaderOutcome, BoardError> {
        self.ensure_available()?;
        self.ensure_known(user)?;
        if !self.view.leader_enabled(user) {
            warn!(%user, "leader claim rejected while focused");
            return Err(BoardError::LeaderLocked(user));
        }
        let outcome = self.arbiter.become_leader(user).await?;
        if let LeaderOutcome::Claimed { .. } = outcome {
            self.events.push(BoardEvent::RoleStateChanged { roles: self.arbiter.roles() });
            self.events.push(BoardEvent::DeliverableChanged { deliverable: self.arbiter.deliverable().cloned() });
        }
        Ok(outcome)
    }

    async fn toggle_inner(&mut self, user: UserId) -> Result<ViewMode, BoardError> {
        self.ensure_available()?;
        self.ensure_known(user)?;
        match self.view.mode() {
            ViewMode::Focused(current) if current == user => self.leave_focus().await?,
            ViewMode::Focused(_) => {
                self.leave_focus().await?;
                self.enter_focus(user).await?;
            }
            ViewMode::Overview => self.enter_focus(user).await?,
        }
        Ok(self.view.mode())
    }

    async fn enter_focus(&mut self, user: UserId) -> Result<(), BoardError> {
        self.arbiter.request_editor_focus(user).await?;
        let scope = self.view.focus(user);
        self.events.push(BoardEvent::RoleStateChanged { roles: self.arbiter.roles() });
        if let Some(scope) = scope {
            self.events.push(BoardEvent::VisibilityChanged { panes: self.panes() });
            self.reload_scope(scope).await?;
        }
        Ok(())
    }

    async fn leave_focus(&mut self) -> Result<(), BoardError> {
        self.arbiter.release_editor_focus().await?;
        self.events.push(BoardEvent::RoleStateChanged { roles: self.arbiter.roles() });
        if let Some((_, scope)) = self.view.release() {
            self.events.push(BoardEvent::VisibilityChanged { panes: self.panes() });
            self.reload_scope(scope).await?;
        }
        Ok(())
    }

    async fn resume_inner(&mut self) -> Result<Option<UserId>, BoardError> {
        self.ensure_available()?;
        let Some(user) = self.arbiter.fetch_last_editor().await? else {
            debug!("resume requested with no last editor");
            return Ok(None);
        };
        if self.view.mode() != ViewMode::Focused(user) {
            self.toggle_inner(user).await?;
        }
        Ok(Some(user))
    }

    async fn refresh_inner(&mut self) -> Result<(), BoardError> {
        let before = self.arbiter.roles();
        let roles = self.arbiter.refresh().await?;
        if roles != before {
            self.events.push(BoardEvent::RoleStateChanged { roles });
        }
        if roles.leader_id != before.leader_id {
            self.events.push(BoardEvent::DeliverableChanged { deliverable: self.arbiter.deliverable().cloned() });
        }
        if self.view.reconcile(roles.editor_id).is_some() {
            self.events.push(BoardEvent::VisibilityChanged { panes: self.panes() });
        }
        let scope = match self.view.mode() {
            ViewMode::Focused(user) => RefreshScope::Pane(user),
            ViewMode::Overview => RefreshScope::All,
        };
        self.reload_scope(scope).await
    }

    async fn scroll_horizontal_inner(&mut self, offset: i64) -> Result<i64, BoardError> {
        self.ensure_available()?;
        self.scroll.set_horizontal(offset);
        let current = self.scroll.horizontal_offset();
        self.store.set_horizontal_scroll_offset(current).await?;
        Ok(current)
    }

    async fn set_maximized_inner(&mut self, maximized: bool) -> Result<WindowState, BoardError> {
        self.ensure_available()?;
        self.store.set_window_maximized(maximized).await?;
        let stored = self.store.window_maximized().await?;
        if stored != maximized {
            debug!(requested = maximized, stored, "window flag overwritten by another process");
        }
        if self.maximized != stored {
            self.maximized = stored;
            self.invalidate_visible();
            self.fill_visible().await?;
        }
        Ok(self.window())
    }

    async fn resize_inner(&mut self) -> Result<(), BoardError> {
        self.ensure_available()?;
        self.invalidate_visible();
        self.fill_visible().await
    }

    async fn load_next_chunk_inner(&mut self, user: UserId) -> Result<usize, BoardError> {
        self.ensure_available()?;
        self.ensure_known(user)?;
        if !self.view.mode().is_overview() {
            debug!(%user, "scroll-to-end load skipped while focused");
            return Ok(0);
        }
        let Some(pane) = self.panes.get_mut(&user) else {
            return Ok(0);
        };
        let chunk = self.loader.load_chunk(pane, self.store.as_ref()).await?;
        let added = chunk.len();
        if added > 0 {
            self.events.push(BoardEvent::ChunkAppended { pane: user, items: chunk });
        }
        Ok(added)
    }

    // --- Helpers ---

    async fn reload_scope(&mut self, scope: RefreshScope) -> Result<(), BoardError> {
        let targets: Vec<UserId> = match scope {
            RefreshScope::All => self.panes.keys().copied().collect(),
            RefreshScope::Pane(user) => vec![user],
        };
        for user in targets {
            self.reload_pane(user).await?;
        }
        Ok(())
    }

    async fn reload_pane(&mut self, user: UserId) -> Result<(), BoardError> {
        let maximized = self.maximized;
        let Some(pane) = self.panes.get_mut(&user) else {
            return Ok(());
        };
        self.scroll.reset(user);
        self.events.push(BoardEvent::PaneCleared { pane: user });
        let chunks = self.loader.reload(pane, maximized, self.store.as_ref()).await?;
        self.events.extend(chunks.into_iter().map(|items| BoardEvent::ChunkAppended { pane: user, items }));
        Ok(())
    }

    fn invalidate_visible(&mut self) {
        for user in self.view.visible_panes() {
            if let Some(pane) = self.panes.get_mut(&user) {
                pane.invalidate();
            }
        }
    }

    async fn fill_visible(&mut self) -> Result<(), BoardError> {
        let maximized = self.maximized;
        for user in self.view.visible_panes() {
            let Some(pane) = self.panes.get_mut(&user) else {
                continue;
            };
            let chunks = self.loader.fill(pane, maximized, self.store.as_ref()).await?;
            self.events.extend(chunks.into_iter().map(|items| BoardEvent::ChunkAppended { pane: user, items }));
        }
        Ok(())
    }

    fn ensure_available(&self) -> Result<(), BoardError> {
        match self.arbiter.health() {
            StoreHealth::Unavailable(message) => Err(BoardError::StoreUnavailable(message.clone())),
            StoreHealth::Connected => Ok(()),
        }
    }

    fn ensure_known(&self, user: UserId) -> Result<(), BoardError> {
        if self.arbiter.is_known(user) {
            Ok(())
        } else {
            warn!(%user, "operation names a user outside the board");
            Err(BoardError::InvalidRoleTarget(user))
        }
    }

    /// Route every store failure into degraded mode.
    fn settle<T>(&mut self, result: Result<T, BoardError>) -> Result<T, BoardError> {
        if let Err(BoardError::StoreUnavailable(message)) = &result {
            self.enter_degraded(message.clone());
        }
        result
    }

    fn enter_degraded(&mut self, message: String) {
        self.arbiter.degrade(&message);
        self.users.clear();
        self.panes.clear();
        self.view = ViewCoordinator::default();
        self.scroll = ScrollSynchronizer::new();
        self.maximized = false;
        if !self.degraded {
            self.degraded = true;
            self.events.push(BoardEvent::StoreUnavailable { message });
        }
    }
}
