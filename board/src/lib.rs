//! Session coordination core for the shared logging board.
//!
//! Several users each keep a list of time-tracked items. Everyone sees every
//! list, but at most one user holds edit focus at a time. This crate owns the
//! rules for who leads and who edits, the visibility projection that follows
//! from those roles, vertical scroll sync across panes, and the chunked
//! materialization of item rows. Persistence is delegated to a
//! [`store::SharedStateStore`]; presentation is left to whoever drains the
//! [`session::BoardEvent`] outbox.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`session`] | The single actor wiring every component together |
//! | [`roles`] | Leader/editor arbitration and the cached [`model::RoleState`] |
//! | [`view`] | Overview vs. focused visibility projection |
//! | [`scroll`] | Vertical scroll sync and the horizontal selector offset |
//! | [`chunks`] | Fill policy and the per-user [`chunks::ItemsPane`] |
//! | [`store`] | The store contract plus an in-memory implementation |
//! | [`model`] | Users, roles, items, panes, and window state |
//! | [`error`] | Session-level error kinds |
//! | [`consts`] | Chunk sizes, fill targets, and column headers |

pub mod chunks;
pub mod consts;
pub mod error;
pub mod model;
pub mod roles;
pub mod scroll;
pub mod session;
pub mod store;
pub mod view;

pub use error::BoardError;
pub use model::{Deliverable, Item, Pane, PaneKind, RoleState, TimeSpent, User, UserId, WindowState};
pub use session::{BoardEvent, BoardSnapshot, Session};
pub use store::{MemoryStore, SharedStateStore, StoreError};
