//! Board data model: users, role state, deliverables, items, and panes.
//!
//! Ids follow the shared store's convention: valid user ids are `>= 1`, and a
//! raw editor id `<= 0` means "nobody is editing" (overview mode). Inside the
//! crate that encoding is lifted into `Option<UserId>` as soon as a value
//! leaves the store.

#[cfg(test)]
#[path = "model_test.rs"]
mod model_test;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a board user. Always `>= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Lift a raw store value into an id. Values `<= 0` mean "none".
    #[must_use]
    pub fn from_raw(raw: i64) -> Option<Self> {
        (raw >= 1).then_some(Self(raw))
    }

    /// Raw integer as stored.
    #[must_use]
    pub fn get(self) -> i64 {
        self.0
    }

    /// Raw encoding of an optional id, with `0` standing in for "none".
    #[must_use]
    pub fn raw_or_zero(id: Option<Self>) -> i64 {
        id.map_or(0, Self::get)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A board participant. The set is fixed for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub display_name: String,
}

/// Leader and editor assignment shared by every client through the store.
///
/// A user may hold both roles, one, or neither. A cached copy is only a
/// snapshot: another process may have overwritten the store since it was read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleState {
    pub leader_id: Option<UserId>,
    pub editor_id: Option<UserId>,
    pub last_editor_id: Option<UserId>,
}

impl RoleState {
    #[must_use]
    pub fn is_leader(&self, user: UserId) -> bool {
        self.leader_id == Some(user)
    }

    #[must_use]
    pub fn is_editor(&self, user: UserId) -> bool {
        self.editor_id == Some(user)
    }
}

/// The leader's current deliverable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deliverable {
    pub number: i64,
    pub text: String,
}

impl Deliverable {
    /// Banner text shown above the board.
    #[must_use]
    pub fn label(&self) -> String {
        format!("Deliverable #{}: {}", self.number, self.text)
    }
}

/// Enumerated time spent on an item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeSpent {
    #[default]
    #[serde(rename = "")]
    Unset,
    #[serde(rename = "0:15")]
    Quarter,
    #[serde(rename = "0:30")]
    Half,
    #[serde(rename = "0:45")]
    ThreeQuarters,
    #[serde(rename = "1:00")]
    One,
    #[serde(rename = "1:30")]
    OneAndHalf,
    #[serde(rename = "2:00")]
    Two,
    #[serde(rename = "3:00")]
    Three,
    #[serde(rename = "4:00")]
    Four,
}

impl TimeSpent {
    pub const ALL: [Self; 9] = [
        Self::Unset,
        Self::Quarter,
        Self::Half,
        Self::ThreeQuarters,
        Self::One,
        Self::OneAndHalf,
        Self::Two,
        Self::Three,
        Self::Four,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unset => "",
            Self::Quarter => "0:15",
            Self::Half => "0:30",
            Self::ThreeQuarters => "0:45",
            Self::One => "1:00",
            Self::OneAndHalf => "1:30",
            Self::Two => "2:00",
            Self::Three => "3:00",
            Self::Four => "4:00",
        }
    }

    /// Parse a stored label. Unknown labels read as [`TimeSpent::Unset`].
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        Self::ALL.into_iter().find(|t| t.as_str() == label).unwrap_or_default()
    }

    /// Duration in minutes.
    #[must_use]
    pub fn minutes(self) -> u32 {
        match self {
            Self::Unset => 0,
            Self::Quarter => 15,
            Self::Half => 30,
            Self::ThreeQuarters => 45,
            Self::One => 60,
            Self::OneAndHalf => 90,
            Self::Two => 120,
            Self::Three => 180,
            Self::Four => 240,
        }
    }
}

/// One row in a user's pane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub user_id: UserId,
    pub description: String,
    pub time_spent: TimeSpent,
    pub row_index: usize,
}

impl Item {
    /// An empty row for a slot the store holds no content for.
    #[must_use]
    pub fn blank(user_id: UserId, row_index: usize) -> Self {
        Self {
            id: i64::try_from(row_index).map_or(i64::MAX, |i| i + 1),
            user_id,
            description: String::new(),
            time_spent: TimeSpent::Unset,
            row_index,
        }
    }
}

/// Visibility tag carried by every per-user element of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaneKind {
    /// The selector strip entry with the user's name, leader and edit controls.
    UserRow,
    /// The column header row above the user's items.
    HeaderRow,
    /// The scrollable list of the user's items.
    ItemPane,
}

impl PaneKind {
    pub const ALL: [Self; 3] = [Self::UserRow, Self::HeaderRow, Self::ItemPane];
}

/// Read-only projection of one user's pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pane {
    pub user_id: UserId,
    pub visible: bool,
    pub vertical_offset: i64,
    pub loaded_chunks: usize,
    pub total_rows: usize,
}

/// Window geometry persisted across restarts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowState {
    pub maximized: bool,
    pub horizontal_scroll_offset: i64,
}
