//! Postgres implementation of the shared store.
//!
//! Role ids live in the single `role_state` row and window geometry in the
//! single `window_state` row; both rows are seeded by the migration. "Nobody"
//! is stored as `0` and read back as `None`. Every query error maps to
//! `StoreError::Unavailable`.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use async_trait::async_trait;
use board::{Deliverable, Item, SharedStateStore, StoreError, TimeSpent, User, UserId};
use sqlx::PgPool;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RoleColumn {
    Leader,
    Editor,
    LastEditor,
}

impl RoleColumn {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Leader => "leader_id",
            Self::Editor => "editor_id",
            Self::LastEditor => "last_editor_id",
        }
    }

    fn select_sql(self) -> String {
        format!("SELECT {} FROM role_state WHERE id = 1", self.as_str())
    }

    fn update_sql(self) -> String {
        format!("UPDATE role_state SET {} = $1 WHERE id = 1", self.as_str())
    }
}

type ItemRow = (i64, i32, String, String);

/// Build an item from a stored row. Rows with a negative index are dropped.
pub(crate) fn row_to_item(user: UserId, (id, row_index, description, time_spent): ItemRow) -> Option<Item> {
    let Ok(row_index) = usize::try_from(row_index) else {
        warn!(%user, id, row_index, "stored item has a negative row index; skipped");
        return None;
    };
    Some(Item { id, user_id: user, description, time_spent: TimeSpent::from_label(&time_spent), row_index })
}

fn unavailable(err: sqlx::Error) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

fn saturating_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

// =============================================================================
// PG STORE
// =============================================================================

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn role(&self, column: RoleColumn) -> Result<Option<UserId>, StoreError> {
        let raw = sqlx::query_scalar::<_, i64>(&column.select_sql())
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)?;
        Ok(raw.and_then(UserId::from_raw))
    }

    async fn set_role(&self, column: RoleColumn, id: Option<UserId>) -> Result<(), StoreError> {
        sqlx::query(&column.update_sql())
            .bind(UserId::raw_or_zero(id))
            .execute(&self.pool)
            .await
            .map_err(unavailable)?;
        Ok(())
    }
}

#[async_trait]
impl SharedStateStore for PgStore {
    async fn current_leader_id(&self) -> Result<Option<UserId>, StoreError> {
        self.role(RoleColumn::Leader).await
    }

    async fn set_current_leader_id(&self, id: UserId) -> Result<(), StoreError> {
        self.set_role(RoleColumn::Leader, Some(id)).await
    }

    async fn current_editor_id(&self) -> Result<Option<UserId>, StoreError> {
        self.role(RoleColumn::Editor).await
    }

    async fn set_current_editor_id(&self, id: Option<UserId>) -> Result<(), StoreError> {
        self.set_role(RoleColumn::Editor, id).await
    }

    async fn last_editor_id(&self) -> Result<Option<UserId>, StoreError> {
        self.role(RoleColumn::LastEditor).await
    }

    async fn set_last_editor_id(&self, id: UserId) -> Result<(), StoreError> {
        self.set_role(RoleColumn::LastEditor, Some(id)).await
    }

    async fn deliverable(&self, leader: UserId) -> Result<Option<Deliverable>, StoreError> {
        let row = sqlx::query_as::<_, (i64, String)>("SELECT number, text FROM deliverables WHERE user_id = $1")
            .bind(leader.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)?;
        Ok(row.map(|(number, text)| Deliverable { number, text }))
    }

    async fn window_maximized(&self) -> Result<bool, StoreError> {
        let maximized = sqlx::query_scalar::<_, bool>("SELECT maximized FROM window_state WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)?;
        Ok(maximized.unwrap_or(false))
    }

    async fn set_window_maximized(&self, maximized: bool) -> Result<(), StoreError> {
        sqlx::query("UPDATE window_state SET maximized = $1 WHERE id = 1")
            .bind(maximized)
            .execute(&self.pool)
            .await
            .map_err(unavailable)?;
        Ok(())
    }

    async fn horizontal_scroll_offset(&self) -> Result<i64, StoreError> {
        let offset = sqlx::query_scalar::<_, i64>("SELECT horizontal_scroll_offset FROM window_state WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)?;
        Ok(offset.unwrap_or(0))
    }

    async fn set_horizontal_scroll_offset(&self, offset: i64) -> Result<(), StoreError> {
        sqlx::query("UPDATE window_state SET horizontal_scroll_offset = $1 WHERE id = 1")
            .bind(offset)
            .execute(&self.pool)
            .await
            .map_err(unavailable)?;
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query_as::<_, (i64, String)>("SELECT id, display_name FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(unavailable)?;
        Ok(rows
            .into_iter()
            .filter_map(|(raw, display_name)| UserId::from_raw(raw).map(|id| User { id, display_name }))
            .collect())
    }

    async fn item_rows(&self, user: UserId, first_row: usize, count: usize) -> Result<Vec<Item>, StoreError> {
        let first = saturating_i64(first_row);
        let end = first.saturating_add(saturating_i64(count));
        let rows = sqlx::query_as::<_, ItemRow>(
            "SELECT id, row_index, description, time_spent FROM items \
             WHERE user_id = $1 AND row_index >= $2 AND row_index < $3 ORDER BY row_index",
        )
        .bind(user.get())
        .bind(first)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable)?;
        Ok(rows.into_iter().filter_map(|row| row_to_item(user, row)).collect())
    }
}

// =============================================================================
// OFFLINE STORE
// =============================================================================

/// A store that was never reachable. Every call fails with the setup error.
#[derive(Debug, Clone)]
pub struct OfflineStore {
    message: String,
}

impl OfflineStore {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    fn fail<T>(&self) -> Result<T, StoreError> {
        Err(StoreError::Unavailable(self.message.clone()))
    }
}

#[async_trait]
impl SharedStateStore for OfflineStore {
    async fn current_leader_id(&self) -> Result<Option<UserId>, StoreError> {
        self.fail()
    }

    async fn set_current_leader_id(&self, _id: UserId) -> Result<(), StoreError> {
        self.fail()
    }

    async fn current_editor_id(&self) -> Result<Option<UserId>, StoreError> {
        self.fail()
    }

    async fn set_current_editor_id(&self, _id: Option<UserId>) -> Result<(), StoreError> {
        self.fail()
    }

    async fn last_editor_id(&self) -> Result<Option<UserId>, StoreError> {
        self.fail()
    }

    async fn set_last_editor_id(&self, _id: UserId) -> Result<(), StoreError> {
        self.fail()
    }

    async fn deliverable(&self, _leader: UserId) -> Result<Option<Deliverable>, StoreError> {
        self.fail()
    }

    async fn window_maximized(&self) -> Result<bool, StoreError> {
        self.fail()
    }

    async fn set_window_maximized(&self, _maximized: bool) -> Result<(), StoreError> {
        self.fail()
    }

    async fn horizontal_scroll_offset(&self) -> Result<i64, StoreError> {
        self.fail()
    }

    async fn set_horizontal_scroll_offset(&self, _offset: i64) -> Result<(), StoreError> {
        self.fail()
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        self.fail()
    }

    async fn item_rows(&self, _user: UserId, _first_row: usize, _count: usize) -> Result<Vec<Item>, StoreError> {
        self.fail()
    }
}
