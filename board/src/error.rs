//! Session-level error kinds.
//!
//! ERROR HANDLING
//! ==============
//! A store failure is never retried per call. The session drops into a
//! degraded overview-only mode and every later operation fails fast with the
//! same `StoreUnavailable` until an explicit refresh reaches the store again.
//! Stale reads are not errors at all; last-write-wins makes them expected, and
//! `refresh` resolves them.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use crate::model::UserId;
use crate::store::StoreError;

/// Stable machine-readable code for an error, used by the HTTP layer.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("shared store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("user {0} is not on this board")]
    InvalidRoleTarget(UserId),
    #[error("user {0} cannot claim leadership while focused for editing")]
    LeaderLocked(UserId),
}

impl From<StoreError> for BoardError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(message) => Self::StoreUnavailable(message),
        }
    }
}

impl ErrorCode for BoardError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::StoreUnavailable(_) => "E_STORE_UNAVAILABLE",
            Self::InvalidRoleTarget(_) => "E_INVALID_ROLE_TARGET",
            Self::LeaderLocked(_) => "E_LEADER_LOCKED",
        }
    }
}

impl ErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "E_STORE_UNAVAILABLE",
        }
    }
}
