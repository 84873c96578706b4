//! Schedule persistence for Kairo.
//!
//! - [`ScheduleStore`]: replace a user's whole timetable in one write
//! - [`FirestoreStore`]: Firestore REST client authenticated as a service account
//! - [`MemoryStore`]: in-process store for tests and offline runs
//! - [`StoreHandle`]: lazily built, optional store shared by the server

pub mod firestore;
pub mod handle;
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use kairo_core::types::ScheduleEntry;

pub use firestore::FirestoreStore;
pub use handle::StoreHandle;
pub use memory::MemoryStore;

/// Errors from a schedule store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid user id: {0:?}")]
    InvalidUserId(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("invalid API base {0:?}")]
    InvalidApiBase(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// Persistent per-user schedule storage.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Delete every stored entry for `user_id` and write `entries` instead.
    async fn replace_all(&self, user_id: &str, entries: &[ScheduleEntry])
        -> Result<(), StoreError>;

    /// Display name for logging.
    fn display_name(&self) -> &str;

    /// Remove every entry for `user_id`.
    async fn clear_all(&self, user_id: &str) -> Result<(), StoreError> {
        self.replace_all(user_id, &[]).await
    }
}

/// Reject ids that cannot be a single document path segment.
pub(crate) fn validate_user_id(user_id: &str) -> Result<(), StoreError> {
    if user_id.trim().is_empty() || user_id.contains('/') || user_id == "." || user_id == ".." {
        return Err(StoreError::InvalidUserId(user_id.to_string()));
    }
    Ok(())
}
