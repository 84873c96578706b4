//! In-memory schedule store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use kairo_core::types::ScheduleEntry;

use crate::{validate_user_id, ScheduleStore, StoreError};

/// Keeps each user's schedule in a map. Counts writes so callers can assert
/// whether a sync happened.
#[derive(Debug, Default)]
pub struct MemoryStore {
    schedules: Mutex<HashMap<String, Vec<ScheduleEntry>>>,
    writes: Mutex<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current schedule for `user_id` (empty if never written).
    pub async fn get(&self, user_id: &str) -> Vec<ScheduleEntry> {
        self.schedules
            .lock()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of successful `replace_all` calls.
    pub async fn write_count(&self) -> usize {
        *self.writes.lock().await
    }
}

#[async_trait]
impl ScheduleStore for MemoryStore {
    async fn replace_all(
        &self,
        user_id: &str,
        entries: &[ScheduleEntry],
    ) -> Result<(), StoreError> {
        validate_user_id(user_id)?;
        self.schedules
            .lock()
            .await
            .insert(user_id.to_string(), entries.to_vec());
        *self.writes.lock().await += 1;
        Ok(())
    }

    fn display_name(&self) -> &str {
        "memory"
    }
}
