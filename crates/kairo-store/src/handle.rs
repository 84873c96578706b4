//! Lazily initialized, optional schedule store.
//!
//! The first request that needs the store builds it from config. Missing or
//! broken credentials leave the handle disabled for the life of the process;
//! requests keep working, they just report that nothing was synced.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{info, warn};

use kairo_core::config::StoreConfig;
use kairo_core::types::ScheduleEntry;

use crate::firestore::FirestoreStore;
use crate::ScheduleStore;

pub struct StoreHandle {
    config: StoreConfig,
    store: OnceCell<Option<Arc<dyn ScheduleStore>>>,
}

impl StoreHandle {
    /// A handle that builds a Firestore client from `config` on first use.
    pub fn from_config(config: StoreConfig) -> Self {
        Self {
            config,
            store: OnceCell::new(),
        }
    }

    /// A handle around an already built store.
    pub fn with_store(store: Arc<dyn ScheduleStore>) -> Self {
        Self {
            config: StoreConfig::default(),
            store: OnceCell::new_with(Some(Some(store))),
        }
    }

    /// A handle that never syncs.
    pub fn disabled() -> Self {
        Self {
            config: StoreConfig::default(),
            store: OnceCell::new_with(Some(None)),
        }
    }

    /// The store, building it on first call. `None` when sync is disabled.
    pub async fn get(&self) -> Option<Arc<dyn ScheduleStore>> {
        self.store
            .get_or_init(|| async { self.build() })
            .await
            .clone()
    }

    fn build(&self) -> Option<Arc<dyn ScheduleStore>> {
        if !self.config.is_configured() {
            info!(
                project_id = !self.config.project_id.is_empty(),
                client_email = !self.config.client_email.is_empty(),
                private_key = !self.config.private_key.is_empty(),
                "Firestore credentials incomplete, schedule sync disabled"
            );
            return None;
        }
        match FirestoreStore::new(&self.config) {
            Ok(store) => {
                info!(project_id = %self.config.project_id, "Firestore schedule store ready");
                Some(Arc::new(store))
            }
            Err(e) => {
                warn!(error = %e, "Firestore init failed, schedule sync disabled");
                None
            }
        }
    }

    /// Replace the user's stored schedule. Returns whether the write happened.
    pub async fn sync(&self, user_id: &str, entries: &[ScheduleEntry]) -> bool {
        let Some(store) = self.get().await else {
            return false;
        };
        match store.replace_all(user_id, entries).await {
            Ok(()) => true,
            Err(e) => {
                warn!(store = store.display_name(), user_id, error = %e, "Schedule sync failed");
                false
            }
        }
    }

    /// Remove every stored entry for the user. Returns whether the write happened.
    pub async fn clear_all(&self, user_id: &str) -> bool {
        self.sync(user_id, &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    #[tokio::test]
    async fn test_unconfigured_handle_is_disabled() {
        let handle = StoreHandle::from_config(StoreConfig::default());
        assert!(handle.get().await.is_none());
        assert!(!handle.sync("u1", &[]).await);
    }

    #[tokio::test]
    async fn test_bad_key_disables_sync() {
        let handle = StoreHandle::from_config(StoreConfig {
            project_id: "demo".into(),
            client_email: "svc@demo.iam.gserviceaccount.com".into(),
            private_key: "garbage".into(),
            ..Default::default()
        });
        assert!(handle.get().await.is_none());
    }

    #[tokio::test]
    async fn test_sync_with_memory_store() {
        let memory = Arc::new(MemoryStore::new());
        let handle = StoreHandle::with_store(memory.clone());

        let entries = vec![ScheduleEntry {
            name: "Toán".into(),
            ..Default::default()
        }];
        assert!(handle.sync("u1", &entries).await);
        assert_eq!(memory.get("u1").await, entries);

        assert!(handle.clear_all("u1").await);
        assert!(memory.get("u1").await.is_empty());
    }

    #[tokio::test]
    async fn test_store_error_reports_false() {
        let handle = StoreHandle::with_store(Arc::new(MemoryStore::new()));
        assert!(!handle.sync("bad/id", &[]).await);
    }

    #[tokio::test]
    async fn test_disabled_handle() {
        let handle = StoreHandle::disabled();
        assert!(!handle.clear_all("u1").await);
    }
}
