//! Shared application state.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use kairo_core::config::Config;
use kairo_providers::FallbackDispatcher;
use kairo_store::StoreHandle;

use crate::throttle::ChatThrottle;

/// Source of the current instant.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<FallbackDispatcher>,
    pub store: Arc<StoreHandle>,
    pub throttle: Arc<ChatThrottle>,
    pub clock: Clock,
}

impl AppState {
    pub fn new(dispatcher: FallbackDispatcher, store: StoreHandle, throttle: ChatThrottle) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            store: Arc::new(store),
            throttle: Arc::new(throttle),
            clock: Arc::new(Utc::now),
        }
    }

    /// Build every component from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            FallbackDispatcher::from_config(config),
            StoreHandle::from_config(config.store.clone()),
            ChatThrottle::new(config.throttle.clone()),
        )
    }

    /// Replace the clock (tests pin the time of day).
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }
}
