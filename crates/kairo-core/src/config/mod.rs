//! Configuration system: schema, loading, and env var overrides.
//!
//! # Usage
//! ```no_run
//! use kairo_core::config;
//!
//! let cfg = config::load_config(None);
//! println!("Chat model: {}", cfg.models.chat);
//! ```

pub mod loader;
pub mod schema;

// Re-export key types
pub use loader::{get_config_path, load_config};
pub use schema::{
    Config, DispatchConfig, GatewayConfig, ModelsConfig, ProviderConfig, ProvidersConfig,
    StoreConfig, ThrottleConfig, DEFAULT_APOLOGY,
};
