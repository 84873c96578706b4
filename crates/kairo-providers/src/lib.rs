//! LLM provider layer for Kairo.
//!
//! # Architecture
//!
//! - [`traits::CompletionProvider`]: one credential able to serve one call
//! - [`http_provider::HttpProvider`]: generic OpenAI-compatible HTTP client
//! - [`classify`]: maps HTTP/transport failures to rate-limit vs. other
//! - [`dispatcher::FallbackDispatcher`]: ordered fallback with one escalation
//! - [`registry`]: static specs for the supported vendors

pub mod classify;
pub mod dispatcher;
pub mod http_provider;
pub mod registry;
pub mod traits;

// Re-export main types for convenience
pub use classify::{is_rate_limit_failure, ProviderFailure};
pub use dispatcher::{FallbackDispatcher, ModeRoute};
pub use http_provider::HttpProvider;
pub use registry::{find_by_name, ProviderSpec, PROVIDERS};
pub use traits::{CompletionProvider, LlmRequestConfig};
