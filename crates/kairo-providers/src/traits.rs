//! Completion provider trait: the seam between the dispatcher and vendors.
//!
//! `HttpProvider` in `http_provider.rs` covers every OpenAI-compatible API.
//! Tests plug in scripted providers through the same trait.

use async_trait::async_trait;
use kairo_core::types::{CompletionOutcome, CompletionRequest};

/// Sampling parameters sent with each call.
#[derive(Clone, Debug)]
pub struct LlmRequestConfig {
    /// Maximum tokens to generate (`None` leaves it to the provider).
    pub max_tokens: Option<u32>,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
}

impl Default for LlmRequestConfig {
    fn default() -> Self {
        Self {
            max_tokens: None,
            temperature: 0.3,
        }
    }
}

/// One credential on one vendor, able to serve a completion.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Issue exactly one completion call.
    ///
    /// Never returns an error: failures are classified into
    /// [`CompletionOutcome::RateLimited`] or [`CompletionOutcome::OtherFailure`],
    /// and a blank credential yields [`CompletionOutcome::NoCredential`]
    /// without touching the network.
    async fn complete(&self, request: &CompletionRequest) -> CompletionOutcome;

    /// Display name for logging (never includes the key).
    fn display_name(&self) -> &str;
}
