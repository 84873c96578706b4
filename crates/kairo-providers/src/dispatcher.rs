//! Fallback dispatcher: tries credentials in order and escalates once when
//! every attempted one was rate limited.
//!
//! `get_completion` never fails toward the caller: if nothing produced text
//! it returns the configured apology string.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use kairo_core::config::{Config, ProviderConfig};
use kairo_core::types::{CompletionMode, CompletionOutcome, CompletionRequest};

use crate::http_provider::{build_http_client, HttpProvider};
use crate::registry::{find_by_name, ProviderSpec};
use crate::traits::{CompletionProvider, LlmRequestConfig};

/// Fallback spec for vendors the registry does not know.
static CUSTOM_SPEC: ProviderSpec = ProviderSpec {
    name: "custom",
    display_name: "Custom",
    default_api_base: "https://api.openai.com/v1",
    supports_vision: true,
};

// ─────────────────────────────────────────────
// ModeRoute: candidates for one mode
// ─────────────────────────────────────────────

/// Ordered primary candidates plus the optional escalation target.
#[derive(Clone, Default)]
pub struct ModeRoute {
    pub primaries: Vec<Arc<dyn CompletionProvider>>,
    pub escalation: Option<Arc<dyn CompletionProvider>>,
}

impl ModeRoute {
    pub fn new(
        primaries: Vec<Arc<dyn CompletionProvider>>,
        escalation: Option<Arc<dyn CompletionProvider>>,
    ) -> Self {
        Self {
            primaries,
            escalation,
        }
    }
}

/// Tally of one pass over the primary candidates.
#[derive(Debug, Default, PartialEq)]
struct AttemptTally {
    attempted: usize,
    rate_limited: usize,
    other: usize,
}

impl AttemptTally {
    /// Escalate only when something was tried and all of it hit a rate limit.
    fn should_escalate(&self) -> bool {
        self.attempted > 0 && self.other == 0
    }
}

// ─────────────────────────────────────────────
// FallbackDispatcher
// ─────────────────────────────────────────────

pub struct FallbackDispatcher {
    text: ModeRoute,
    vision: ModeRoute,
    apology_text: String,
}

impl FallbackDispatcher {
    pub fn new(text: ModeRoute, vision: ModeRoute, apology_text: impl Into<String>) -> Self {
        Self {
            text,
            vision,
            apology_text: apology_text.into(),
        }
    }

    /// Build both routes from configuration.
    ///
    /// Text: every usable primary key on `models.chat`, escalating to the
    /// first usable key of the escalation vendor on `models.escalationChat`.
    /// Vision: every usable primary key on `models.vision`, escalating to
    /// `visionReserveKey` on the primary vendor.
    pub fn from_config(config: &Config) -> Self {
        let client = build_http_client(Duration::from_secs(config.dispatch.timeout_secs));
        let models = &config.models;
        let max_tokens = (models.max_tokens > 0).then_some(models.max_tokens);

        let chat_params = LlmRequestConfig {
            max_tokens,
            temperature: models.chat_temperature,
        };
        let vision_params = LlmRequestConfig {
            max_tokens,
            temperature: models.vision_temperature,
        };

        let primary = &config.providers.primary;
        let escalation = &config.providers.escalation;

        let text_primaries = build_pool(&client, primary, &models.chat, &chat_params);
        let text_escalation = escalation
            .usable_keys()
            .next()
            .map(|key| build_one(&client, escalation, key, &models.escalation_chat, &chat_params, None));

        let primary_spec = resolve_spec(primary);
        let vision_primaries = if primary_spec.supports_vision {
            build_pool(&client, primary, &models.vision, &vision_params)
        } else {
            warn!(
                provider = primary_spec.display_name,
                "Primary provider does not accept images, vision route disabled"
            );
            Vec::new()
        };
        let reserve = config.providers.vision_reserve_key.trim();
        let vision_escalation = (primary_spec.supports_vision && !reserve.is_empty()).then(|| {
            build_one(
                &client,
                primary,
                reserve,
                &models.vision,
                &vision_params,
                Some("reserve".to_string()),
            )
        });

        info!(
            text_candidates = text_primaries.len(),
            text_escalation = text_escalation.is_some(),
            vision_candidates = vision_primaries.len(),
            vision_escalation = vision_escalation.is_some(),
            "Dispatcher ready"
        );

        Self::new(
            ModeRoute::new(text_primaries, text_escalation),
            ModeRoute::new(vision_primaries, vision_escalation),
            config.dispatch.apology_text.clone(),
        )
    }

    /// The string returned when every provider failed.
    pub fn apology_text(&self) -> &str {
        &self.apology_text
    }

    /// Number of (primary, escalation) candidates for a mode.
    pub fn candidate_counts(&self, mode: CompletionMode) -> (usize, bool) {
        let route = self.route(mode);
        (route.primaries.len(), route.escalation.is_some())
    }

    fn route(&self, mode: CompletionMode) -> &ModeRoute {
        match mode {
            CompletionMode::Text => &self.text,
            CompletionMode::Vision => &self.vision,
        }
    }

    /// Get raw completion text for `request`, or the apology string.
    pub async fn get_completion(&self, request: &CompletionRequest) -> String {
        let route = self.route(request.mode);
        let mut tally = AttemptTally::default();

        for provider in &route.primaries {
            match provider.complete(request).await {
                CompletionOutcome::Success(text) if !text.trim().is_empty() => {
                    debug!(provider = provider.display_name(), mode = %request.mode, "Completion served");
                    return text;
                }
                CompletionOutcome::Success(_) | CompletionOutcome::OtherFailure => {
                    tally.attempted += 1;
                    tally.other += 1;
                }
                CompletionOutcome::RateLimited => {
                    tally.attempted += 1;
                    tally.rate_limited += 1;
                }
                CompletionOutcome::NoCredential => {
                    debug!(provider = provider.display_name(), "Skipping candidate without credential");
                }
            }
        }

        if tally.should_escalate() {
            if let Some(escalation) = &route.escalation {
                info!(
                    mode = %request.mode,
                    rate_limited = tally.rate_limited,
                    target = escalation.display_name(),
                    "All candidates rate limited, escalating"
                );
                if let CompletionOutcome::Success(text) = escalation.complete(request).await {
                    if !text.trim().is_empty() {
                        return text;
                    }
                }
            }
        }

        warn!(
            mode = %request.mode,
            attempted = tally.attempted,
            rate_limited = tally.rate_limited,
            other = tally.other,
            "No provider produced a completion"
        );
        self.apology_text.clone()
    }
}

/// One `HttpProvider` per usable key, in configured order.
fn build_pool(
    client: &reqwest::Client,
    pool: &ProviderConfig,
    model: &str,
    params: &LlmRequestConfig,
) -> Vec<Arc<dyn CompletionProvider>> {
    pool.usable_keys()
        .enumerate()
        .map(|(i, key)| build_one(client, pool, key, model, params, Some(format!("#{}", i + 1))))
        .collect()
}

/// Registry spec for the pool's vendor, or the OpenAI-compatible fallback.
fn resolve_spec(pool: &ProviderConfig) -> &'static ProviderSpec {
    find_by_name(&pool.provider).unwrap_or_else(|| {
        if pool.api_base.is_none() {
            warn!(provider = %pool.provider, "Unknown provider without apiBase, assuming OpenAI endpoint");
        }
        &CUSTOM_SPEC
    })
}

fn build_one(
    client: &reqwest::Client,
    pool: &ProviderConfig,
    key: &str,
    model: &str,
    params: &LlmRequestConfig,
    suffix: Option<String>,
) -> Arc<dyn CompletionProvider> {
    let spec = resolve_spec(pool);
    let label = match suffix {
        Some(suffix) => format!("{}{}", spec.display_name, suffix),
        None => spec.display_name.to_string(),
    };
    Arc::new(
        HttpProvider::new(spec, key, model)
            .with_client(client.clone())
            .with_api_base(pool.api_base.as_deref())
            .with_extra_headers(pool.extra_headers.as_ref())
            .with_request_config(params.clone())
            .with_label(label),
    )
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
