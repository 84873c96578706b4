//! Configuration schema.
//!
//! Hierarchy: `Config` → `ProvidersConfig`, `ModelsConfig`, `DispatchConfig`,
//! `StoreConfig`, `GatewayConfig`, `ThrottleConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.
//! We use `#[serde(rename_all = "camelCase")]` to handle the conversion.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Text returned to the user when no provider produced anything usable.
pub const DEFAULT_APOLOGY: &str =
    "Xin lỗi, KairoAI đang quá tải nên chưa trả lời được. Bạn thử lại sau ít phút nhé.";

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration: loaded from `~/.kairo/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub providers: ProvidersConfig,
    pub models: ModelsConfig,
    pub dispatch: DispatchConfig,
    pub store: StoreConfig,
    pub gateway: GatewayConfig,
    pub throttle: ThrottleConfig,
}

// ─────────────────────────────────────────────
// Providers
// ─────────────────────────────────────────────

/// One provider account pool: a vendor plus an ordered list of API keys.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    /// Registry name of the vendor (e.g. `"groq"`, `"openrouter"`).
    pub provider: String,
    /// API keys, tried in order.
    pub api_keys: Vec<String>,
    /// Custom API base URL (overrides the registry default).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Extra HTTP headers to send with each request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_headers: Option<HashMap<String, String>>,
}

impl ProviderConfig {
    fn named(provider: &str) -> Self {
        Self {
            provider: provider.to_string(),
            ..Default::default()
        }
    }

    /// Keys that are not blank, in configured order.
    pub fn usable_keys(&self) -> impl Iterator<Item = &str> {
        self.api_keys
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
    }

    /// Whether at least one non-blank key is configured.
    pub fn is_configured(&self) -> bool {
        self.usable_keys().next().is_some()
    }
}

/// Provider pools for both modes.
///
/// Text mode: `primary` keys, then the `escalation` vendor.
/// Vision mode: `primary` keys, then `vision_reserve_key` on the primary vendor.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProvidersConfig {
    pub primary: ProviderConfig,
    pub escalation: ProviderConfig,
    /// Extra primary-vendor key held back for vision escalation.
    pub vision_reserve_key: String,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            primary: ProviderConfig::named("groq"),
            escalation: ProviderConfig::named("openrouter"),
            vision_reserve_key: String::new(),
        }
    }
}

// ─────────────────────────────────────────────
// Models
// ─────────────────────────────────────────────

/// Model identifiers and sampling parameters per mode.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelsConfig {
    /// Chat model on the primary vendor.
    pub chat: String,
    /// Vision model on the primary vendor.
    pub vision: String,
    /// Chat model on the escalation vendor.
    pub escalation_chat: String,
    pub chat_temperature: f64,
    pub vision_temperature: f64,
    /// Maximum tokens to generate; 0 leaves it to the provider.
    pub max_tokens: u32,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            chat: "llama-3.3-70b-versatile".to_string(),
            vision: "meta-llama/llama-4-scout-17b-16e-instruct".to_string(),
            escalation_chat: "meta-llama/llama-3.3-70b-instruct".to_string(),
            chat_temperature: 0.3,
            vision_temperature: 0.1,
            max_tokens: 2048,
        }
    }
}

// ─────────────────────────────────────────────
// Dispatch
// ─────────────────────────────────────────────

/// Fallback dispatcher settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DispatchConfig {
    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
    /// Returned verbatim when every provider failed.
    pub apology_text: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            apology_text: DEFAULT_APOLOGY.to_string(),
        }
    }
}

// ─────────────────────────────────────────────
// Store
// ─────────────────────────────────────────────

/// Firestore service-account settings. Sync is disabled unless
/// `project_id`, `client_email` and `private_key` are all set.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreConfig {
    pub project_id: String,
    pub client_email: String,
    /// PEM-encoded RSA key.
    pub private_key: String,
    pub token_uri: String,
    /// Firestore REST base URL.
    pub api_base: String,
}

impl StoreConfig {
    pub fn is_configured(&self) -> bool {
        !self.project_id.is_empty() && !self.client_email.is_empty() && !self.private_key.is_empty()
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            client_email: String::new(),
            private_key: String::new(),
            token_uri: "https://oauth2.googleapis.com/token".to_string(),
            api_base: "https://firestore.googleapis.com/v1".to_string(),
        }
    }
}

// ─────────────────────────────────────────────
// Gateway
// ─────────────────────────────────────────────

/// HTTP listener settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

// ─────────────────────────────────────────────
// Throttle
// ─────────────────────────────────────────────

/// Night-time chat throttle. Local time is UTC + `utc_offset_hours`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThrottleConfig {
    pub utc_offset_hours: i32,
    /// First hour of the night window (inclusive).
    pub night_start_hour: u32,
    /// First hour of the day window (inclusive).
    pub night_end_hour: u32,
    /// Minimum gap between two messages from one user at night.
    pub min_interval_secs: i64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            utc_offset_hours: 7,
            night_start_hour: 23,
            night_end_hour: 7,
            min_interval_secs: 60,
        }
    }
}
