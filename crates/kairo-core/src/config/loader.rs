//! Config loader: reads `~/.kairo/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.kairo/config.json`
//! 3. Deployment env vars (`GROQ_API_KEY`, `FIREBASE_PROJECT_ID`, `PORT`, …)
//! 4. Environment variables `KAIRO_<SECTION>__<FIELD>` (override everything)

use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{debug, info, warn};

use super::schema::{Config, ProviderConfig};

/// Number of numbered primary keys read from the environment
/// (`GROQ_API_KEY`, `GROQ_API_KEY_2`, … `GROQ_API_KEY_4`).
const MAX_NUMBERED_KEYS: usize = 4;

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default path + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    apply_env_overrides(load_config_from_path(&config_path))
}

/// Load config from a specific file path, without env overrides.
fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Config::default();
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return Config::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            Config::default()
        }
    }
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Deployment variables (as set on the hosting platform):
/// - `GROQ_API_KEY`, `GROQ_API_KEY_2` … `GROQ_API_KEY_4` → `providers.primary.api_keys`
/// - `GROQ_VISION_API_KEY` → `providers.vision_reserve_key`
/// - `OPENROUTER_API_KEY` → `providers.escalation.api_keys`
/// - `FIREBASE_PROJECT_ID`, `FIREBASE_CLIENT_EMAIL`, `FIREBASE_PRIVATE_KEY` → `store.*`
/// - `PORT` → `gateway.port`
///
/// Namespaced overrides (`KAIRO_<SECTION>__<FIELD>`, double underscore as delimiter):
/// - `KAIRO_PROVIDERS__PRIMARY__API_KEYS` (comma-separated), `__API_BASE`, `__PROVIDER`
/// - `KAIRO_PROVIDERS__ESCALATION__API_KEYS`, `__API_BASE`, `__PROVIDER`
/// - `KAIRO_PROVIDERS__VISION_RESERVE_KEY`
/// - `KAIRO_MODELS__CHAT`, `__VISION`, `__ESCALATION_CHAT`, `__CHAT_TEMPERATURE`,
///   `__VISION_TEMPERATURE`, `__MAX_TOKENS`
/// - `KAIRO_DISPATCH__TIMEOUT_SECS`, `KAIRO_DISPATCH__APOLOGY_TEXT`
/// - `KAIRO_STORE__PROJECT_ID`, `__CLIENT_EMAIL`, `__PRIVATE_KEY`, `__TOKEN_URI`, `__API_BASE`
/// - `KAIRO_GATEWAY__HOST`, `KAIRO_GATEWAY__PORT`
/// - `KAIRO_THROTTLE__UTC_OFFSET_HOURS`, `__NIGHT_START_HOUR`, `__NIGHT_END_HOUR`,
///   `__MIN_INTERVAL_SECS`
///
/// Numeric values that fail to parse are ignored.
fn apply_env_overrides(mut config: Config) -> Config {
    // Deployment names
    let numbered: Vec<String> = (1..=MAX_NUMBERED_KEYS)
        .filter_map(|i| {
            let name = if i == 1 {
                "GROQ_API_KEY".to_string()
            } else {
                format!("GROQ_API_KEY_{i}")
            };
            std::env::var(name).ok()
        })
        .filter(|k| !k.trim().is_empty())
        .collect();
    if !numbered.is_empty() {
        config.providers.primary.api_keys = numbered;
    }
    if let Ok(val) = std::env::var("GROQ_VISION_API_KEY") {
        config.providers.vision_reserve_key = val;
    }
    if let Ok(val) = std::env::var("OPENROUTER_API_KEY") {
        config.providers.escalation.api_keys = vec![val];
    }
    if let Ok(val) = std::env::var("FIREBASE_PROJECT_ID") {
        config.store.project_id = val;
    }
    if let Ok(val) = std::env::var("FIREBASE_CLIENT_EMAIL") {
        config.store.client_email = val;
    }
    if let Ok(val) = std::env::var("FIREBASE_PRIVATE_KEY") {
        config.store.private_key = unescape_private_key(&val);
    }
    if let Some(p) = parse_env("PORT") {
        config.gateway.port = p;
    }

    // Providers
    apply_provider_env(&mut config.providers.primary, "PRIMARY");
    apply_provider_env(&mut config.providers.escalation, "ESCALATION");
    if let Ok(val) = std::env::var("KAIRO_PROVIDERS__VISION_RESERVE_KEY") {
        config.providers.vision_reserve_key = val;
    }

    // Models
    if let Ok(val) = std::env::var("KAIRO_MODELS__CHAT") {
        config.models.chat = val;
    }
    if let Ok(val) = std::env::var("KAIRO_MODELS__VISION") {
        config.models.vision = val;
    }
    if let Ok(val) = std::env::var("KAIRO_MODELS__ESCALATION_CHAT") {
        config.models.escalation_chat = val;
    }
    if let Some(t) = parse_env("KAIRO_MODELS__CHAT_TEMPERATURE") {
        config.models.chat_temperature = t;
    }
    if let Some(t) = parse_env("KAIRO_MODELS__VISION_TEMPERATURE") {
        config.models.vision_temperature = t;
    }
    if let Some(n) = parse_env("KAIRO_MODELS__MAX_TOKENS") {
        config.models.max_tokens = n;
    }

    // Dispatch
    if let Some(n) = parse_env("KAIRO_DISPATCH__TIMEOUT_SECS") {
        config.dispatch.timeout_secs = n;
    }
    if let Ok(val) = std::env::var("KAIRO_DISPATCH__APOLOGY_TEXT") {
        config.dispatch.apology_text = val;
    }

    // Store
    if let Ok(val) = std::env::var("KAIRO_STORE__PROJECT_ID") {
        config.store.project_id = val;
    }
    if let Ok(val) = std::env::var("KAIRO_STORE__CLIENT_EMAIL") {
        config.store.client_email = val;
    }
    if let Ok(val) = std::env::var("KAIRO_STORE__PRIVATE_KEY") {
        config.store.private_key = unescape_private_key(&val);
    }
    if let Ok(val) = std::env::var("KAIRO_STORE__TOKEN_URI") {
        config.store.token_uri = val;
    }
    if let Ok(val) = std::env::var("KAIRO_STORE__API_BASE") {
        config.store.api_base = val;
    }

    // Gateway
    if let Ok(val) = std::env::var("KAIRO_GATEWAY__HOST") {
        config.gateway.host = val;
    }
    if let Some(p) = parse_env("KAIRO_GATEWAY__PORT") {
        config.gateway.port = p;
    }

    // Throttle
    if let Some(h) = parse_env("KAIRO_THROTTLE__UTC_OFFSET_HOURS") {
        config.throttle.utc_offset_hours = h;
    }
    if let Some(h) = parse_env("KAIRO_THROTTLE__NIGHT_START_HOUR") {
        config.throttle.night_start_hour = h;
    }
    if let Some(h) = parse_env("KAIRO_THROTTLE__NIGHT_END_HOUR") {
        config.throttle.night_end_hour = h;
    }
    if let Some(n) = parse_env("KAIRO_THROTTLE__MIN_INTERVAL_SECS") {
        config.throttle.min_interval_secs = n;
    }

    config
}

/// Read and parse an env var, ignoring unset or malformed values.
fn parse_env<T: FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(var = name, value = %raw, "Ignoring unparsable env override");
            None
        }
    }
}

/// Apply env var overrides for a single provider pool.
fn apply_provider_env(provider: &mut ProviderConfig, role: &str) {
    if let Ok(val) = std::env::var(format!("KAIRO_PROVIDERS__{role}__PROVIDER")) {
        provider.provider = val;
    }
    if let Ok(val) = std::env::var(format!("KAIRO_PROVIDERS__{role}__API_KEYS")) {
        provider.api_keys = split_keys(&val);
    }
    if let Ok(val) = std::env::var(format!("KAIRO_PROVIDERS__{role}__API_BASE")) {
        provider.api_base = Some(val);
    }
}

/// Split a comma-separated key list, dropping blanks.
fn split_keys(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}

/// Hosting dashboards store PEM keys on one line with literal `\n`.
fn unescape_private_key(raw: &str) -> String {
    raw.replace("\\n", "\n").trim().to_string()
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
