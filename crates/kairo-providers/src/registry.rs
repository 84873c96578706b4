//! Provider registry: static specs for the OpenAI-compatible vendors Kairo
//! can route to.
//!
//! A `ProviderSpec` only carries what the relay needs to reach a vendor:
//! a display name for logs, the default API base and whether it accepts
//! images.

// ─────────────────────────────────────────────
// ProviderSpec: static metadata for one provider
// ─────────────────────────────────────────────

/// Static specification describing one LLM vendor.
#[derive(Clone, Debug)]
pub struct ProviderSpec {
    /// Internal name (e.g. `"groq"`), as used in config.
    pub name: &'static str,
    /// Human-readable name for logs. E.g. `"OpenRouter"`.
    pub display_name: &'static str,
    /// Default `/chat/completions` base URL.
    pub default_api_base: &'static str,
    /// Whether the vendor accepts `image_url` parts.
    pub supports_vision: bool,
}

/// Supported vendors, in no particular order.
pub static PROVIDERS: &[ProviderSpec] = &[
    ProviderSpec {
        name: "groq",
        display_name: "Groq",
        default_api_base: "https://api.groq.com/openai/v1",
        supports_vision: true,
    },
    ProviderSpec {
        name: "openrouter",
        display_name: "OpenRouter",
        default_api_base: "https://openrouter.ai/api/v1",
        supports_vision: true,
    },
    ProviderSpec {
        name: "openai",
        display_name: "OpenAI",
        default_api_base: "https://api.openai.com/v1",
        supports_vision: true,
    },
    // Gemini's OpenAI-compatible surface
    ProviderSpec {
        name: "gemini",
        display_name: "Gemini",
        default_api_base: "https://generativelanguage.googleapis.com/v1beta/openai",
        supports_vision: true,
    },
    ProviderSpec {
        name: "deepseek",
        display_name: "DeepSeek",
        default_api_base: "https://api.deepseek.com/v1",
        supports_vision: false,
    },
];

/// Find a provider spec by exact name (case-insensitive).
pub fn find_by_name(name: &str) -> Option<&'static ProviderSpec> {
    PROVIDERS
        .iter()
        .find(|spec| spec.name.eq_ignore_ascii_case(name.trim()))
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
