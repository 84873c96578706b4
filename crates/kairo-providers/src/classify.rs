//! Failure classification for provider calls.

use thiserror::Error;

use kairo_core::types::CompletionOutcome;
use kairo_core::utils::truncate_string;

/// Error bodies are classified in full but shown at most this long.
const MAX_DISPLAYED_BODY: usize = 500;

/// Why a single provider call did not yield text.
#[derive(Debug, Error)]
pub enum ProviderFailure {
    /// The provider answered with a non-success HTTP status.
    #[error("HTTP {status}: {}", truncate_string(.body, MAX_DISPLAYED_BODY))]
    Status { status: u16, body: String },
    /// Connect/timeout/transport error.
    #[error("request failed: {0}")]
    Network(String),
    /// The body was not a chat completion.
    #[error("malformed response: {0}")]
    Malformed(String),
    /// HTTP success but `choices` was empty.
    #[error("no choices in response")]
    NoChoices,
    /// The first choice carried no text.
    #[error("empty AI response")]
    EmptyContent,
}

impl ProviderFailure {
    /// Whether this failure means the credential's quota is exhausted.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            ProviderFailure::Status { status, body } => {
                is_rate_limit_failure(Some(*status), body)
            }
            ProviderFailure::Network(msg) => is_rate_limit_failure(None, msg),
            ProviderFailure::Malformed(_)
            | ProviderFailure::NoChoices
            | ProviderFailure::EmptyContent => false,
        }
    }
}

/// Collapse one call's result into the outcome the dispatcher consumes.
pub fn into_outcome(result: Result<String, ProviderFailure>) -> CompletionOutcome {
    match result {
        Ok(text) => CompletionOutcome::Success(text),
        Err(e) if e.is_rate_limited() => CompletionOutcome::RateLimited,
        Err(_) => CompletionOutcome::OtherFailure,
    }
}

/// Decide whether a failed call hit a rate limit.
///
/// True for HTTP 429, or when the failure text mentions `429` or a rate
/// limit in any casing (`"Rate limit reached"`, `"rate_limit_exceeded"`,
/// `"RateLimitError"`).
pub fn is_rate_limit_failure(status: Option<u16>, text: &str) -> bool {
    if status == Some(429) {
        return true;
    }
    let lower = text.to_lowercase();
    lower.contains("429")
        || lower.contains("rate limit")
        || lower.contains("rate_limit")
        || lower.contains("ratelimit")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_429() {
        assert!(is_rate_limit_failure(Some(429), ""));
    }

    #[test]
    fn test_groq_rate_limit_body() {
        let body = r#"{"error":{"message":"Rate limit reached for model `llama-3.3-70b-versatile` on tokens per day (TPD)","type":"tokens","code":"rate_limit_exceeded"}}"#;
        assert!(is_rate_limit_failure(Some(400), body));
    }

    #[test]
    fn test_sdk_style_message() {
        assert!(is_rate_limit_failure(None, "Error code: 429 - Too Many Requests"));
        assert!(is_rate_limit_failure(None, "RateLimitError: quota exceeded"));
        assert!(is_rate_limit_failure(None, "RATE LIMIT"));
    }

    #[test]
    fn test_other_failures() {
        assert!(!is_rate_limit_failure(Some(500), "Internal Server Error"));
        assert!(!is_rate_limit_failure(Some(401), "Invalid API Key"));
        assert!(!is_rate_limit_failure(None, "connection refused"));
        assert!(!is_rate_limit_failure(None, ""));
    }

    #[test]
    fn test_failure_classification() {
        let limited = ProviderFailure::Status {
            status: 429,
            body: String::new(),
        };
        assert!(limited.is_rate_limited());
        assert!(!ProviderFailure::NoChoices.is_rate_limited());
        assert!(!ProviderFailure::EmptyContent.is_rate_limited());
        assert!(!ProviderFailure::Network("timed out".into()).is_rate_limited());
    }

    #[test]
    fn test_long_body_classified_in_full() {
        let body = format!("{}rate_limit_exceeded", "x".repeat(2_000));
        let failure = ProviderFailure::Status { status: 400, body };
        assert!(failure.is_rate_limited());
        assert!(failure.to_string().chars().count() < 600);
    }

    #[test]
    fn test_into_outcome() {
        let ok: Result<String, ProviderFailure> = Ok("{}".into());
        assert_eq!(into_outcome(ok), CompletionOutcome::Success("{}".into()));

        let limited: Result<String, ProviderFailure> = Err(ProviderFailure::Status {
            status: 429,
            body: "slow down".into(),
        });
        assert_eq!(into_outcome(limited), CompletionOutcome::RateLimited);

        let other: Result<String, ProviderFailure> = Err(ProviderFailure::Malformed("eof".into()));
        assert_eq!(into_outcome(other), CompletionOutcome::OtherFailure);
    }
}
