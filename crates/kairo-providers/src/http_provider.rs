//! Generic HTTP-based completion provider for OpenAI-compatible APIs.
//!
//! One `HttpProvider` is one credential on one vendor for one model. The
//! dispatcher holds an ordered list of them per mode.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, error, warn};

use kairo_core::types::{
    ChatCompletionRequest, ChatCompletionResponse, CompletionMode, CompletionOutcome,
    CompletionRequest, ContentPart, ImageUrl, Message, ResponseFormat,
};

use crate::classify::{into_outcome, ProviderFailure};
use crate::registry::ProviderSpec;
use crate::traits::{CompletionProvider, LlmRequestConfig};

/// Build the shared HTTP client with the per-call deadline.
pub fn build_http_client(timeout: Duration) -> reqwest::Client {
    match reqwest::Client::builder().timeout(timeout).build() {
        Ok(client) => client,
        Err(e) => {
            warn!(error = %e, "Failed to build HTTP client, using defaults");
            reqwest::Client::new()
        }
    }
}

// ─────────────────────────────────────────────
// HttpProvider
// ─────────────────────────────────────────────

/// A completion provider that talks to any OpenAI-compatible HTTP API.
pub struct HttpProvider {
    /// HTTP client (shared, connection-pooled, carries the timeout).
    client: reqwest::Client,
    /// API base URL (e.g. `"https://api.groq.com/openai/v1"`).
    api_base: String,
    /// API key for Bearer authentication. May be blank.
    api_key: String,
    /// Model sent with every request.
    model: String,
    /// Sampling parameters.
    request_config: LlmRequestConfig,
    /// Extra headers to send with each request (e.g. OpenRouter `X-Title`).
    extra_headers: HeaderMap,
    /// Log label, e.g. `"Groq#2"`.
    label: String,
}

impl std::fmt::Debug for HttpProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProvider")
            .field("label", &self.label)
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

impl HttpProvider {
    /// Create a provider for one key on a registry vendor.
    ///
    /// Uses the vendor's default API base and a fresh client with a 30 s
    /// timeout; see the `with_*` methods to override.
    pub fn new(spec: &'static ProviderSpec, api_key: &str, model: &str) -> Self {
        HttpProvider {
            client: build_http_client(Duration::from_secs(30)),
            api_base: spec.default_api_base.to_string(),
            api_key: api_key.trim().to_string(),
            model: model.to_string(),
            request_config: LlmRequestConfig::default(),
            extra_headers: HeaderMap::new(),
            label: spec.display_name.to_string(),
        }
    }

    /// Share an existing client (and its timeout).
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Override the API base (config `apiBase`).
    pub fn with_api_base(mut self, api_base: Option<&str>) -> Self {
        if let Some(base) = api_base {
            self.api_base = base.to_string();
        }
        self
    }

    pub fn with_request_config(mut self, config: LlmRequestConfig) -> Self {
        self.request_config = config;
        self
    }

    /// Add extra headers; invalid names or values are skipped with a warning.
    pub fn with_extra_headers(mut self, headers: Option<&HashMap<String, String>>) -> Self {
        if let Some(headers) = headers {
            for (key, value) in headers {
                if let (Ok(name), Ok(val)) = (
                    HeaderName::from_bytes(key.as_bytes()),
                    HeaderValue::from_str(value),
                ) {
                    self.extra_headers.insert(name, val);
                } else {
                    warn!("Invalid header: {}={}", key, value);
                }
            }
        }
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Build the full chat completions URL.
    fn completions_url(&self) -> String {
        let base = self.api_base.trim_end_matches('/');
        format!("{}/chat/completions", base)
    }

    /// Translate a completion request into the OpenAI message list.
    fn build_messages(request: &CompletionRequest) -> Vec<Message> {
        let mut messages = Vec::with_capacity(2);
        if !request.system_prompt.is_empty() {
            messages.push(Message::system(request.system_prompt.clone()));
        }
        match (&request.mode, &request.image) {
            (CompletionMode::Vision, Some(image)) => {
                let encoded = BASE64.encode(&image.bytes);
                messages.push(Message::user_parts(vec![
                    ContentPart::Text {
                        text: request.user_prompt.clone(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: format!("data:{};base64,{}", image.mime_type, encoded),
                            detail: None,
                        },
                    },
                ]));
            }
            _ => messages.push(Message::user(request.user_prompt.clone())),
        }
        messages
    }

    /// One round trip; every failure is typed.
    async fn call(&self, request: &CompletionRequest) -> Result<String, ProviderFailure> {
        let body = ChatCompletionRequest {
            model: self.model.clone(),
            messages: Self::build_messages(request),
            max_tokens: self.request_config.max_tokens,
            temperature: Some(self.request_config.temperature),
            response_format: Some(ResponseFormat::json_object()),
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .headers(self.extra_headers.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderFailure::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(ProviderFailure::Status {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let chat_resp = response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|e| ProviderFailure::Malformed(e.to_string()))?;

        let choice = chat_resp
            .choices
            .into_iter()
            .next()
            .ok_or(ProviderFailure::NoChoices)?;
        let text = choice.message.text();
        if text.trim().is_empty() {
            return Err(ProviderFailure::EmptyContent);
        }
        Ok(text)
    }
}

#[async_trait]
impl CompletionProvider for HttpProvider {
    async fn complete(&self, request: &CompletionRequest) -> CompletionOutcome {
        if self.api_key.is_empty() {
            return CompletionOutcome::NoCredential;
        }

        debug!(
            provider = %self.label,
            model = %self.model,
            mode = %request.mode,
            has_image = request.image.is_some(),
            "Calling LLM"
        );

        let result = self.call(request).await;
        match &result {
            Ok(text) => debug!(provider = %self.label, chars = text.len(), "LLM response received"),
            Err(e) if e.is_rate_limited() => {
                warn!(provider = %self.label, error = %e, "Rate limited")
            }
            Err(e) => error!(provider = %self.label, error = %e, "LLM call failed"),
        }
        into_outcome(result)
    }

    fn display_name(&self) -> &str {
        &self.label
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
