//! Core types for Kairo: provider wire format, completion requests/outcomes,
//! and the schedule records exchanged with the mobile client.
//!
//! The wire types model the OpenAI chat completions API, which every
//! provider we talk to (Groq, OpenRouter, OpenAI, Gemini, DeepSeek) accepts.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────
// Messages (OpenAI chat completions format)
// ─────────────────────────────────────────────

/// A chat message in the OpenAI format.
///
/// Only the roles the relay actually sends are modelled.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role")]
pub enum Message {
    #[serde(rename = "system")]
    System { content: String },

    #[serde(rename = "user")]
    User { content: MessageContent },
}

impl Message {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Message::System {
            content: content.into(),
        }
    }

    /// Create a user message with text content.
    pub fn user(content: impl Into<String>) -> Self {
        Message::User {
            content: MessageContent::Text(content.into()),
        }
    }

    /// Create a user message with multipart content (text + images).
    pub fn user_parts(parts: Vec<ContentPart>) -> Self {
        Message::User {
            content: MessageContent::Parts(parts),
        }
    }
}

/// User message content: either plain text or multipart (for vision).
///
/// When serialized: text becomes a plain string, parts become an array of objects.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// A single part of a multipart message.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    /// Image as a URL or a base64 data URI.
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

/// Image URL payload.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ImageUrl {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

// ─────────────────────────────────────────────
// Chat completion request / response (wire)
// ─────────────────────────────────────────────

/// Request body for an OpenAI-compatible chat completion API.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

/// `response_format` field. We always ask for `json_object`.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
}

impl ResponseFormat {
    pub fn json_object() -> Self {
        ResponseFormat {
            format_type: "json_object".to_string(),
        }
    }
}

/// Raw chat completion response from an OpenAI-compatible API.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub id: Option<String>,
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    pub usage: Option<UsageInfo>,
}

/// A single choice in a chat completion response.
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: AssistantMessage,
    pub finish_reason: Option<String>,
}

/// The assistant message within a chat completion choice.
#[derive(Debug, Deserialize)]
pub struct AssistantMessage {
    #[serde(default)]
    pub content: Option<AssistantContent>,
}

/// Assistant content: most providers send a string, some send text parts.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AssistantContent {
    Text(String),
    Parts(Vec<AssistantPart>),
}

/// One element of a multipart assistant reply. Non-text parts carry no `text`.
#[derive(Debug, Deserialize)]
pub struct AssistantPart {
    #[serde(default)]
    pub text: Option<String>,
}

impl AssistantMessage {
    /// Flatten the content into plain text (parts are concatenated).
    pub fn text(self) -> String {
        match self.content {
            Some(AssistantContent::Text(text)) => text,
            Some(AssistantContent::Parts(parts)) => {
                parts.into_iter().filter_map(|p| p.text).collect()
            }
            None => String::new(),
        }
    }
}

/// Token usage statistics from the LLM.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UsageInfo {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

// ─────────────────────────────────────────────
// Completion requests and outcomes
// ─────────────────────────────────────────────

/// Which candidate list a request is dispatched against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompletionMode {
    Text,
    Vision,
}

impl CompletionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompletionMode::Text => "text",
            CompletionMode::Vision => "vision",
        }
    }
}

impl std::fmt::Display for CompletionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw image bytes plus their MIME type.
#[derive(Clone, Debug, PartialEq)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// One request for a completion, independent of which credential serves it.
#[derive(Clone, Debug)]
pub struct CompletionRequest {
    pub mode: CompletionMode,
    /// System prompt (text mode). Vision requests put their instructions
    /// into `user_prompt` next to the image.
    pub system_prompt: String,
    pub user_prompt: String,
    pub image: Option<ImagePayload>,
}

impl CompletionRequest {
    /// A text-chat request.
    pub fn text(system_prompt: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        CompletionRequest {
            mode: CompletionMode::Text,
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            image: None,
        }
    }

    /// A vision request: one instruction prompt plus one image.
    pub fn vision(prompt: impl Into<String>, image: ImagePayload) -> Self {
        CompletionRequest {
            mode: CompletionMode::Vision,
            system_prompt: String::new(),
            user_prompt: prompt.into(),
            image: Some(image),
        }
    }
}

/// Result of one completion attempt against one credential.
#[derive(Clone, Debug, PartialEq)]
pub enum CompletionOutcome {
    Success(String),
    RateLimited,
    OtherFailure,
    NoCredential,
}

impl CompletionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CompletionOutcome::Success(_))
    }
}

// ─────────────────────────────────────────────
// Schedule records
// ─────────────────────────────────────────────

/// One entry of a user's timetable.
///
/// Every field is always present; values are whatever the model or client
/// supplied, no format checks are applied.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScheduleEntry {
    pub name: String,
    pub day_of_week: String,
    /// `HH:MM`, by convention only.
    pub start_time: String,
    pub end_time: String,
    pub room: String,
    /// `YYYY-MM-DD` or empty.
    pub specific_date: String,
}

impl ScheduleEntry {
    /// Build an entry from an arbitrary JSON value.
    ///
    /// Returns `None` for non-objects. Missing or non-scalar fields become `""`;
    /// numbers and booleans are rendered as text.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        let obj = value.as_object()?;
        let field = |key: &str| -> String {
            match obj.get(key) {
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(serde_json::Value::Number(n)) => n.to_string(),
                Some(serde_json::Value::Bool(b)) => b.to_string(),
                _ => String::new(),
            }
        };
        Some(ScheduleEntry {
            name: field("name"),
            day_of_week: field("day_of_week"),
            start_time: field("start_time"),
            end_time: field("end_time"),
            room: field("room"),
            specific_date: field("specific_date"),
        })
    }
}

/// Normalized result of a chat completion.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct NormalizedChatResult {
    /// Never empty.
    pub reply: String,
    pub subjects: Vec<ScheduleEntry>,
}

/// Normalized result of a timetable image extraction.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ImageExtraction {
    pub subjects: Vec<ScheduleEntry>,
    /// Passed through as the model produced it (usually a string); left out
    /// when the model omitted it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_summary: Option<serde_json::Value>,
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
