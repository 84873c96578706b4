//! Response normalizer: turns free-form model output into schema-valid records.
//!
//! Models regularly wrap their JSON in prose or markdown fences even when asked
//! for `json_object` output. We take everything between the first `{` and the
//! last `}`, parse it, then repair the fields the client depends on.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::types::{ImageExtraction, NormalizedChatResult, ScheduleEntry};

/// Reply used when the model omits `reply` or sends a non-string.
pub const DEFAULT_REPLY: &str = "KairoAI đã nhận được yêu cầu của đại ca.";

/// Why raw model text could not be turned into a record.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// No `{ ... }` span in the text.
    #[error("invalid JSON format from AI")]
    InvalidFormat,
    /// The `{ ... }` span is not a JSON object.
    #[error("failed to parse AI JSON: {0}")]
    ParseError(String),
}

/// A repaired record. `reply` is `Some` only when it was requested.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedRecord {
    pub reply: Option<String>,
    pub subjects: Vec<ScheduleEntry>,
    /// Every other field of the object, untouched.
    pub extra: Map<String, Value>,
}

/// Locate the JSON object candidate: first `{` through last `}` inclusive.
///
/// A text that opens an object but never closes one yields the tail from the
/// `{`, so truncated output surfaces as a parse error rather than a format
/// error.
pub fn extract_json_object(raw: &str) -> Result<&str, NormalizeError> {
    let start = raw.find('{').ok_or(NormalizeError::InvalidFormat)?;
    match raw.rfind('}') {
        Some(end) if end > start => Ok(&raw[start..=end]),
        Some(_) => Err(NormalizeError::InvalidFormat),
        None => Ok(&raw[start..]),
    }
}

/// Extract, parse and repair a model reply.
///
/// With `expect_reply`, `reply` is guaranteed to be a non-empty string
/// ([`DEFAULT_REPLY`] otherwise). `subjects` is always a sequence.
pub fn normalize(raw: &str, expect_reply: bool) -> Result<NormalizedRecord, NormalizeError> {
    let candidate = extract_json_object(raw)?;
    let parsed: Value =
        serde_json::from_str(candidate).map_err(|e| NormalizeError::ParseError(e.to_string()))?;
    let Value::Object(mut obj) = parsed else {
        return Err(NormalizeError::ParseError("top-level value is not an object".into()));
    };

    let reply = if expect_reply {
        match obj.remove("reply") {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
            _ => Some(DEFAULT_REPLY.to_string()),
        }
    } else {
        None
    };

    let subjects = match obj.remove("subjects") {
        Some(Value::Array(items)) => items.iter().filter_map(ScheduleEntry::from_value).collect(),
        _ => Vec::new(),
    };

    Ok(NormalizedRecord {
        reply,
        subjects,
        extra: obj,
    })
}

/// Normalize a chat-mode reply.
pub fn normalize_chat(raw: &str) -> Result<NormalizedChatResult, NormalizeError> {
    let record = normalize(raw, true)?;
    Ok(NormalizedChatResult {
        reply: record.reply.unwrap_or_else(|| DEFAULT_REPLY.to_string()),
        subjects: record.subjects,
    })
}

/// Normalize an image-extraction reply. `image_summary` is passed through.
pub fn normalize_extraction(raw: &str) -> Result<ImageExtraction, NormalizeError> {
    let mut record = normalize(raw, false)?;
    Ok(ImageExtraction {
        subjects: record.subjects,
        image_summary: record.extra.remove("image_summary"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extracts_object_from_prose() {
        let raw = "here you go: {\"reply\":\"hi\",\"subjects\":[]} thanks";
        let result = normalize_chat(raw).unwrap();
        assert_eq!(result.reply, "hi");
        assert!(result.subjects.is_empty());
    }

    #[test]
    fn test_markdown_fence() {
        let raw = "```json\n{\"reply\": \"Đã thiết lập nhắc nhở\", \"subjects\": [{\"name\": \"Đi tắm\", \"start_time\": \"21:17\"}]}\n```";
        let result = normalize_chat(raw).unwrap();
        assert_eq!(result.subjects.len(), 1);
        assert_eq!(result.subjects[0].name, "Đi tắm");
        assert_eq!(result.subjects[0].start_time, "21:17");
        assert_eq!(result.subjects[0].room, "");
    }

    #[test]
    fn test_no_braces_is_invalid_format() {
        let err = normalize("sorry, no json today", true).unwrap_err();
        assert!(matches!(err, NormalizeError::InvalidFormat));
    }

    #[test]
    fn test_closing_before_opening_is_invalid_format() {
        let err = normalize("} oops {", true).unwrap_err();
        assert!(matches!(err, NormalizeError::InvalidFormat));
    }

    #[test]
    fn test_unterminated_object_is_parse_error() {
        let err = normalize("{invalid json", true).unwrap_err();
        assert!(matches!(err, NormalizeError::ParseError(_)));
    }

    #[test]
    fn test_unparseable_span_is_parse_error() {
        let err = normalize("{invalid json}", true).unwrap_err();
        assert!(matches!(err, NormalizeError::ParseError(_)));
    }

    #[test]
    fn test_missing_reply_gets_default_and_keeps_subjects() {
        let raw = json!({
            "subjects": [{ "name": "Toán", "day_of_week": "Thứ 3" }]
        })
        .to_string();
        let result = normalize_chat(&raw).unwrap();
        assert_eq!(result.reply, DEFAULT_REPLY);
        assert_eq!(result.subjects.len(), 1);
        assert_eq!(result.subjects[0].day_of_week, "Thứ 3");
    }

    #[test]
    fn test_non_string_reply_gets_default() {
        let result = normalize_chat(r#"{"reply": 42, "subjects": []}"#).unwrap();
        assert_eq!(result.reply, DEFAULT_REPLY);
    }

    #[test]
    fn test_empty_reply_gets_default() {
        let result = normalize_chat(r#"{"reply": "  ", "subjects": []}"#).unwrap();
        assert_eq!(result.reply, DEFAULT_REPLY);
    }

    #[test]
    fn test_string_subjects_replaced_with_empty() {
        let result = normalize_chat(r#"{"reply": "ok", "subjects": "Toán lúc 8h"}"#).unwrap();
        assert_eq!(result.reply, "ok");
        assert!(result.subjects.is_empty());
    }

    #[test]
    fn test_non_object_subject_elements_dropped() {
        let result =
            normalize_chat(r#"{"reply": "ok", "subjects": ["Toán", {"name": "Lý"}, 3]}"#).unwrap();
        assert_eq!(result.subjects.len(), 1);
        assert_eq!(result.subjects[0].name, "Lý");
    }

    #[test]
    fn test_reply_not_requested_stays_none() {
        let record = normalize(r#"{"reply": "hi", "subjects": []}"#, false).unwrap();
        assert!(record.reply.is_none());
        // Unrequested reply is left in the extra fields.
        assert_eq!(record.extra.get("reply"), Some(&json!("hi")));
    }

    #[test]
    fn test_extraction_passes_summary_through() {
        let raw = r#"Kết quả: {"subjects": [], "image_summary": "Bài tập tích phân"}"#;
        let result = normalize_extraction(raw).unwrap();
        assert!(result.subjects.is_empty());
        assert_eq!(result.image_summary, Some(json!("Bài tập tích phân")));
    }

    #[test]
    fn test_extraction_missing_summary_not_defaulted() {
        let result = normalize_extraction(r#"{"subjects": null}"#).unwrap();
        assert!(result.subjects.is_empty());
        assert!(result.image_summary.is_none());
    }

    #[test]
    fn test_span_over_two_objects() {
        // The span covers two objects, which is not a single JSON value.
        let err = normalize("[{\"a\":1},{\"b\":2}]", true).unwrap_err();
        assert!(matches!(err, NormalizeError::ParseError(_)));
    }
}
