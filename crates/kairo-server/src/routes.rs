//! HTTP routes: health, chat, and timetable extraction.

use std::net::SocketAddr;

use axum::body::Bytes;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{ConnectInfo, DefaultBodyLimit, Multipart, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Timelike;
use serde::Serialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};

use kairo_core::normalize::{normalize_chat, normalize_extraction};
use kairo_core::types::{CompletionRequest, ImageExtraction, ImagePayload, ScheduleEntry};

use crate::intent::is_delete_all_intent;
use crate::prompts::{build_chat_system_prompt, build_chat_user_prompt, Persona, EXTRACTION_PROMPT};
use crate::state::AppState;
use crate::throttle::ThrottleDecision;

/// Largest accepted request body (timetable photos).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/chat", post(chat))
        .route("/extract_schedule", post(extract_schedule))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn error_response(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

// ─────────────────────────────────────────────
// Chat
// ─────────────────────────────────────────────

/// Chat payload. Every field is optional and wrongly typed values are
/// treated as absent.
#[derive(Debug, Default)]
struct ChatPayload {
    persona: String,
    history: Vec<Value>,
    message: String,
    subjects: Vec<Value>,
    user_id: Option<String>,
}

impl ChatPayload {
    fn from_body(body: &[u8]) -> Self {
        let Ok(Value::Object(obj)) = serde_json::from_slice::<Value>(body) else {
            return Self::default();
        };
        let text = |key: &str| {
            obj.get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let list = |key: &str| match obj.get(key) {
            Some(Value::Array(items)) => items.clone(),
            _ => Vec::new(),
        };
        Self {
            persona: text("persona").unwrap_or_default(),
            history: list("history"),
            message: text("message").unwrap_or_default(),
            subjects: list("subjects"),
            user_id: text("user_id"),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    reply: String,
    subjects: Vec<ScheduleEntry>,
    needs_sync: bool,
}

/// Body field, then `X-User-Id`, then the peer IP, then `"anonymous"`.
fn resolve_user_id(
    payload: &ChatPayload,
    headers: &HeaderMap,
    peer: Option<&ConnectInfo<SocketAddr>>,
) -> String {
    payload
        .user_id
        .clone()
        .or_else(|| {
            headers
                .get("x-user-id")
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        })
        .or_else(|| peer.map(|ConnectInfo(addr)| addr.ip().to_string()))
        .unwrap_or_else(|| "anonymous".to_string())
}

pub async fn chat(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let payload = ChatPayload::from_body(&body);
    let user_id = resolve_user_id(&payload, &headers, peer.as_ref());

    let local_now = state.throttle.local_time(state.now());
    let mode = state.throttle.time_mode(local_now.hour());

    if let ThrottleDecision::Limited { retry_after_secs } =
        state.throttle.check(&user_id, local_now)
    {
        info!(user_id = %user_id, retry_after_secs, "Chat throttled");
        return error_response(
            StatusCode::TOO_MANY_REQUESTS,
            json!({
                "error": "rate_limited",
                "message": state.throttle.limited_message(retry_after_secs),
            }),
        );
    }

    if payload.message.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, json!({ "error": "Empty message" }));
    }

    let input_subjects: Vec<ScheduleEntry> = payload
        .subjects
        .iter()
        .filter_map(ScheduleEntry::from_value)
        .collect();

    let request = CompletionRequest::text(
        build_chat_system_prompt(Persona::parse(&payload.persona), mode),
        build_chat_user_prompt(
            mode,
            &payload.subjects,
            &payload.history,
            &payload.message,
            &local_now.to_rfc3339(),
        ),
    );
    let raw = state.dispatcher.get_completion(&request).await;

    let (reply, mut subjects) = match normalize_chat(&raw) {
        Ok(result) => (result.reply, result.subjects),
        Err(e) => {
            warn!(user_id = %user_id, error = %e, "Unusable chat completion");
            return Json(ChatResponse {
                reply: state.dispatcher.apology_text().to_string(),
                subjects: input_subjects,
                needs_sync: false,
            })
            .into_response();
        }
    };

    if is_delete_all_intent(&payload.message) {
        debug!(user_id = %user_id, "Delete-all intent");
        subjects.clear();
    }

    let needs_sync = subjects != input_subjects && state.store.sync(&user_id, &subjects).await;

    info!(
        user_id = %user_id,
        mode = ?mode,
        subjects = subjects.len(),
        needs_sync,
        "Chat handled"
    );

    Json(ChatResponse {
        reply,
        subjects,
        needs_sync,
    })
    .into_response()
}

// ─────────────────────────────────────────────
// Timetable extraction
// ─────────────────────────────────────────────

struct UploadedImage {
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Bytes,
}

/// Read the `image` field; other fields are ignored.
async fn read_image_field(mut multipart: Multipart) -> Result<Option<UploadedImage>, String> {
    while let Some(field) = multipart.next_field().await.map_err(|e| e.to_string())? {
        if field.name() != Some("image") {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| e.to_string())?;
        return Ok(Some(UploadedImage {
            file_name,
            content_type,
            bytes,
        }));
    }
    Ok(None)
}

pub async fn extract_schedule(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let missing = || error_response(StatusCode::BAD_REQUEST, json!({ "error": "Missing image file" }));

    let Ok(multipart) = multipart else {
        return missing();
    };
    let image = match read_image_field(multipart).await {
        Ok(Some(image)) => image,
        Ok(None) => return missing(),
        Err(e) => {
            warn!(error = %e, "Failed to read multipart body");
            return error_response(StatusCode::BAD_REQUEST, json!({ "error": "Invalid multipart body" }));
        }
    };

    if image.file_name.as_deref() == Some("") || image.bytes.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, json!({ "error": "Empty image file" }));
    }

    let mime_type = image
        .content_type
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| DEFAULT_IMAGE_MIME.to_string());
    info!(bytes = image.bytes.len(), mime_type = %mime_type, "Extracting timetable");

    let request = CompletionRequest::vision(
        EXTRACTION_PROMPT,
        ImagePayload {
            bytes: image.bytes.to_vec(),
            mime_type,
        },
    );
    let raw = state.dispatcher.get_completion(&request).await;

    let extraction = normalize_extraction(&raw).unwrap_or_else(|e| {
        warn!(error = %e, "Unusable extraction completion");
        ImageExtraction {
            subjects: Vec::new(),
            image_summary: Some(Value::String(state.dispatcher.apology_text().to_string())),
        }
    });

    Json(extraction).into_response()
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::header::CONTENT_TYPE;
    use axum::http::Request;
    use chrono::{TimeZone, Utc};
    use tower::ServiceExt;

    use kairo_core::config::ThrottleConfig;
    use kairo_core::types::{CompletionMode, CompletionOutcome};
    use kairo_providers::{CompletionProvider, FallbackDispatcher, ModeRoute};
    use kairo_store::{MemoryStore, StoreHandle};

    use crate::throttle::ChatThrottle;

    const BODY_LIMIT: usize = 1_048_576;
    const APOLOGY: &str = "KairoAI đang bận, thử lại sau nhé.";
    const BOUNDARY: &str = "kairo-test-boundary";

    /// Returns one fixed outcome and remembers the last request.
    struct FixedProvider {
        outcome: CompletionOutcome,
        calls: AtomicUsize,
        last_request: Mutex<Option<CompletionRequest>>,
    }

    impl FixedProvider {
        fn new(outcome: CompletionOutcome) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            })
        }

        fn reply(text: &str) -> Arc<Self> {
            Self::new(CompletionOutcome::Success(text.to_string()))
        }
    }

    #[async_trait]
    impl CompletionProvider for FixedProvider {
        async fn complete(&self, request: &CompletionRequest) -> CompletionOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request.clone());
            self.outcome.clone()
        }

        fn display_name(&self) -> &str {
            "fixed"
        }
    }

    struct Harness {
        router: Router,
        provider: Arc<FixedProvider>,
        memory: Arc<MemoryStore>,
    }

    /// 10:00 in UTC+7.
    fn daytime() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 3, 0, 0).unwrap()
    }

    /// 23:30 in UTC+7.
    fn nighttime() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 16, 30, 0).unwrap()
    }

    fn harness_with(provider: Arc<FixedProvider>, at: chrono::DateTime<Utc>, store: bool) -> Harness {
        let memory = Arc::new(MemoryStore::new());
        let route = ModeRoute::new(vec![provider.clone() as Arc<dyn CompletionProvider>], None);
        let dispatcher = FallbackDispatcher::new(route.clone(), route, APOLOGY);
        let handle = if store {
            StoreHandle::with_store(memory.clone())
        } else {
            StoreHandle::disabled()
        };
        let state = AppState::new(dispatcher, handle, ChatThrottle::new(ThrottleConfig::default()))
            .with_clock(Arc::new(move || at));
        Harness {
            router: build_router(state),
            provider,
            memory,
        }
    }

    fn harness(provider: Arc<FixedProvider>) -> Harness {
        harness_with(provider, daytime(), true)
    }

    fn chat_request(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/chat")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("build request")
    }

    fn upload_request(file_name: &str, mime: Option<&str>, data: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\n")
                .as_bytes(),
        );
        if let Some(mime) = mime {
            body.extend_from_slice(format!("Content-Type: {mime}\r\n").as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/extract_schedule")
            .header(CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .expect("build request")
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), BODY_LIMIT)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("parse json")
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let h = harness(FixedProvider::reply("{}"));
        let request = Request::builder()
            .uri("/health")
            .header("Origin", "http://localhost:8081")
            .body(Body::empty())
            .expect("build request");

        let response = h.router.oneshot(request).await.expect("router call");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
        assert_eq!(json_body(response).await, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn chat_adds_subject_and_syncs() {
        let h = harness(FixedProvider::reply(
            r#"Sure! {"reply":"Đã thiết lập nhắc nhở: Đi tắm vào lúc 21:17.","subjects":[{"name":"Đi tắm","day_of_week":"Thứ 3","start_time":"21:17"}]}"#,
        ));

        let response = h
            .router
            .oneshot(chat_request(json!({
                "persona": "funny",
                "message": "17p nữa nhắc tao đi tắm",
                "subjects": [],
                "user_id": "user-42"
            })))
            .await
            .expect("router call");

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["reply"], "Đã thiết lập nhắc nhở: Đi tắm vào lúc 21:17.");
        assert_eq!(body["subjects"][0]["name"], "Đi tắm");
        assert_eq!(body["subjects"][0]["room"], "");
        assert_eq!(body["needs_sync"], true);

        let saved = h.memory.get("user-42").await;
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].start_time, "21:17");

        let request = h.provider.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.mode, CompletionMode::Text);
        assert!(request.user_prompt.contains("17p nữa nhắc tao đi tắm"));
        assert!(request.user_prompt.contains("2026-03-10T10:00:00+07:00"));
    }

    #[tokio::test]
    async fn chat_unchanged_subjects_skip_sync() {
        let h = harness(FixedProvider::reply(
            r#"{"reply":"Mai bạn học Toán.","subjects":[{"name":"Toán","day_of_week":"Thứ 4"}]}"#,
        ));

        let response = h
            .router
            .oneshot(chat_request(json!({
                "message": "mai tao học gì",
                "subjects": [{ "name": "Toán", "day_of_week": "Thứ 4" }],
                "user_id": "u1"
            })))
            .await
            .expect("router call");

        let body = json_body(response).await;
        assert_eq!(body["needs_sync"], false);
        assert_eq!(h.memory.write_count().await, 0);
    }

    #[tokio::test]
    async fn chat_empty_message_is_rejected() {
        let h = harness(FixedProvider::reply("{}"));
        let response = h
            .router
            .oneshot(chat_request(json!({ "message": "" })))
            .await
            .expect("router call");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await, json!({ "error": "Empty message" }));
        assert_eq!(h.provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn chat_invalid_json_body_counts_as_empty() {
        let h = harness(FixedProvider::reply("{}"));
        let request = Request::builder()
            .method("POST")
            .uri("/chat")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("not json"))
            .expect("build request");

        let response = h.router.oneshot(request).await.expect("router call");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn chat_delete_all_clears_subjects() {
        let h = harness(FixedProvider::reply(
            r#"{"reply":"Đã xóa.","subjects":[{"name":"Toán"}]}"#,
        ));

        let response = h
            .router
            .oneshot(chat_request(json!({
                "message": "xóa hết lịch giúp tao",
                "subjects": [{ "name": "Toán" }, { "name": "Lý" }],
                "user_id": "u1"
            })))
            .await
            .expect("router call");

        let body = json_body(response).await;
        assert_eq!(body["subjects"], json!([]));
        assert_eq!(body["needs_sync"], true);
        assert_eq!(h.memory.write_count().await, 1);
        assert!(h.memory.get("u1").await.is_empty());
    }

    #[tokio::test]
    async fn chat_provider_failure_returns_apology() {
        let h = harness(FixedProvider::new(CompletionOutcome::RateLimited));

        let response = h
            .router
            .oneshot(chat_request(json!({
                "message": "hello",
                "subjects": [{ "name": "Toán", "room": "A1" }]
            })))
            .await
            .expect("router call");

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["reply"], APOLOGY);
        assert_eq!(body["subjects"][0]["name"], "Toán");
        assert_eq!(body["subjects"][0]["room"], "A1");
        assert_eq!(body["needs_sync"], false);
        assert_eq!(h.memory.write_count().await, 0);
    }

    #[tokio::test]
    async fn chat_missing_reply_uses_default() {
        let h = harness(FixedProvider::reply(r#"{"subjects":[]}"#));

        let response = h
            .router
            .oneshot(chat_request(json!({ "message": "hi", "user_id": "u1" })))
            .await
            .expect("router call");

        let body = json_body(response).await;
        assert_eq!(body["reply"], kairo_core::normalize::DEFAULT_REPLY);
    }

    #[tokio::test]
    async fn chat_user_id_from_header() {
        let h = harness(FixedProvider::reply(
            r#"{"reply":"ok","subjects":[{"name":"Họp team"}]}"#,
        ));
        let request = Request::builder()
            .method("POST")
            .uri("/chat")
            .header(CONTENT_TYPE, "application/json")
            .header("X-User-Id", "header-user")
            .body(Body::from(json!({ "message": "chiều mai 3h họp team" }).to_string()))
            .expect("build request");

        h.router.oneshot(request).await.expect("router call");
        assert_eq!(h.memory.get("header-user").await.len(), 1);
    }

    #[tokio::test]
    async fn chat_anonymous_without_any_id() {
        let h = harness(FixedProvider::reply(
            r#"{"reply":"ok","subjects":[{"name":"Gym"}]}"#,
        ));

        h.router
            .oneshot(chat_request(json!({ "message": "tối nay đi gym" })))
            .await
            .expect("router call");
        assert_eq!(h.memory.get("anonymous").await.len(), 1);
    }

    #[tokio::test]
    async fn chat_without_store_reports_no_sync() {
        let h = harness_with(
            FixedProvider::reply(r#"{"reply":"ok","subjects":[{"name":"Gym"}]}"#),
            daytime(),
            false,
        );

        let response = h
            .router
            .oneshot(chat_request(json!({ "message": "tối nay đi gym", "user_id": "u1" })))
            .await
            .expect("router call");

        let body = json_body(response).await;
        assert_eq!(body["subjects"][0]["name"], "Gym");
        assert_eq!(body["needs_sync"], false);
    }

    #[tokio::test]
    async fn chat_night_throttle() {
        let h = harness_with(FixedProvider::reply(r#"{"reply":"ngủ đi"}"#), nighttime(), true);
        let body = json!({ "message": "còn thức không", "user_id": "owl" });

        let first = h
            .router
            .clone()
            .oneshot(chat_request(body.clone()))
            .await
            .expect("router call");
        assert_eq!(first.status(), StatusCode::OK);

        let request = h.provider.last_request.lock().unwrap().clone().unwrap();
        assert!(request.system_prompt.contains("khung giờ đêm"));

        let second = h
            .router
            .oneshot(chat_request(body))
            .await
            .expect("router call");
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        let json = json_body(second).await;
        assert_eq!(json["error"], "rate_limited");
        assert!(json["message"].as_str().unwrap().contains("60 giây"));
        assert_eq!(h.provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn extract_schedule_returns_subjects_and_summary() {
        let h = harness(FixedProvider::reply(
            r#"```json
{"subjects":[{"name":"Giải tích 1 (tiết 3-5)","day_of_week":"Thứ 2","start_time":"08:50","end_time":"11:25","room":"D3-201"}],"image_summary":"Thời khóa biểu học kỳ 1"}
```"#,
        ));

        let response = h
            .router
            .oneshot(upload_request("tkb.png", Some("image/png"), b"\x89PNG fake"))
            .await
            .expect("router call");

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["subjects"][0]["room"], "D3-201");
        assert_eq!(body["subjects"][0]["specific_date"], "");
        assert_eq!(body["image_summary"], "Thời khóa biểu học kỳ 1");

        let request = h.provider.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.mode, CompletionMode::Vision);
        let image = request.image.unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.bytes, b"\x89PNG fake".to_vec());
    }

    #[tokio::test]
    async fn extract_schedule_defaults_mime_type() {
        let h = harness(FixedProvider::reply(r#"{"subjects":[]}"#));

        let response = h
            .router
            .oneshot(upload_request("photo", None, b"jpegdata"))
            .await
            .expect("router call");

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["subjects"], json!([]));
        assert!(body.get("image_summary").is_none());

        let request = h.provider.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.image.unwrap().mime_type, "image/jpeg");
    }

    #[tokio::test]
    async fn extract_schedule_missing_image() {
        let h = harness(FixedProvider::reply("{}"));
        let body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n--{BOUNDARY}--\r\n"
        );
        let request = Request::builder()
            .method("POST")
            .uri("/extract_schedule")
            .header(CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .expect("build request");

        let response = h.router.oneshot(request).await.expect("router call");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await, json!({ "error": "Missing image file" }));
    }

    #[tokio::test]
    async fn extract_schedule_not_multipart() {
        let h = harness(FixedProvider::reply("{}"));
        let request = Request::builder()
            .method("POST")
            .uri("/extract_schedule")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .expect("build request");
        let response = h.router.oneshot(request).await.expect("router call");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await, json!({ "error": "Missing image file" }));
    }

    #[tokio::test]
    async fn extract_schedule_empty_file() {
        let h = harness(FixedProvider::reply("{}"));
        let response = h
            .router
            .oneshot(upload_request("tkb.png", Some("image/png"), b""))
            .await
            .expect("router call");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await, json!({ "error": "Empty image file" }));
        assert_eq!(h.provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn extract_schedule_unusable_output_returns_apology_summary() {
        let h = harness(FixedProvider::reply("I cannot read this image."));

        let response = h
            .router
            .oneshot(upload_request("tkb.jpg", Some("image/jpeg"), b"data"))
            .await
            .expect("router call");

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["subjects"], json!([]));
        assert_eq!(body["image_summary"], APOLOGY);
    }
}
