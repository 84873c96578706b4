//! Prompt builders for chat and timetable extraction.

use serde_json::Value;

use crate::throttle::TimeMode;

/// Reply persona chosen by the client.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Persona {
    #[default]
    Serious,
    Funny,
    Angry,
}

impl Persona {
    /// Parse the client's persona name; unknown names fall back to serious.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "funny" => Persona::Funny,
            "angry" => Persona::Angry,
            _ => Persona::Serious,
        }
    }

    fn style(&self) -> &'static str {
        match self {
            Persona::Serious => {
                "Trợ lý chuẩn mực, điềm đạm, xưng KairoAI - Bạn, giải thích mạch lạc, hầu như không dùng icon."
            }
            Persona::Funny => {
                "Giọng hài hước kiểu giới trẻ, hay đùa nhẹ và dùng icon 😂 ☕ đúng chỗ, nhưng vẫn trả lời đúng và đủ ý."
            }
            Persona::Angry => {
                "Giọng cộc lốc, khó ở, hay cà khịa người dùng lười, nhưng không xúc phạm nặng và vẫn đưa lời giải chính xác."
            }
        }
    }
}

/// Instructions for the vision model.
pub const EXTRACTION_PROMPT: &str = r#"Bạn là trợ lý trích xuất thông tin từ hình ảnh liên quan đến thời gian biểu và học tập
(thời khóa biểu, bảng đăng ký học phần, lịch làm việc, bài tập, tài liệu, ghi chú...).

1) Nếu ảnh có lịch, chuẩn hóa từng hoạt động vào mảng "subjects". "day_of_week" dùng "Thứ 2".."Thứ 7" hoặc "Chủ nhật";
   giờ theo định dạng "HH:MM" 24h. Nếu bảng chỉ có tiết/tuần, hãy ước lượng giờ và ghi tiết/tuần vào cuối "name".
2) Luôn tóm tắt nội dung chính của ảnh bằng tiếng Việt (tối đa 150 từ) vào "image_summary".

Chỉ trả về JSON hợp lệ, không thêm văn bản nào khác:
{
  "subjects": [
    {"name": "...", "day_of_week": "Thứ 2", "start_time": "07:00", "end_time": "09:00", "room": "..."}
  ],
  "image_summary": "..."
}
Nếu ảnh không có lịch, đặt "subjects": [] nhưng vẫn điền "image_summary"."#;

const NIGHT_NOTE: &str = "\nHiện đang là khung giờ đêm: trả lời thật ngắn gọn, 2-4 câu hoặc vài gạch đầu dòng.";

/// System prompt for a chat turn.
pub fn build_chat_system_prompt(persona: Persona, mode: TimeMode) -> String {
    let night_note = match mode {
        TimeMode::Night => NIGHT_NOTE,
        TimeMode::Day => "",
    };
    format!(
        r#"Bạn là KairoAI, trợ lý AI bên trong một ứng dụng đặt và quản lý thời gian biểu cá nhân.
Luôn trả lời bằng tiếng Việt. Nếu được hỏi, chỉ nói "Tôi là KairoAI".
Cá tính: {style}{night_note}

Biến "subjects" là toàn bộ lịch hiện tại của người dùng.
- Khi người dùng thêm, dời hoặc xóa lịch, trả về mảng subjects MỚI đầy đủ.
- Khi người dùng chỉ hỏi hoặc trò chuyện, trả về nguyên mảng subjects đầu vào.
- Chỉ trả về "subjects": [] khi người dùng thật sự muốn xóa hết lịch.
- Tính mốc thời gian tương đối từ thời điểm hiện tại (ISO 8601) trong tin nhắn.

Chỉ trả về JSON hợp lệ theo cấu trúc:
{{
  "reply": "Câu trả lời cho người dùng",
  "subjects": [
    {{"name": "", "day_of_week": "Thứ 2|...|Chủ nhật", "start_time": "HH:MM", "end_time": "HH:MM", "room": "", "specific_date": "YYYY-MM-DD hoặc rỗng"}}
  ]
}}"#,
        style = persona.style(),
    )
}

/// Render prior turns as `Người dùng:` / `KairoAI:` lines, skipping empty ones.
fn render_history(history: &[Value]) -> String {
    let mut out = String::new();
    for item in history {
        let content = item.get("content").and_then(Value::as_str).unwrap_or("");
        if content.is_empty() {
            continue;
        }
        let prefix = match item.get("role").and_then(Value::as_str) {
            Some("user") | None => "Người dùng:",
            Some(_) => "KairoAI:",
        };
        out.push_str(prefix);
        out.push(' ');
        out.push_str(content);
        out.push('\n');
    }
    out
}

/// User prompt for a chat turn.
pub fn build_chat_user_prompt(
    mode: TimeMode,
    subjects: &[Value],
    history: &[Value],
    message: &str,
    now_iso: &str,
) -> String {
    let mode_label = match mode {
        TimeMode::Day => "ban ngày (7h-23h)",
        TimeMode::Night => "ban đêm (23h-7h, trả lời ngắn gọn)",
    };
    let subjects_text = serde_json::to_string(subjects).unwrap_or_else(|_| "[]".to_string());
    format!(
        "Thời điểm hiện tại: {now_iso}\n\
         Chế độ thời gian hiện tại: {mode_label}.\n\
         Lịch hiện tại (subjects): {subjects_text}\n\n\
         Lịch sử hội thoại:\n{history}\n\
         Tin nhắn mới của người dùng: {message}\n\n\
         Hãy trả lời theo đúng định dạng JSON đã quy định ở trên.",
        history = render_history(history),
    )
}
