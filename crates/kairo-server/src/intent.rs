//! Detection of "wipe my whole schedule" requests.

/// Phrases that always mean "delete every entry", accented and unaccented.
const DELETE_ALL_PHRASES: &[&str] = &[
    "xóa hết lịch",
    "xoá hết lịch",
    "xoa het lich",
    "xóa sạch lịch",
    "xoá sạch lịch",
    "xoa sach lich",
    "xóa toàn bộ lịch",
    "xoá toàn bộ lịch",
    "xoa toan bo lich",
];

const DELETE_WORDS: &[&str] = &["xóa", "xoá", "xoa"];
const ALL_WORDS: &[&str] = &["hết", "het", "toàn bộ", "toan bo"];
const SCHEDULE_WORDS: &[&str] = &["lịch", "lich"];

/// Whether `message` asks to delete the entire schedule.
///
/// Matches a known phrase, or a message containing a delete word, an "all"
/// word and a schedule word anywhere.
pub fn is_delete_all_intent(message: &str) -> bool {
    let text = message.to_lowercase();
    if DELETE_ALL_PHRASES.iter().any(|p| text.contains(p)) {
        return true;
    }
    let has = |words: &[&str]| words.iter().any(|w| text.contains(w));
    has(DELETE_WORDS) && has(ALL_WORDS) && has(SCHEDULE_WORDS)
}
