//! Utility helpers: path resolution, string manipulation.

use std::path::PathBuf;

/// Get the Kairo data directory (e.g. `~/.kairo/`).
pub fn get_data_path() -> PathBuf {
    let home = home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".kairo")
}

/// Truncate a string to `max_len` characters, adding "..." if truncated.
/// Unicode-safe.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

/// Mask an API key for display: keep a short prefix, hide the rest.
pub fn mask_key(key: &str) -> String {
    let visible: String = key.chars().take(6).collect();
    if key.chars().count() <= 6 {
        "*".repeat(key.chars().count())
    } else {
        format!("{visible}…")
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| std::env::var("USERPROFILE").ok().map(PathBuf::from))
}
