//! Shared CLI helpers: path expansion, output, version banner.

use std::path::{Path, PathBuf};

use colored::Colorize;

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs_next::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Guess an image MIME type from the file extension.
pub fn image_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/jpeg",
    }
}

/// Print a relay answer to stdout.
pub fn print_response(response: &str) {
    println!();
    println!("{}", "🗓  KairoAI".cyan().bold());
    if response.is_empty() {
        println!("{}", "(no response)".dimmed());
    } else {
        println!("{response}");
    }
    println!();
}

/// Print the startup banner.
pub fn print_banner() {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}", "🗓  Kairo relay".cyan().bold(), version.dimmed());
    println!();
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_tilde_home() {
        let result = expand_tilde("~/foo/bar");
        assert!(result.ends_with("foo/bar"));
        assert!(!result.starts_with("~"));
    }

    #[test]
    fn expand_tilde_no_tilde() {
        let result = expand_tilde("/etc/kairo/config.json");
        assert_eq!(result, PathBuf::from("/etc/kairo/config.json"));
    }

    #[test]
    fn mime_from_extension() {
        assert_eq!(image_mime_type(Path::new("tkb.PNG")), "image/png");
        assert_eq!(image_mime_type(Path::new("tkb.webp")), "image/webp");
        assert_eq!(image_mime_type(Path::new("tkb.jpg")), "image/jpeg");
        assert_eq!(image_mime_type(Path::new("tkb")), "image/jpeg");
    }
}
