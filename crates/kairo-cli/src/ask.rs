//! `kairo ask`: one dispatch + normalization from the terminal.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::info;

use kairo_core::config::load_config;
use kairo_core::normalize::{normalize_chat, normalize_extraction};
use kairo_core::types::{CompletionRequest, ImagePayload};
use kairo_providers::FallbackDispatcher;
use kairo_server::prompts::{build_chat_system_prompt, build_chat_user_prompt, Persona, EXTRACTION_PROMPT};
use kairo_server::ChatThrottle;

use crate::helpers;

pub async fn run(
    config_path: Option<&Path>,
    message: Option<String>,
    image: Option<PathBuf>,
    persona: &str,
) -> Result<()> {
    let config = load_config(config_path);
    let dispatcher = FallbackDispatcher::from_config(&config);

    let request = match (image, message) {
        (Some(path), _) => CompletionRequest::vision(EXTRACTION_PROMPT, read_image(&path)?),
        (None, Some(message)) if !message.trim().is_empty() => {
            let throttle = ChatThrottle::new(config.throttle.clone());
            let now = throttle.local_time(chrono::Utc::now());
            let mode = throttle.time_mode(chrono::Timelike::hour(&now));
            CompletionRequest::text(
                build_chat_system_prompt(Persona::parse(persona), mode),
                build_chat_user_prompt(mode, &[], &[], &message, &now.to_rfc3339()),
            )
        }
        _ => bail!("nothing to ask: pass --message or --image"),
    };

    info!(mode = %request.mode, "dispatching");
    let raw = dispatcher.get_completion(&request).await;

    let output = match request.image {
        Some(_) => match normalize_extraction(&raw) {
            Ok(extraction) => serde_json::to_string_pretty(&extraction)?,
            Err(e) => format!("{raw}\n\n({e})"),
        },
        None => match normalize_chat(&raw) {
            Ok(result) if result.subjects.is_empty() => result.reply,
            Ok(result) => format!(
                "{}\n\n{}",
                result.reply,
                serde_json::to_string_pretty(&result.subjects)?
            ),
            Err(e) => format!("{raw}\n\n({e})"),
        },
    };

    helpers::print_response(&output);
    Ok(())
}

/// Load an image file and guess its MIME type.
fn read_image(path: &Path) -> Result<ImagePayload> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read image {}", path.display()))?;
    if bytes.is_empty() {
        bail!("image {} is empty", path.display());
    }
    Ok(ImagePayload {
        bytes,
        mime_type: helpers::image_mime_type(path).to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn read_image_with_mime() {
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(b"\x89PNG").unwrap();

        let payload = read_image(file.path()).unwrap();
        assert_eq!(payload.mime_type, "image/png");
        assert_eq!(payload.bytes, b"\x89PNG".to_vec());
    }

    #[test]
    fn read_empty_image_fails() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(read_image(file.path()).is_err());
    }

    #[test]
    fn read_missing_image_fails() {
        assert!(read_image(Path::new("/definitely/not/here.jpg")).is_err());
    }
}
