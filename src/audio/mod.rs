//! Audio file naming and temp-file handling for the speech endpoints.

use std::path::{Path, PathBuf};

/// Extension used when neither the file name nor the MIME type helps.
pub const FALLBACK_EXTENSION: &str = "webm";

/// Extensions the transcription endpoint accepts.
const KNOWN_EXTENSIONS: &[&str] = &[
    "flac", "m4a", "mp3", "mp4", "mpeg", "mpga", "oga", "ogg", "wav", "webm",
];

/// Pick a file extension for an uploaded recording.
///
/// The file name wins when it carries a known extension; otherwise the
/// declared MIME type is mapped; otherwise [`FALLBACK_EXTENSION`].
pub fn infer_extension(file_name: Option<&str>, mime: Option<&str>) -> &'static str {
    if let Some(ext) = file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
    {
        if let Some(known) = KNOWN_EXTENSIONS.iter().copied().find(|k| *k == ext) {
            return known;
        }
    }

    let essence = mime
        .map(|m| m.split(';').next().unwrap_or("").trim().to_ascii_lowercase())
        .unwrap_or_default();
    match essence.as_str() {
        "audio/webm" | "video/webm" => "webm",
        "audio/mpeg" | "audio/mp3" => "mp3",
        "audio/wav" | "audio/x-wav" | "audio/wave" => "wav",
        "audio/ogg" => "ogg",
        "audio/mp4" | "audio/m4a" | "audio/x-m4a" => "m4a",
        "audio/flac" | "audio/x-flac" => "flac",
        _ => FALLBACK_EXTENSION,
    }
}

/// MIME type sent upstream for a given extension.
pub fn mime_for_extension(ext: &str) -> &'static str {
    match ext {
        "mp3" | "mpeg" | "mpga" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" | "oga" => "audio/ogg",
        "m4a" | "mp4" => "audio/mp4",
        "flac" => "audio/flac",
        _ => "audio/webm",
    }
}

fn millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Staging path for an uploaded recording.
pub fn upload_path(dir: &Path, ext: &str) -> PathBuf {
    dir.join(format!("recording-{}.{}", millis(), ext))
}

/// File name for synthesized speech.
pub fn speech_file_name() -> String {
    format!("speech-{}.mp3", millis())
}

/// Public URL for a file under the served audio directory.
pub fn audio_url(public_base_url: Option<&str>, file_name: &str) -> String {
    match public_base_url {
        Some(base) => format!("{}/audio/{}", base.trim_end_matches('/'), file_name),
        None => format!("/audio/{}", file_name),
    }
}

/// Delete a staged file; failures are logged and otherwise ignored.
pub async fn remove_quietly(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::warn!(path = %path.display(), "Failed to delete temporary audio file: {}", e);
    }
}
