//! Provider-neutral traits for the generative and speech services.
//!
//! Handlers depend on these traits only, so tests can swap in fakes and a
//! different vendor can be wired in `server::state` without touching routes.

use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;

use crate::utilities::errors::RelayResult;

/// Default voice for speech synthesis.
pub const DEFAULT_VOICE: &str = "alloy";

/// Single-prompt text generation.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Provider name used in logs and errors.
    fn provider(&self) -> &str;

    /// Send `prompt` as one user turn and return the generated text.
    async fn generate(&self, prompt: &str) -> RelayResult<String>;
}

/// Text-to-speech request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechRequest {
    pub text: String,
    pub voice: String,
    /// Optional delivery instructions (tone, pace).
    pub instructions: Option<String>,
}

impl SpeechRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice: DEFAULT_VOICE.to_string(),
            instructions: None,
        }
    }
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize speech and return the encoded (mp3) audio.
    async fn synthesize(&self, request: &SpeechRequest) -> RelayResult<Bytes>;
}

/// An audio file already written to disk, waiting to be transcribed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioUpload {
    pub path: PathBuf,
    pub file_name: String,
    pub mime: String,
}

#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe the file and return its text.
    async fn transcribe(&self, upload: &AudioUpload) -> RelayResult<String>;
}
