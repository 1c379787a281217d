//! Generative-text and speech providers.
//!
//! - [`base_llm`] - provider-neutral traits used by the HTTP handlers
//! - [`providers`] - Gemini text generation and OpenAI audio clients

pub mod base_llm;
pub mod providers;

pub use base_llm::{
    AudioUpload, SpeechRequest, SpeechSynthesizer, TextGenerator, Transcriber, DEFAULT_VOICE,
};
pub use providers::gemini::GeminiClient;
pub use providers::openai::OpenAiSpeechClient;
