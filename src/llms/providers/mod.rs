//! Concrete provider clients.
//!
//! | Provider | Module     | Implements                          |
//! |----------|------------|-------------------------------------|
//! | Gemini   | [`gemini`] | `TextGenerator`                     |
//! | OpenAI   | [`openai`] | `SpeechSynthesizer`, `Transcriber`  |

pub mod gemini;
pub mod openai;
