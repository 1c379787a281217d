//! # crm-relay
//!
//! HTTP relay between a recruiting front end and three external services:
//! the Salesforce CRM (jobs and "opportunity discussed" records), Google
//! Gemini for text analysis, and OpenAI for speech synthesis and
//! transcription. Prompt templates used for analysis are kept in a local
//! JSON file and managed over HTTP.

pub mod analysis;
pub mod audio;
pub mod llms;
pub mod prompts;
pub mod salesforce;
pub mod server;
pub mod utilities;

pub use analysis::{AnalysisRelay, AnalysisRequest, AnalysisResponse};
pub use prompts::{PromptLibrary, PromptTemplate};
pub use salesforce::RecordRelay;
pub use server::{app_router, AppState};
pub use utilities::config::RelayConfig;
pub use utilities::errors::{RelayError, RelayResult};

/// Crate version reported by `/health`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
