//! Shared application state and its production wiring.

use std::path::PathBuf;
use std::sync::Arc;

use crate::analysis::AnalysisRelay;
use crate::llms::{
    GeminiClient, OpenAiSpeechClient, SpeechSynthesizer, TextGenerator, Transcriber,
};
use crate::prompts::{JsonFileTemplateStore, PromptLibrary, TemplateStore};
use crate::salesforce::{RecordGateway, RecordRelay, SalesforceRestClient, SessionProvider, SoapLoginProvider};
use crate::utilities::config::RelayConfig;

/// Where audio files live on disk and how they are addressed.
#[derive(Debug, Clone)]
pub struct MediaPaths {
    pub audio_dir: PathBuf,
    pub upload_dir: PathBuf,
    pub public_base_url: Option<String>,
}

/// Shared application state for the HTTP server.
///
/// Every collaborator sits behind a trait object so tests can substitute
/// fakes.
#[derive(Clone)]
pub struct AppState {
    pub records: RecordRelay,
    pub prompts: PromptLibrary,
    pub analysis: AnalysisRelay,
    pub speech: Arc<dyn SpeechSynthesizer>,
    pub transcriber: Arc<dyn Transcriber>,
    pub media: MediaPaths,
}

impl AppState {
    pub fn new(
        session: Arc<dyn SessionProvider>,
        gateway: Arc<dyn RecordGateway>,
        store: Arc<dyn TemplateStore>,
        generator: Arc<dyn TextGenerator>,
        speech: Arc<dyn SpeechSynthesizer>,
        transcriber: Arc<dyn Transcriber>,
        media: MediaPaths,
    ) -> Self {
        let prompts = PromptLibrary::new(store);
        Self {
            records: RecordRelay::new(session, gateway),
            analysis: AnalysisRelay::new(prompts.clone(), generator),
            prompts,
            speech,
            transcriber,
            media,
        }
    }

    /// Wire the real Salesforce, Gemini and OpenAI clients.
    pub fn from_config(config: &RelayConfig) -> Self {
        let http = reqwest::Client::new();

        let session = Arc::new(SoapLoginProvider::new(config.crm.clone(), http.clone()));
        let gateway = Arc::new(SalesforceRestClient::new(
            config.crm.api_version.clone(),
            http.clone(),
        ));
        let store = Arc::new(JsonFileTemplateStore::new(config.prompts_file.clone()));
        let generator = Arc::new(
            GeminiClient::new(
                config.gemini_model.clone(),
                config.gemini_api_key.clone(),
                http.clone(),
            )
            .with_base_url(config.gemini_base_url.clone()),
        );
        let openai = Arc::new(OpenAiSpeechClient::new(
            config.openai_api_key.clone(),
            config.openai_base_url.clone(),
            config.tts_model.clone(),
            config.stt_model.clone(),
            http,
        ));

        Self::new(
            session,
            gateway,
            store,
            generator,
            openai.clone(),
            openai,
            MediaPaths {
                audio_dir: config.audio_dir.clone(),
                upload_dir: config.upload_dir.clone(),
                public_base_url: config.public_base_url.clone(),
            },
        )
    }
}
