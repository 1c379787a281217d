//! OpenAI audio endpoints: text-to-speech and transcription.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde_json::Value;

use crate::llms::base_llm::{AudioUpload, SpeechRequest, SpeechSynthesizer, Transcriber};
use crate::utilities::errors::{RelayError, RelayResult};

/// Client for `/audio/speech` and `/audio/transcriptions`.
#[derive(Debug, Clone)]
pub struct OpenAiSpeechClient {
    api_key: Option<String>,
    base_url: String,
    tts_model: String,
    stt_model: String,
    client: reqwest::Client,
}

impl OpenAiSpeechClient {
    pub fn new(
        api_key: Option<String>,
        base_url: impl Into<String>,
        tts_model: impl Into<String>,
        stt_model: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            api_key,
            base_url: base_url.into(),
            tts_model: tts_model.into(),
            stt_model: stt_model.into(),
            client,
        }
    }

    fn api_key(&self) -> RelayResult<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| RelayError::Config("OPENAI_API_KEY is not set".to_string()))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    /// JSON body for `/audio/speech`.
    pub fn speech_body(&self, request: &SpeechRequest) -> Value {
        let mut body = serde_json::json!({
            "model": self.tts_model,
            "input": request.text,
            "voice": request.voice,
            "response_format": "mp3",
        });
        if let Some(instructions) = request.instructions.as_deref().filter(|i| !i.trim().is_empty()) {
            body["instructions"] = Value::String(instructions.to_string());
        }
        body
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiSpeechClient {
    async fn synthesize(&self, request: &SpeechRequest) -> RelayResult<Bytes> {
        let api_key = self.api_key()?;
        tracing::debug!(
            model = %self.tts_model,
            voice = %request.voice,
            chars = request.text.len(),
            "Speech synthesis request"
        );

        let response = self
            .client
            .post(self.url("audio/speech"))
            .bearer_auth(api_key)
            .json(&self.speech_body(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::upstream("openai", status.as_u16(), &body));
        }

        Ok(response.bytes().await?)
    }
}

#[async_trait]
impl Transcriber for OpenAiSpeechClient {
    async fn transcribe(&self, upload: &AudioUpload) -> RelayResult<String> {
        let api_key = self.api_key()?;
        let audio = tokio::fs::read(&upload.path).await?;
        tracing::debug!(
            model = %self.stt_model,
            file = %upload.file_name,
            bytes = audio.len(),
            "Transcription request"
        );

        let part = Part::bytes(audio)
            .file_name(upload.file_name.clone())
            .mime_str(&upload.mime)?;
        let form = Form::new()
            .text("model", self.stt_model.clone())
            .part("file", part);

        let response = self
            .client
            .post(self.url("audio/transcriptions"))
            .bearer_auth(api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(RelayError::upstream("openai", status.as_u16(), &body));
        }

        let json: Value = serde_json::from_str(&body)?;
        json.get("text")
            .and_then(|t| t.as_str())
            .map(str::to_string)
            .ok_or_else(|| RelayError::Upstream {
                service: "openai",
                status: status.as_u16(),
                message: "Transcription response has no text".to_string(),
                details: Some(json.clone()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(api_key: Option<&str>) -> OpenAiSpeechClient {
        OpenAiSpeechClient::new(
            api_key.map(str::to_string),
            "https://api.openai.com/v1/",
            "gpt-4o-mini-tts",
            "whisper-1",
            reqwest::Client::new(),
        )
    }

    #[test]
    fn test_speech_body_defaults() {
        let body = client(Some("k")).speech_body(&SpeechRequest::new("Hello there"));
        assert_eq!(body["model"], "gpt-4o-mini-tts");
        assert_eq!(body["input"], "Hello there");
        assert_eq!(body["voice"], "alloy");
        assert!(body.get("instructions").is_none());
    }

    #[test]
    fn test_speech_body_with_instructions() {
        let mut request = SpeechRequest::new("Hi");
        request.voice = "nova".into();
        request.instructions = Some("Speak warmly".into());
        let body = client(Some("k")).speech_body(&request);
        assert_eq!(body["voice"], "nova");
        assert_eq!(body["instructions"], "Speak warmly");
    }

    #[test]
    fn test_url_join() {
        assert_eq!(
            client(None).url("audio/speech"),
            "https://api.openai.com/v1/audio/speech"
        );
    }

    #[tokio::test]
    async fn test_missing_key_is_config_error() {
        let err = client(None)
            .synthesize(&SpeechRequest::new("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::Config(_)));
    }

    fn mock_client(server: &MockServer) -> OpenAiSpeechClient {
        OpenAiSpeechClient::new(
            Some("sk-test".into()),
            server.uri(),
            "gpt-4o-mini-tts",
            "whisper-1",
            reqwest::Client::new(),
        )
    }

    async fn staged_upload(dir: &tempfile::TempDir) -> AudioUpload {
        let path = dir.path().join("recording-1.webm");
        tokio::fs::write(&path, b"webm-bytes").await.unwrap();
        AudioUpload {
            path,
            file_name: "recording-1.webm".into(),
            mime: "audio/webm".into(),
        }
    }

    #[tokio::test]
    async fn test_synthesize_returns_audio_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/audio/speech"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4o-mini-tts",
                "voice": "alloy",
                "input": "Tell me about yourself",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ID3audio".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let audio = mock_client(&server)
            .synthesize(&SpeechRequest::new("Tell me about yourself"))
            .await
            .unwrap();
        assert_eq!(&audio[..], b"ID3audio");
    }

    #[tokio::test]
    async fn test_synthesize_non_2xx_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/audio/speech"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;

        let err = mock_client(&server)
            .synthesize(&SpeechRequest::new("x"))
            .await
            .unwrap_err();
        match err {
            RelayError::Upstream { service, status, message, details } => {
                assert_eq!(service, "openai");
                assert_eq!(status, 401);
                assert_eq!(message, "Incorrect API key provided");
                assert!(details.is_some());
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_transcribe_extracts_text() {
        let dir = tempfile::tempdir().unwrap();
        let upload = staged_upload(&dir).await;
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/audio/transcriptions"))
            .and(body_string_contains("whisper-1"))
            .and(body_string_contains("recording-1.webm"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"text": "Two weeks notice"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let text = mock_client(&server).transcribe(&upload).await.unwrap();
        assert_eq!(text, "Two weeks notice");
    }

    #[tokio::test]
    async fn test_transcribe_without_text_field() {
        let dir = tempfile::tempdir().unwrap();
        let upload = staged_upload(&dir).await;
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/audio/transcriptions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let err = mock_client(&server).transcribe(&upload).await.unwrap_err();
        assert!(matches!(err, RelayError::Upstream { status: 200, .. }));
    }

    #[tokio::test]
    async fn test_transcribe_non_2xx_is_upstream_error() {
        let dir = tempfile::tempdir().unwrap();
        let upload = staged_upload(&dir).await;
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/audio/transcriptions"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {"message": "Invalid file format."}
            })))
            .mount(&server)
            .await;

        let err = mock_client(&server).transcribe(&upload).await.unwrap_err();
        assert_eq!(err.to_string(), "openai API error (400): Invalid file format.");
    }
}
