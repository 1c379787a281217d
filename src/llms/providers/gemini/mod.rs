//! Google Gemini text generation.
//!
//! Talks to the public Generative Language API with an API key passed as a
//! query parameter. One request per call; no retry.

use async_trait::async_trait;
use serde_json::Value;

use crate::llms::base_llm::TextGenerator;
use crate::utilities::config::DEFAULT_GEMINI_BASE_URL;
use crate::utilities::errors::{RelayError, RelayResult};


/// Gemini `generateContent` client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    api_key: Option<String>,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiClient {
    /// Create a client for `model`. A missing key fails each call, not
    /// construction.
    pub fn new(model: impl Into<String>, api_key: Option<String>, client: reqwest::Client) -> Self {
        Self {
            api_key,
            model: model.into(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            client,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn api_endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    /// Request body with the prompt as a single user part.
    pub fn build_request_body(&self, prompt: &str) -> Value {
        serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }],
            }],
        })
    }
}

/// Pull `candidates[0].content.parts[0].text` out of a response.
pub fn extract_text(response: &Value) -> RelayResult<String> {
    response
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(|t| t.as_str())
        .map(str::to_string)
        .ok_or_else(|| {
            let reason = response
                .pointer("/candidates/0/finishReason")
                .or_else(|| response.pointer("/promptFeedback/blockReason"))
                .and_then(|r| r.as_str())
                .unwrap_or("no text in response");
            RelayError::Upstream {
                service: "gemini",
                status: 200,
                message: format!("Gemini returned no text ({})", reason),
                details: Some(response.clone()),
            }
        })
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn provider(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, prompt: &str) -> RelayResult<String> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            RelayError::Config(
                "Gemini API key not set. Set GEMINI_API_KEY or GOOGLE_API_KEY.".to_string(),
            )
        })?;

        tracing::debug!(model = %self.model, prompt_chars = prompt.len(), "Gemini request");

        let response = self
            .client
            .post(self.api_endpoint())
            .query(&[("key", api_key)])
            .json(&self.build_request_body(prompt))
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            return Err(RelayError::upstream("gemini", status.as_u16(), &response_text));
        }

        let response_json: Value = serde_json::from_str(&response_text).map_err(|e| {
            RelayError::Upstream {
                service: "gemini",
                status: status.as_u16(),
                message: format!("Failed to parse Gemini response: {}", e),
                details: Some(Value::String(
                    response_text.chars().take(500).collect(),
                )),
            }
        })?;

        if let Some(usage) = response_json.get("usageMetadata") {
            tracing::debug!(
                prompt_tokens = usage.get("promptTokenCount").and_then(|v| v.as_i64()),
                completion_tokens = usage.get("candidatesTokenCount").and_then(|v| v.as_i64()),
                "Gemini usage"
            );
        }

        extract_text(&response_json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_api_endpoint() {
        let client = GeminiClient::new("gemini-2.0-flash", None, reqwest::Client::new());
        assert_eq!(
            client.api_endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
        let local = client.with_base_url("http://localhost:9000/");
        assert_eq!(
            local.api_endpoint(),
            "http://localhost:9000/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn test_build_request_body() {
        let client = GeminiClient::new("m", None, reqwest::Client::new());
        let body = client.build_request_body("Hello");
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Hello");
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn test_extract_text() {
        let response = serde_json::json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Strong candidate."}]},
                "finishReason": "STOP",
            }],
        });
        assert_eq!(extract_text(&response).unwrap(), "Strong candidate.");
    }

    #[test]
    fn test_extract_text_blocked_prompt() {
        let response = serde_json::json!({
            "promptFeedback": {"blockReason": "SAFETY"},
        });
        let err = extract_text(&response).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[tokio::test]
    async fn test_generate_without_key_is_config_error() {
        let client = GeminiClient::new("m", None, reqwest::Client::new());
        let err = client.generate("hi").await.unwrap_err();
        assert!(matches!(err, RelayError::Config(_)));
    }

    fn mock_client(server: &MockServer) -> GeminiClient {
        GeminiClient::new("gemini-2.0-flash", Some("test-key".into()), reqwest::Client::new())
            .with_base_url(server.uri())
    }

    #[tokio::test]
    async fn test_generate_happy_path() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.0-flash:generateContent"))
            .and(query_param("key", "test-key"))
            .and(body_partial_json(serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": "Assess the answer"}]}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "Solid answer."}]},
                    "finishReason": "STOP",
                }],
                "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 3},
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = mock_client(&server).generate("Assess the answer").await.unwrap();
        assert_eq!(text, "Solid answer.");
    }

    #[tokio::test]
    async fn test_generate_non_2xx_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.0-flash:generateContent"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}
            })))
            .mount(&server)
            .await;

        let err = mock_client(&server).generate("hi").await.unwrap_err();
        match err {
            RelayError::Upstream { service, status, message, details } => {
                assert_eq!(service, "gemini");
                assert_eq!(status, 400);
                assert_eq!(message, "API key not valid");
                assert_eq!(details.unwrap()["error"]["status"], "INVALID_ARGUMENT");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_generate_unparseable_success_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
            .mount(&server)
            .await;

        let err = mock_client(&server).generate("hi").await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse Gemini response"));
    }
}
