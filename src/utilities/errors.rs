//! Error types for the relay.
//!
//! Every route handler returns `Result<_, RelayError>`; the `IntoResponse`
//! impl turns a failure into a JSON body so one failing route never affects
//! another.

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;
use thiserror::Error;

/// Convenience alias used across the crate.
pub type RelayResult<T> = Result<T, RelayError>;

/// Errors surfaced by the relay.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The CRM rejected a login, query or update.
    #[error("CRM error: {message}")]
    Crm {
        message: String,
        /// Raw error payload returned by the CRM, if any.
        details: Option<Value>,
    },

    /// A generative-text or speech provider answered with a non-2xx status
    /// or an unexpected body.
    #[error("{service} API error ({status}): {message}")]
    Upstream {
        service: &'static str,
        status: u16,
        message: String,
        details: Option<Value>,
    },

    /// Transport failure talking to any external service.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Caller supplied a missing or malformed field.
    #[error("{0}")]
    BadRequest(String),

    /// The addressed prompt does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Attempt to delete the protected default prompt.
    #[error("Prompt '{0}' is protected and cannot be deleted")]
    ProtectedPrompt(String),

    /// Required configuration (credential, API key) is missing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Template store failure.
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RelayError {
    /// Build an upstream error from a provider status and raw body text.
    ///
    /// The body is kept as JSON when it parses, otherwise as a string.
    pub fn upstream(service: &'static str, status: u16, body: &str) -> Self {
        let details = serde_json::from_str::<Value>(body)
            .unwrap_or_else(|_| Value::String(body.to_string()));
        let message = details
            .get("error")
            .and_then(|e| e.get("message").or(Some(e)))
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("request failed with status {}", status));
        Self::Upstream {
            service,
            status,
            message,
            details: Some(details),
        }
    }

    /// HTTP status this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::ProtectedPrompt(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn details(&self) -> Option<&Value> {
        match self {
            Self::Crm { details, .. } | Self::Upstream { details, .. } => details.as_ref(),
            _ => None,
        }
    }
}

impl From<JsonRejection> for RelayError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for RelayError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }

        let mut body = serde_json::json!({ "error": self.to_string() });
        if let Some(details) = self.details() {
            body["details"] = details.clone();
        }
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_keeps_json_body() {
        let err = RelayError::upstream(
            "gemini",
            400,
            r#"{"error": {"code": 400, "message": "API key not valid"}}"#,
        );
        match &err {
            RelayError::Upstream { message, details, .. } => {
                assert_eq!(message, "API key not valid");
                assert_eq!(details.as_ref().unwrap()["error"]["code"], 400);
            }
            other => panic!("unexpected variant: {:?}", other),
        }
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_upstream_plain_text_body() {
        let err = RelayError::upstream("openai", 502, "Bad Gateway");
        match err {
            RelayError::Upstream { message, details, .. } => {
                assert_eq!(message, "request failed with status 502");
                assert_eq!(details, Some(Value::String("Bad Gateway".into())));
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            RelayError::BadRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RelayError::ProtectedPrompt("default".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RelayError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            RelayError::Config("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
