//! Environment-driven configuration.
//!
//! Credentials are optional at startup; a missing value only fails the
//! requests that need it.

use std::env;
use std::path::PathBuf;

/// Default port the original deployment listened on.
pub const DEFAULT_PORT: u16 = 5038;
pub const DEFAULT_LOGIN_URL: &str = "https://login.salesforce.com";
pub const DEFAULT_API_VERSION: &str = "59.0";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TTS_MODEL: &str = "gpt-4o-mini-tts";
pub const DEFAULT_STT_MODEL: &str = "whisper-1";

/// Salesforce login settings.
#[derive(Debug, Clone, Default)]
pub struct CrmCredentials {
    pub login_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub security_token: Option<String>,
    pub api_version: String,
}

impl CrmCredentials {
    /// Password with the security token appended, as the SOAP login expects.
    pub fn password_with_token(&self) -> Option<String> {
        let password = self.password.as_deref()?;
        Some(format!(
            "{}{}",
            password,
            self.security_token.as_deref().unwrap_or("")
        ))
    }
}

/// Everything the server needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub port: u16,
    pub crm: CrmCredentials,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub tts_model: String,
    pub stt_model: String,
    /// JSON file holding the prompt template collection.
    pub prompts_file: PathBuf,
    /// Directory synthesized audio is written to and served from.
    pub audio_dir: PathBuf,
    /// Directory uploaded recordings are staged in before transcription.
    pub upload_dir: PathBuf,
    /// Optional absolute prefix for returned audio URLs.
    pub public_base_url: Option<String>,
}

impl RelayConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        let port = var("PORT")
            .and_then(|p| match p.parse() {
                Ok(port) => Some(port),
                Err(_) => {
                    tracing::warn!("Ignoring invalid PORT value '{}'", p);
                    None
                }
            })
            .unwrap_or(DEFAULT_PORT);

        Self {
            port,
            crm: CrmCredentials {
                login_url: var("SALESFORCE_LOGIN_URL")
                    .unwrap_or_else(|| DEFAULT_LOGIN_URL.to_string()),
                username: var("SALESFORCE_USERNAME"),
                password: var("SALESFORCE_PASSWORD"),
                security_token: var("SALESFORCE_SECURITY_TOKEN"),
                api_version: var("SALESFORCE_API_VERSION")
                    .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            },
            gemini_api_key: var("GEMINI_API_KEY").or_else(|| var("GOOGLE_API_KEY")),
            gemini_model: var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_base_url: var("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            openai_api_key: var("OPENAI_API_KEY"),
            openai_base_url: var("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            tts_model: var("OPENAI_TTS_MODEL").unwrap_or_else(|| DEFAULT_TTS_MODEL.to_string()),
            stt_model: var("OPENAI_STT_MODEL").unwrap_or_else(|| DEFAULT_STT_MODEL.to_string()),
            prompts_file: var("PROMPTS_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("prompts.json")),
            audio_dir: var("AUDIO_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("public").join("audio")),
            upload_dir: var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(env::temp_dir),
            public_base_url: var("PUBLIC_BASE_URL"),
        }
    }
}

/// Non-empty environment variable.
fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_with_token() {
        let creds = CrmCredentials {
            password: Some("hunter2".into()),
            security_token: Some("TOKEN".into()),
            ..Default::default()
        };
        assert_eq!(creds.password_with_token().as_deref(), Some("hunter2TOKEN"));
    }

    #[test]
    fn test_password_without_token() {
        let creds = CrmCredentials {
            password: Some("hunter2".into()),
            ..Default::default()
        };
        assert_eq!(creds.password_with_token().as_deref(), Some("hunter2"));
        assert!(CrmCredentials::default().password_with_token().is_none());
    }
}
