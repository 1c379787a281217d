//! crm-relay HTTP server binary.
//!
//! # Environment Variables
//!
//! - `PORT` - HTTP port (default: 5038)
//! - `SALESFORCE_USERNAME`, `SALESFORCE_PASSWORD`, `SALESFORCE_SECURITY_TOKEN`
//! - `GEMINI_API_KEY` - text analysis
//! - `OPENAI_API_KEY` - speech synthesis and transcription
//! - `PROMPTS_FILE`, `AUDIO_DIR`, `UPLOAD_DIR`, `PUBLIC_BASE_URL`
//! - `RUST_LOG` - Tracing filter (default: "info,crm_relay=debug")
//!
//! A `.env` file in the working directory is loaded first.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin server
//! ```

use anyhow::Context;
use crm_relay::server::{app_router, AppState};
use crm_relay::RelayConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,crm_relay=debug".into()),
        )
        .init();

    let config = RelayConfig::from_env();
    let bind_addr = format!("0.0.0.0:{}", config.port);

    if config.crm.username.is_none() {
        tracing::warn!("SALESFORCE_USERNAME is not set; CRM routes will fail");
    }
    if config.gemini_api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY is not set; analysis routes will fail");
    }
    if config.openai_api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; speech routes will fail");
    }

    let state = AppState::from_config(&config);
    let app = app_router(state);

    tracing::info!("crm-relay {} starting on {}", crm_relay::VERSION, bind_addr);
    tracing::info!(
        prompts = %config.prompts_file.display(),
        audio = %config.audio_dir.display(),
        "Serving"
    );

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    axum::serve(listener, app).await.context("server failed")?;
    Ok(())
}
