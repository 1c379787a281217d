//! Axum route handlers for the relay.
//!
//! # Routes
//!
//! - `GET  /health`                       liveness check
//! - `GET  /`                             CRM login check
//! - `GET  /getJobs`, `/getJob`, `/getOpportunityDiscussed`
//! - `POST /updateJob`, `/updateOpportunityDiscussed`
//! - `GET|POST /prompts`, `PUT|DELETE /prompts/:id`
//! - `POST /processWithGemini`, `/processInternalAnswerGemini`, `/generateFifthQuestion`
//! - `POST /text-to-speech`, `/speech-to-text`
//! - `GET  /audio/*`                      synthesized audio files

use axum::{
    extract::rejection::JsonRejection,
    extract::multipart::MultipartRejection,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::state::AppState;
use crate::analysis::{AnalysisRequest, AnalysisResponse, FifthQuestionRequest, InternalAnswerRequest};
use crate::audio;
use crate::llms::{AudioUpload, SpeechRequest, Transcriber};
use crate::prompts::{PromptInput, PromptTemplate};
use crate::utilities::errors::{RelayError, RelayResult};
use crate::utilities::string_utils::non_blank;

/// Upper bound on request bodies; recordings are the largest payload.
const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Multipart field carrying the recording.
const AUDIO_FIELD: &str = "audio";

/// Build the axum router with all routes.
pub fn app_router(state: AppState) -> Router {
    let audio_files = ServeDir::new(&state.media.audio_dir);

    Router::new()
        .route("/health", get(health_handler))
        .route("/", get(login_check_handler))
        .route("/getJobs", get(get_jobs_handler))
        .route("/getJob", get(get_job_handler))
        .route("/getOpportunityDiscussed", get(get_opportunity_discussed_handler))
        .route("/updateJob", post(update_job_handler))
        .route(
            "/updateOpportunityDiscussed",
            post(update_opportunity_discussed_handler),
        )
        .route("/prompts", get(list_prompts_handler).post(create_prompt_handler))
        .route(
            "/prompts/:id",
            put(update_prompt_handler).delete(delete_prompt_handler),
        )
        .route("/processWithGemini", post(process_with_gemini_handler))
        .route(
            "/processInternalAnswerGemini",
            post(process_internal_answer_handler),
        )
        .route("/generateFifthQuestion", post(generate_fifth_question_handler))
        .route("/text-to-speech", post(text_to_speech_handler))
        .route("/speech-to-text", post(speech_to_text_handler))
        .nest_service("/audio", audio_files)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Pull a required, non-blank string out of a JSON body.
fn required_str<'a>(body: &'a Value, key: &str) -> RelayResult<&'a str> {
    non_blank(body.get(key).and_then(|v| v.as_str()))
        .ok_or_else(|| RelayError::BadRequest(format!("{} is required", key)))
}

/// GET /health
async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION,
        "service": "crm-relay",
    }))
}

/// GET / logs in to the CRM and reports the instance.
async fn login_check_handler(State(state): State<AppState>) -> RelayResult<Json<Value>> {
    let session = state.records.login().await?;
    tracing::info!(instance = %session.instance_url, "CRM login check succeeded");
    Ok(Json(serde_json::json!({
        "status": "connected",
        "instanceUrl": session.instance_url,
    })))
}

async fn get_jobs_handler(State(state): State<AppState>) -> RelayResult<Json<Value>> {
    Ok(Json(state.records.fetch_open_jobs().await?))
}

async fn get_job_handler(State(state): State<AppState>) -> RelayResult<Json<Value>> {
    Ok(Json(state.records.fetch_job().await?))
}

async fn get_opportunity_discussed_handler(
    State(state): State<AppState>,
) -> RelayResult<Json<Value>> {
    Ok(Json(state.records.fetch_opportunity_discussed().await?))
}

/// POST /updateJob `{ "Id": ..., "answer": ... }`
async fn update_job_handler(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> RelayResult<Json<Value>> {
    let Json(body) = payload?;
    let id = required_str(&body, "Id")?;
    let answer = required_str(&body, "answer")?;
    tracing::debug!(id, answer_chars = answer.len(), "Updating job");
    Ok(Json(state.records.update_job(id, answer).await?))
}

/// POST /updateOpportunityDiscussed `{ "answer": ... }`
async fn update_opportunity_discussed_handler(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> RelayResult<Json<Value>> {
    let Json(body) = payload?;
    let answer = required_str(&body, "answer")?;
    Ok(Json(state.records.update_opportunity_discussed(answer).await?))
}

async fn list_prompts_handler(State(state): State<AppState>) -> Json<Vec<PromptTemplate>> {
    Json(state.prompts.list().await)
}

async fn create_prompt_handler(
    State(state): State<AppState>,
    payload: Result<Json<PromptInput>, JsonRejection>,
) -> RelayResult<(StatusCode, Json<PromptTemplate>)> {
    let Json(input) = payload?;
    let prompt = state.prompts.create(input).await?;
    Ok((StatusCode::CREATED, Json(prompt)))
}

async fn update_prompt_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<PromptInput>, JsonRejection>,
) -> RelayResult<Json<PromptTemplate>> {
    let Json(input) = payload?;
    Ok(Json(state.prompts.update(&id, input).await?))
}

async fn delete_prompt_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> RelayResult<Json<Value>> {
    let prompt = state.prompts.delete(&id).await?;
    Ok(Json(serde_json::json!({
        "message": "Prompt deleted successfully",
        "prompt": prompt,
    })))
}

async fn process_with_gemini_handler(
    State(state): State<AppState>,
    payload: Result<Json<AnalysisRequest>, JsonRejection>,
) -> RelayResult<Json<AnalysisResponse>> {
    let Json(request) = payload?;
    Ok(Json(state.analysis.analyze(&request).await?))
}

async fn process_internal_answer_handler(
    State(state): State<AppState>,
    payload: Result<Json<InternalAnswerRequest>, JsonRejection>,
) -> RelayResult<Json<AnalysisResponse>> {
    let Json(request) = payload?;
    Ok(Json(state.analysis.review_internal_answer(&request).await?))
}

async fn generate_fifth_question_handler(
    State(state): State<AppState>,
    payload: Result<Json<FifthQuestionRequest>, JsonRejection>,
) -> RelayResult<Json<AnalysisResponse>> {
    let Json(request) = payload?;
    Ok(Json(state.analysis.fifth_question(&request).await?))
}

#[derive(Debug, Deserialize)]
struct SpeechBody {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    voice: Option<String>,
    #[serde(default)]
    instructions: Option<String>,
}

/// POST /text-to-speech: synthesize, store under the audio dir, return its URL.
async fn text_to_speech_handler(
    State(state): State<AppState>,
    payload: Result<Json<SpeechBody>, JsonRejection>,
) -> RelayResult<Json<Value>> {
    let Json(body) = payload?;
    let text = non_blank(body.text.as_deref())
        .ok_or_else(|| RelayError::BadRequest("text is required".to_string()))?;

    let mut request = SpeechRequest::new(text);
    if let Some(voice) = non_blank(body.voice.as_deref()) {
        request.voice = voice.to_string();
    }
    request.instructions = non_blank(body.instructions.as_deref()).map(str::to_string);

    let audio_bytes = state.speech.synthesize(&request).await?;

    tokio::fs::create_dir_all(&state.media.audio_dir).await?;
    let file_name = audio::speech_file_name();
    tokio::fs::write(state.media.audio_dir.join(&file_name), &audio_bytes).await?;
    tracing::info!(file = %file_name, bytes = audio_bytes.len(), "Stored synthesized speech");

    Ok(Json(serde_json::json!({
        "audioUrl": audio::audio_url(state.media.public_base_url.as_deref(), &file_name),
    })))
}

/// POST /speech-to-text: multipart upload with an `audio` file field.
async fn speech_to_text_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> RelayResult<Json<Value>> {
    let mut multipart = multipart?;
    let mut recording = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| RelayError::BadRequest(e.body_text()))?
    {
        let is_audio = field.name() == Some(AUDIO_FIELD) || field.file_name().is_some();
        if !is_audio {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let mime = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| RelayError::BadRequest(e.body_text()))?;
        recording = Some((file_name, mime, data));
        break;
    }

    let (file_name, mime, data) = match recording {
        Some(r) if !r.2.is_empty() => r,
        _ => return Err(RelayError::BadRequest("No audio file uploaded".to_string())),
    };

    let ext = audio::infer_extension(file_name.as_deref(), mime.as_deref());
    tokio::fs::create_dir_all(&state.media.upload_dir).await?;
    let path = audio::upload_path(&state.media.upload_dir, ext);

    let upload = AudioUpload {
        file_name: path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("recording")
            .to_string(),
        mime: audio::mime_for_extension(ext).to_string(),
        path,
    };
    tracing::debug!(file = %upload.file_name, bytes = data.len(), "Transcribing upload");

    let text = transcribe_staged(state.transcriber.as_ref(), &upload, &data).await?;
    Ok(Json(serde_json::json!({ "text": text })))
}

/// Stage the recording on disk, transcribe it, then delete it whatever the
/// outcome of either step.
async fn transcribe_staged(
    transcriber: &dyn Transcriber,
    upload: &AudioUpload,
    data: &[u8],
) -> RelayResult<String> {
    let result = match tokio::fs::write(&upload.path, data).await {
        Ok(()) => transcriber.transcribe(upload).await,
        Err(e) => Err(e.into()),
    };
    audio::remove_quietly(&upload.path).await;
    result
}
