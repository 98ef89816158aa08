use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::header,
    response::IntoResponse,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::assistant::{self, ChatReply};
use crate::errors::AppError;
use crate::model_router::Complexity;
use crate::routes::{ok, ApiJson, ApiResult, UserBody};
use crate::speech::AudioClip;
use crate::state::AppState;
use crate::validation::{parse_user_id, require_text};

const VOICE_APOLOGY: &str =
    "Sorry, I could not process your voice message right now. Please try again or type your question.";
/// Upper bound accepted by the hosted speech API.
const MAX_TTS_CHARS: usize = 4096;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: Option<String>,
    /// Optional routing hint: "simple", "medium" or "complex".
    pub complexity: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TtsRequest {
    pub text: Option<String>,
    pub voice: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VoiceReply {
    pub transcript: String,
    pub reply: String,
}

/// POST /api/chat
/// Returns only `{reply}`; action metadata stays in the stored history.
pub async fn handle_chat(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<UserBody<ChatRequest>>,
) -> ApiResult<ChatReply> {
    let (user_id, body) = req.into_parts()?;
    let message = require_text("message", body.message.as_deref())?;
    let complexity = body.complexity.as_deref().map(Complexity::parse);
    ok(assistant::respond(
        state.store.as_ref(),
        state.llm.as_ref(),
        user_id,
        message,
        complexity,
    )
    .await?)
}

/// POST /api/voice (multipart: `audio` file, `user_id` text)
///
/// A malformed request is a 400. Once the request is accepted, transcription
/// or chat failures answer 200 with an apology so the conversation can go on.
pub async fn handle_voice(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<VoiceReply> {
    let multipart = multipart.map_err(|e| AppError::validation(e.body_text()))?;
    let (user_id, clip) = read_voice_form(multipart).await?;

    let transcript = match state.speech.transcribe(clip).await {
        Ok(text) => text,
        Err(e) => {
            error!("Transcription failed for user {user_id}: {e}");
            return ok(VoiceReply {
                transcript: String::new(),
                reply: VOICE_APOLOGY.to_string(),
            });
        }
    };
    info!("Transcribed voice message for user {user_id}");

    let reply = match assistant::respond(
        state.store.as_ref(),
        state.llm.as_ref(),
        user_id,
        &transcript,
        None,
    )
    .await
    {
        Ok(chat) => chat.reply,
        Err(e) => {
            error!("Voice chat failed for user {user_id}: {e}");
            VOICE_APOLOGY.to_string()
        }
    };

    ok(VoiceReply { transcript, reply })
}

async fn read_voice_form(mut multipart: Multipart) -> Result<(Uuid, AudioClip), AppError> {
    let mut user_id: Option<String> = None;
    let mut clip: Option<AudioClip> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "user_id" => {
                user_id = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::validation(e.body_text()))?,
                );
            }
            "audio" => {
                let file_name = field.file_name().unwrap_or("voice.webm").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::validation(e.body_text()))?;
                clip = Some(AudioClip {
                    bytes,
                    file_name,
                    content_type,
                });
            }
            _ => {}
        }
    }

    let user_id = parse_user_id(user_id.as_deref().unwrap_or_default())?;
    let clip = clip
        .filter(|c| !c.bytes.is_empty())
        .ok_or_else(|| AppError::validation("audio is required"))?;
    Ok((user_id, clip))
}

/// POST /api/tts
/// Proxies to the speech API and returns raw MPEG audio.
pub async fn handle_tts(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<TtsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let text = require_text("text", req.text.as_deref())?;
    if text.chars().count() > MAX_TTS_CHARS {
        return Err(AppError::validation(format!(
            "text cannot exceed {MAX_TTS_CHARS} characters"
        )));
    }
    let voice = req
        .voice
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(&state.config.tts_voice);

    let audio: Bytes = state.speech.synthesize(text, voice).await?;
    Ok(([(header::CONTENT_TYPE, "audio/mpeg")], audio))
}
