//! Hosted speech APIs: transcription for the voice endpoint and
//! text-to-speech for the `/api/tts` proxy.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::errors::AppError;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const TRANSCRIPTION_MODEL: &str = "whisper-1";
const TTS_MODEL: &str = "tts-1";

/// Uploaded audio as received from the client.
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub bytes: Bytes,
    pub file_name: String,
    pub content_type: String,
}

#[async_trait]
pub trait SpeechService: Send + Sync {
    async fn transcribe(&self, clip: AudioClip) -> Result<String, AppError>;
    /// Returns MPEG audio.
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Bytes, AppError>;
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[derive(Clone)]
pub struct SpeechClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl SpeechClient {
    pub fn new(api_key: Option<String>) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| AppError::Speech(e.to_string()))?;
        Ok(Self {
            client,
            api_key,
            base_url: OPENAI_BASE_URL.to_string(),
        })
    }

    fn api_key(&self) -> Result<&str, AppError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| AppError::Speech("No API key configured for speech".to_string()))
    }

    async fn error_text(response: reqwest::Response) -> AppError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        AppError::Speech(format!("Speech API error {status}: {body}"))
    }
}

#[async_trait]
impl SpeechService for SpeechClient {
    async fn transcribe(&self, clip: AudioClip) -> Result<String, AppError> {
        let api_key = self.api_key()?;
        let part = Part::bytes(clip.bytes.to_vec())
            .file_name(clip.file_name)
            .mime_str(&clip.content_type)
            .map_err(|e| AppError::Speech(e.to_string()))?;
        let form = Form::new()
            .part("file", part)
            .text("model", TRANSCRIPTION_MODEL);

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .bearer_auth(api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::Speech(e.to_string()))?;
        if !response.status().is_success() {
            return Err(Self::error_text(response).await);
        }
        let body: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| AppError::Speech(e.to_string()))?;
        debug!("Transcribed {} characters", body.text.len());
        Ok(body.text.trim().to_string())
    }

    async fn synthesize(&self, text: &str, voice: &str) -> Result<Bytes, AppError> {
        let api_key = self.api_key()?;
        let response = self
            .client
            .post(format!("{}/audio/speech", self.base_url))
            .bearer_auth(api_key)
            .json(&serde_json::json!({
                "model": TTS_MODEL,
                "input": text,
                "voice": voice,
                "response_format": "mp3",
            }))
            .send()
            .await
            .map_err(|e| AppError::Speech(e.to_string()))?;
        if !response.status().is_success() {
            return Err(Self::error_text(response).await);
        }
        response
            .bytes()
            .await
            .map_err(|e| AppError::Speech(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key_is_speech_error() {
        let client = SpeechClient::new(None).unwrap();
        let err = client.synthesize("hello", "alloy").await.unwrap_err();
        assert!(matches!(err, AppError::Speech(_)));
    }
}
