/// LLM Client: the single point of entry for all hosted model calls.
///
/// No other module may call a provider API directly. The model itself is
/// chosen per request by `model_router`; this module only speaks the wire
/// protocols.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::model_router::{ModelConfig, Provider};

pub mod prompts;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("No API key configured for {0:?}")]
    MissingKey(Provider),
}

/// One conversation turn, `role` being "user" or "assistant".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatTurn {
    pub role: &'static str,
    pub content: String,
}

/// Chat completion seam. `AppState` carries an `Arc<dyn ChatModel>`.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(
        &self,
        config: &ModelConfig,
        system: &str,
        turns: &[ChatTurn],
    ) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: &'a [ChatTurn],
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
    usage: AnthropicUsage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

impl AnthropicResponse {
    fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<OpenAiMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct OpenAiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoiceMessage {
    content: Option<String>,
}

/// Both providers wrap error text in `{"error": {"message": ...}}`.
#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

/// HTTP client for the hosted chat providers.
/// Retries on 429 and 5xx with exponential backoff.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    anthropic_api_key: Option<String>,
    openai_api_key: Option<String>,
}

impl LlmClient {
    pub fn new(
        anthropic_api_key: Option<String>,
        openai_api_key: Option<String>,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()?,
            anthropic_api_key,
            openai_api_key,
        })
    }

    async fn call_anthropic(
        &self,
        config: &ModelConfig,
        system: &str,
        turns: &[ChatTurn],
    ) -> Result<String, LlmError> {
        let api_key = self
            .anthropic_api_key
            .as_deref()
            .ok_or(LlmError::MissingKey(Provider::Anthropic))?;
        let body = AnthropicRequest {
            model: config.model,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            system,
            messages: turns,
        };
        let response: AnthropicResponse = self
            .send_with_retry(|| {
                self.client
                    .post(ANTHROPIC_API_URL)
                    .header("x-api-key", api_key)
                    .header("anthropic-version", ANTHROPIC_VERSION)
                    .json(&body)
            })
            .await?;
        debug!(
            "Anthropic call succeeded: model={}, input_tokens={}, output_tokens={}",
            config.model, response.usage.input_tokens, response.usage.output_tokens
        );
        response
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }

    async fn call_openai(
        &self,
        config: &ModelConfig,
        system: &str,
        turns: &[ChatTurn],
    ) -> Result<String, LlmError> {
        let api_key = self
            .openai_api_key
            .as_deref()
            .ok_or(LlmError::MissingKey(Provider::OpenAi))?;
        let mut messages = Vec::with_capacity(turns.len() + 1);
        messages.push(OpenAiMessage {
            role: "system",
            content: system,
        });
        messages.extend(turns.iter().map(|t| OpenAiMessage {
            role: t.role,
            content: &t.content,
        }));
        let body = OpenAiRequest {
            model: config.model,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            messages,
        };
        let response: OpenAiResponse = self
            .send_with_retry(|| self.client.post(OPENAI_CHAT_URL).bearer_auth(api_key).json(&body))
            .await?;
        debug!("OpenAI call succeeded: model={}", config.model);
        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(LlmError::EmptyContent)
    }

    async fn send_with_retry<T, F>(&self, build: F) -> Result<T, LlmError>
    where
        T: serde::de::DeserializeOwned,
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match build().send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ProviderError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            return Ok(response.json().await?);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

#[async_trait]
impl ChatModel for LlmClient {
    async fn complete(
        &self,
        config: &ModelConfig,
        system: &str,
        turns: &[ChatTurn],
    ) -> Result<String, LlmError> {
        match config.provider {
            Provider::Anthropic => self.call_anthropic(config, system, turns).await,
            Provider::OpenAi => self.call_openai(config, system, turns).await,
        }
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
