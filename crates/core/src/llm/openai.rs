use crate::config::Settings;
use crate::llm::error::CompletionError;
use crate::llm::{CompletionClient, CompletionRequest};
use anyhow::Context;
use serde::{Deserialize, Serialize};

const PROVIDER: &str = "openai";
const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Client for OpenAI-compatible `/v1/chat/completions` endpoints. The API key is
/// passed per call so the key store stays the single source of truth.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let base_url = settings
            .openai_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let model = settings
            .openai_model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Ok(Self::new(settings.http_client()?, base_url, model))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn create_chat_completion(
        &self,
        api_key: &str,
        req: ChatCompletionRequest,
    ) -> anyhow::Result<ChatCompletionResponse> {
        let url = format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'));
        let res = self
            .http
            .post(url)
            .bearer_auth(api_key)
            .json(&req)
            .send()
            .await
            .context("OpenAI request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read OpenAI response body")?;
        if !status.is_success() {
            return Err(CompletionError::http(PROVIDER, status.as_u16(), text).into());
        }

        serde_json::from_str::<ChatCompletionResponse>(&text).map_err(|e| {
            CompletionError::decode(
                PROVIDER,
                format!("failed to decode chat completion response: {e}"),
                Some(text),
            )
            .into()
        })
    }

    fn response_text(res: &ChatCompletionResponse) -> anyhow::Result<String> {
        let choice = res
            .choices
            .first()
            .ok_or_else(|| CompletionError::decode(PROVIDER, "response has no choices", None))?;

        if matches!(choice.finish_reason.as_deref(), Some("length")) {
            tracing::warn!("OpenAI finish_reason=length; output may be truncated");
        }

        match choice.message.content.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => Ok(text.to_string()),
            _ => Err(CompletionError::decode(PROVIDER, "first choice has no message content", None).into()),
        }
    }
}

#[async_trait::async_trait]
impl CompletionClient for OpenAiClient {
    fn provider_name(&self) -> &'static str {
        PROVIDER
    }

    async fn complete(&self, api_key: &str, request: CompletionRequest) -> anyhow::Result<String> {
        tracing::debug!(
            model = %self.model,
            max_tokens = request.max_tokens,
            temperature = request.temperature,
            "requesting chat completion"
        );

        let req = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system",
                    content: request.system,
                },
                Message {
                    role: "user",
                    content: request.user,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let res = self.create_chat_completion(api_key, req).await?;
        Self::response_text(&res)
    }
}

#[derive(Debug, Clone, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Clone, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
struct Choice {
    message: ChoiceMessage,

    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}
