use crate::dashboard::samples;
use crate::domain::contract::LlmMarketOutlook;
use crate::domain::outlook::MarketOutlook;
use crate::llm::json;
use crate::llm::{CompletionClient, CompletionRequest};
use crate::storage::{require_key, ApiKeyKind, KeyStore};
use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;

const SYSTEM_PROMPT: &str = r#"You are a market strategist writing a short daily outlook for retail investors.
Respond with a single JSON object and nothing else, using exactly this shape:
{
  "summary": "<2-3 sentence overview of current market conditions>",
  "trend": "bullish" | "bearish" | "neutral",
  "confidence": <integer 45-85>,
  "noteworthy": [
    {"symbol": "<ticker>", "change": <percent change as a number>, "reason": "<one sentence>", "type": "surge" | "drop"}
  ],
  "factors": ["<key factor>", "..."]
}
Include 2-4 noteworthy moves and 3-5 factors."#;

const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 1000;

/// Produces the dashboard's market outlook from a chat-completion model.
#[derive(Clone)]
pub struct CommentaryGenerator {
    keys: Arc<dyn KeyStore>,
    llm: Arc<dyn CompletionClient>,
}

impl CommentaryGenerator {
    pub fn new(keys: Arc<dyn KeyStore>, llm: Arc<dyn CompletionClient>) -> Self {
        Self { keys, llm }
    }

    /// Fails with [`crate::storage::MissingApiKey`] before any request when the
    /// completion key is not set.
    pub async fn generate(&self) -> anyhow::Result<MarketOutlook> {
        let api_key = require_key(self.keys.as_ref(), ApiKeyKind::CompletionProvider)?;
        let today = Utc::now();

        let text = self
            .llm
            .complete(
                &api_key,
                CompletionRequest {
                    system: SYSTEM_PROMPT.to_string(),
                    user: format!(
                        "Write today's ({}) stock market outlook.",
                        today.format("%Y-%m-%d")
                    ),
                    temperature: TEMPERATURE,
                    max_tokens: MAX_TOKENS,
                },
            )
            .await
            .context("market outlook request failed")?;

        let raw: LlmMarketOutlook = json::parse_object(&text)?;
        let outlook = raw.validate_and_into_outlook(Utc::now())?;
        tracing::info!(
            provider = self.llm.provider_name(),
            trend = ?outlook.trend,
            confidence = outlook.confidence,
            "generated market outlook"
        );
        Ok(outlook)
    }

    /// Randomized built-in outlook for running without a completion key.
    pub fn sample(&self) -> MarketOutlook {
        samples::sample_outlook(Utc::now(), &mut rand::thread_rng())
    }
}
