use crate::dashboard::news::NewsService;
use crate::dashboard::samples;
use crate::domain::contract::LlmStockRecommendation;
use crate::domain::recommendation::StockRecommendation;
use crate::domain::stock::normalize_symbol;
use crate::llm::json;
use crate::llm::{CompletionClient, CompletionRequest};
use crate::storage::{require_key, ApiKeyKind, KeyStore};
use anyhow::Context;
use std::sync::Arc;

const SYSTEM_PROMPT: &str = r#"You are an equity analyst giving a brief recommendation on a single stock.
Respond with a single JSON object and nothing else, using exactly this shape:
{
  "recommendation": "buy" | "sell" | "hold",
  "confidence": <integer 55-85>,
  "reasoning": "<2-3 sentences>",
  "timeHorizon": "short-term" | "medium-term" | "long-term"
}"#;

const TEMPERATURE: f32 = 0.5;
const MAX_TOKENS: u32 = 500;
pub const MAX_HEADLINES: usize = 5;

#[derive(Clone)]
pub struct StockAdvisor {
    keys: Arc<dyn KeyStore>,
    llm: Arc<dyn CompletionClient>,
    news: Option<Arc<NewsService>>,
}

impl StockAdvisor {
    pub fn new(
        keys: Arc<dyn KeyStore>,
        llm: Arc<dyn CompletionClient>,
        news: Option<Arc<NewsService>>,
    ) -> Self {
        Self { keys, llm, news }
    }

    /// Buy/sell/hold call for `symbol`, with recent headlines as context when
    /// the news feed has any.
    pub async fn recommend(&self, symbol: &str) -> anyhow::Result<StockRecommendation> {
        let api_key = require_key(self.keys.as_ref(), ApiKeyKind::CompletionProvider)?;
        let symbol = normalize_symbol(symbol);

        let headlines = match &self.news {
            Some(news) => news.headlines_for(&symbol, MAX_HEADLINES).await,
            None => Vec::new(),
        };

        let text = self
            .llm
            .complete(
                &api_key,
                CompletionRequest {
                    system: SYSTEM_PROMPT.to_string(),
                    user: user_prompt(&symbol, &headlines),
                    temperature: TEMPERATURE,
                    max_tokens: MAX_TOKENS,
                },
            )
            .await
            .with_context(|| format!("recommendation request failed for {symbol}"))?;

        let raw: LlmStockRecommendation = json::parse_object(&text)?;
        let recommendation = raw.validate_and_into_recommendation()?;
        tracing::info!(
            %symbol,
            headlines = headlines.len(),
            call = ?recommendation.recommendation,
            confidence = recommendation.confidence,
            "generated stock recommendation"
        );
        Ok(recommendation)
    }

    /// Canned recommendation for running without a completion key.
    pub fn sample(&self, symbol: &str) -> StockRecommendation {
        samples::sample_recommendation(&normalize_symbol(symbol), &mut rand::thread_rng())
    }
}

fn user_prompt(symbol: &str, headlines: &[String]) -> String {
    let mut prompt = format!("Give your recommendation for {symbol}.");
    if !headlines.is_empty() {
        prompt.push_str("\n\nRecent headlines:");
        for headline in headlines {
            prompt.push_str("\n- ");
            prompt.push_str(headline);
        }
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::ranking::ImportanceRanker;
    use crate::dashboard::testing::{feed_item, FakeFeed, FakeLlm};
    use crate::domain::recommendation::{Recommendation, TimeHorizon};
    use crate::storage::{MemoryKeyStore, MissingApiKey};

    const REPLY: &str = r#"{"recommendation": "BUY", "confidence": "80%", "reasoning": "Services growth offsets slower hardware.", "timeHorizon": "long-term"}"#;

    fn keys() -> Arc<dyn KeyStore> {
        Arc::new(
            MemoryKeyStore::new()
                .with_key(ApiKeyKind::CompletionProvider, "sk")
                .with_key(ApiKeyKind::NewsProvider, "av"),
        )
    }

    #[tokio::test]
    async fn missing_key_is_a_configuration_error() {
        let llm = Arc::new(FakeLlm::replying(REPLY));
        let feed = Arc::new(FakeFeed::returning(vec![feed_item("Apple beats")]));
        let store: Arc<dyn KeyStore> =
            Arc::new(MemoryKeyStore::new().with_key(ApiKeyKind::NewsProvider, "av"));
        let news = NewsService::new(store.clone(), feed.clone(), None, ImportanceRanker::new(llm.clone()));
        let advisor = StockAdvisor::new(store, llm.clone(), Some(Arc::new(news)));

        let err = advisor.recommend("AAPL").await.unwrap_err();
        assert!(err.downcast_ref::<MissingApiKey>().is_some());
        assert!(llm.requests().is_empty());
        assert!(feed.queries().is_empty());
    }

    #[tokio::test]
    async fn headlines_are_added_to_the_prompt() {
        let llm = Arc::new(FakeLlm::replying(REPLY));
        let feed = Arc::new(FakeFeed::returning(vec![
            feed_item("Apple unveils new iPhone"),
            feed_item("Apple services revenue hits record"),
        ]));
        let news = NewsService::new(keys(), feed.clone(), None, ImportanceRanker::new(llm.clone()));
        let advisor = StockAdvisor::new(keys(), llm.clone(), Some(Arc::new(news)));

        let rec = advisor.recommend("aapl").await.unwrap();
        assert_eq!(rec.recommendation, Recommendation::Buy);
        assert_eq!(rec.confidence, 80);
        assert_eq!(rec.time_horizon, TimeHorizon::LongTerm);

        assert_eq!(feed.queries()[0].tickers.as_deref(), Some("AAPL"));
        let requests = llm.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].temperature, 0.5);
        assert_eq!(requests[0].max_tokens, 500);
        assert!(requests[0].user.contains("AAPL"));
        assert!(requests[0].user.contains("- Apple services revenue hits record"));
    }

    #[tokio::test]
    async fn failed_headline_lookup_still_recommends() {
        let llm = Arc::new(FakeLlm::replying(REPLY));
        let news = NewsService::new(
            keys(),
            Arc::new(FakeFeed::failing("rate limited")),
            None,
            ImportanceRanker::new(llm.clone()),
        );
        let advisor = StockAdvisor::new(keys(), llm.clone(), Some(Arc::new(news)));

        advisor.recommend("MSFT").await.unwrap();
        assert!(!llm.requests()[0].user.contains("Recent headlines"));
    }

    #[tokio::test]
    async fn weak_fields_are_defaulted() {
        let llm = Arc::new(FakeLlm::replying(
            r#"{"recommendation": "accumulate", "confidence": 12, "reasoning": "Limited visibility."}"#,
        ));
        let rec = StockAdvisor::new(keys(), llm, None).recommend("XYZ").await.unwrap();
        assert_eq!(rec.recommendation, Recommendation::Hold);
        assert_eq!(rec.confidence, 55);
        assert_eq!(rec.time_horizon, TimeHorizon::MediumTerm);
    }

    #[tokio::test]
    async fn missing_reasoning_propagates() {
        let llm = Arc::new(FakeLlm::replying(r#"{"recommendation": "sell", "confidence": 70}"#));
        let err = StockAdvisor::new(keys(), llm, None).recommend("XYZ").await.unwrap_err();
        assert!(err.to_string().contains("reasoning"));
    }
}
