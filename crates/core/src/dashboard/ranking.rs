use crate::domain::contract::importance_scores;
use crate::domain::news::NewsItem;
use crate::llm::json;
use crate::llm::{CompletionClient, CompletionRequest};
use anyhow::Context;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

const SYSTEM_PROMPT: &str = "You are a financial news analyst. Analyze the following financial news items and rank them by importance for market investors. Return a JSON array with item IDs and importance scores from 1-100, where 100 is most important. Use the shape [{\"id\": \"<id>\", \"importance\": <1-100>}].";

const TEMPERATURE: f32 = 0.3;
const MAX_TOKENS: u32 = 800;

#[derive(Debug, Serialize)]
struct RankingInput<'a> {
    id: &'a str,
    title: &'a str,
    summary: &'a str,
}

/// Result of [`ImportanceRanker::rank`].
#[derive(Debug, Clone, PartialEq)]
pub enum Ranking {
    Ranked(Vec<NewsItem>),
    /// Ranking failed; the items are in their original order.
    Unranked(Vec<NewsItem>),
}

impl Ranking {
    pub fn is_ranked(&self) -> bool {
        matches!(self, Ranking::Ranked(_))
    }

    pub fn into_items(self) -> Vec<NewsItem> {
        match self {
            Ranking::Ranked(items) | Ranking::Unranked(items) => items,
        }
    }
}

/// Orders news by a model-assigned importance score.
#[derive(Clone)]
pub struct ImportanceRanker {
    llm: Arc<dyn CompletionClient>,
}

impl ImportanceRanker {
    pub fn new(llm: Arc<dyn CompletionClient>) -> Self {
        Self { llm }
    }

    /// Never fails: on any error the input comes back unchanged as [`Ranking::Unranked`].
    pub async fn rank(&self, items: Vec<NewsItem>, api_key: &str) -> Ranking {
        match self.try_rank(&items, api_key).await {
            Ok(ranked) => Ranking::Ranked(ranked),
            Err(err) => {
                tracing::warn!(error = %err, items = items.len(), "news ranking failed; keeping provider order");
                Ranking::Unranked(items)
            }
        }
    }

    async fn try_rank(&self, items: &[NewsItem], api_key: &str) -> anyhow::Result<Vec<NewsItem>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let projection: Vec<RankingInput<'_>> = items
            .iter()
            .map(|item| RankingInput {
                id: &item.id,
                title: &item.title,
                summary: &item.description,
            })
            .collect();
        let user = serde_json::to_string(&projection).context("failed to encode ranking input")?;

        let text = self
            .llm
            .complete(
                api_key,
                CompletionRequest {
                    system: SYSTEM_PROMPT.to_string(),
                    user,
                    temperature: TEMPERATURE,
                    max_tokens: MAX_TOKENS,
                },
            )
            .await
            .context("ranking request failed")?;

        let entries = json::parse_array(&text)?;
        let scores = importance_scores(&entries);
        tracing::debug!(
            scored = scores.len(),
            items = items.len(),
            provider = self.llm.provider_name(),
            "ranked news items"
        );
        Ok(apply_scores(items.to_vec(), &scores))
    }
}

/// Sets `importance` by id and sorts descending. The sort is stable and unscored
/// items sort last, so they keep their relative order.
pub fn apply_scores(mut items: Vec<NewsItem>, scores: &BTreeMap<String, u8>) -> Vec<NewsItem> {
    for item in &mut items {
        item.importance = scores.get(&item.id).copied();
    }
    items.sort_by(|a, b| b.importance.cmp(&a.importance));
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::testing::{news_item, FakeLlm};
    use crate::llm::json::StructuredOutputError;

    fn three_items() -> Vec<NewsItem> {
        (0..3).map(|i| news_item(&format!("news-{i}-1760500000000"), &format!("Story {i}"))).collect()
    }

    fn ids(items: &[NewsItem]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    #[tokio::test]
    async fn named_item_moves_to_front() {
        let llm = Arc::new(FakeLlm::replying(
            "Here is the ranking: [{\"id\":\"news-2-1760500000000\", \"importance\": 90}]",
        ));
        let ranker = ImportanceRanker::new(llm.clone());

        let ranking = ranker.rank(three_items(), "sk-test").await;
        assert!(ranking.is_ranked());
        let ranked = ranking.into_items();
        assert_eq!(
            ids(&ranked),
            vec!["news-2-1760500000000", "news-0-1760500000000", "news-1-1760500000000"]
        );
        assert_eq!(ranked[0].importance, Some(90));
        assert_eq!(ranked[1].importance, None);

        let requests = llm.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].max_tokens, 800);
        let sent: serde_json::Value = serde_json::from_str(&requests[0].user).unwrap();
        assert_eq!(sent[1]["id"], "news-1-1760500000000");
        assert_eq!(sent[1]["summary"], "Story 1 details");
    }

    #[tokio::test]
    async fn response_order_does_not_matter() {
        let forward = "[{\"id\":\"news-0-1760500000000\",\"importance\":40},{\"id\":\"news-1-1760500000000\",\"importance\":85},{\"id\":\"news-2-1760500000000\",\"importance\":40}]";
        let backward = "[{\"id\":\"news-2-1760500000000\",\"importance\":40},{\"id\":\"news-1-1760500000000\",\"importance\":85},{\"id\":\"news-0-1760500000000\",\"importance\":40}]";

        let a = ImportanceRanker::new(Arc::new(FakeLlm::replying(forward)))
            .rank(three_items(), "sk")
            .await
            .into_items();
        let b = ImportanceRanker::new(Arc::new(FakeLlm::replying(backward)))
            .rank(three_items(), "sk")
            .await
            .into_items();

        assert_eq!(ids(&a), ids(&b));
        assert_eq!(
            ids(&a),
            vec!["news-1-1760500000000", "news-0-1760500000000", "news-2-1760500000000"]
        );
    }

    #[tokio::test]
    async fn unparseable_reply_keeps_input_order() {
        let ranker = ImportanceRanker::new(Arc::new(FakeLlm::replying("I cannot rank news.")));
        let err = ranker.try_rank(&three_items(), "sk").await.unwrap_err();
        assert!(err.downcast_ref::<StructuredOutputError>().is_some());

        let ranking = ranker.rank(three_items(), "sk").await;
        assert!(!ranking.is_ranked());
        let ranked = ranking.into_items();
        assert_eq!(ids(&ranked), ids(&three_items()));
        assert!(ranked.iter().all(|i| i.importance.is_none()));
    }

    #[tokio::test]
    async fn call_failure_keeps_input_order() {
        let ranker = ImportanceRanker::new(Arc::new(FakeLlm::failing("status=500")));
        let ranking = ranker.rank(three_items(), "sk").await;
        assert_eq!(ranking, Ranking::Unranked(three_items()));
    }

    #[tokio::test]
    async fn empty_input_skips_the_call() {
        let llm = Arc::new(FakeLlm::replying("[]"));
        let ranking = ImportanceRanker::new(llm.clone()).rank(Vec::new(), "sk").await;
        assert_eq!(ranking, Ranking::Ranked(Vec::new()));
        assert!(llm.requests().is_empty());
    }
}
