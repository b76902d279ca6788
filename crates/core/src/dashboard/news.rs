use crate::dashboard::classify;
use crate::dashboard::ranking::{ImportanceRanker, Ranking};
use crate::dashboard::samples;
use crate::domain::news::{Category, NewsItem};
use crate::ingest::provider::{NewsFeedProvider, SecondaryNewsProvider};
use crate::ingest::types::{FeedItem, FeedQuery, SecondaryNewsItem};
use crate::storage::{ApiKeyKind, KeyStore};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Cap applied whenever the list is not importance-ranked.
pub const NEWS_LIMIT: usize = 20;

const FEED_LIMIT: u32 = 50;
const NO_DESCRIPTION: &str = "No description available";
const DEFAULT_SOURCE: &str = "Financial News";

pub struct NewsService {
    keys: Arc<dyn KeyStore>,
    feed: Arc<dyn NewsFeedProvider>,
    secondary: Option<Arc<dyn SecondaryNewsProvider>>,
    ranker: ImportanceRanker,
}

impl NewsService {
    pub fn new(
        keys: Arc<dyn KeyStore>,
        feed: Arc<dyn NewsFeedProvider>,
        secondary: Option<Arc<dyn SecondaryNewsProvider>>,
        ranker: ImportanceRanker,
    ) -> Self {
        Self {
            keys,
            feed,
            secondary,
            ranker,
        }
    }

    /// Primary feed, then the secondary provider, then the built-in list.
    /// Live results are importance-ranked when a completion key is set.
    pub async fn fetch_news(&self) -> Vec<NewsItem> {
        let now = Utc::now();
        let Some(mut items) = self.fetch_live(now).await else {
            tracing::info!("serving built-in news list");
            return samples::mock_news(now);
        };

        let completion_key = self.keys.get(ApiKeyKind::CompletionProvider);
        if !completion_key.is_empty() {
            match self.ranker.rank(items, &completion_key).await {
                Ranking::Ranked(ranked) => return ranked,
                Ranking::Unranked(unranked) => items = unranked,
            }
        }

        items.truncate(NEWS_LIMIT);
        items
    }

    /// Recent primary-feed headlines about `symbol`. Empty when unavailable.
    pub async fn headlines_for(&self, symbol: &str, limit: usize) -> Vec<String> {
        let key = self.keys.get(ApiKeyKind::NewsProvider);
        if key.is_empty() || limit == 0 {
            return Vec::new();
        }

        let query = FeedQuery {
            tickers: Some(symbol.to_string()),
            limit: u32::try_from(limit).unwrap_or(FEED_LIMIT),
        };
        match self.feed.fetch_feed(&key, &query).await {
            Ok(items) => items.into_iter().map(|i| i.title).take(limit).collect(),
            Err(err) => {
                tracing::warn!(%symbol, error = %err, "headline lookup failed");
                Vec::new()
            }
        }
    }

    async fn fetch_live(&self, now: DateTime<Utc>) -> Option<Vec<NewsItem>> {
        let key = self.keys.get(ApiKeyKind::NewsProvider);
        if key.is_empty() {
            tracing::debug!("news provider key not set; skipping primary feed");
        } else {
            let query = FeedQuery {
                tickers: None,
                limit: FEED_LIMIT,
            };
            match self.feed.fetch_feed(&key, &query).await {
                Ok(items) if !items.is_empty() => return Some(normalize_feed(items, now)),
                Ok(_) => tracing::warn!(provider = self.feed.provider_name(), "news feed is empty"),
                Err(err) => tracing::warn!(
                    provider = self.feed.provider_name(),
                    error = %err,
                    "news feed failed"
                ),
            }
        }

        let secondary = self.secondary.as_ref()?;
        match secondary.fetch_general_news().await {
            Ok(items) if !items.is_empty() => Some(normalize_secondary(items, now)),
            Ok(_) => {
                tracing::warn!(provider = secondary.provider_name(), "secondary news is empty");
                None
            }
            Err(err) => {
                tracing::warn!(
                    provider = secondary.provider_name(),
                    error = %err,
                    "secondary news failed"
                );
                None
            }
        }
    }
}

/// Keeps provider order. Ids are `news-{position}-{fetch millis}`.
pub fn normalize_feed(items: Vec<FeedItem>, now: DateTime<Utc>) -> Vec<NewsItem> {
    let stamp = now.timestamp_millis();
    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| NewsItem {
            id: format!("news-{idx}-{stamp}"),
            sentiment: classify::sentiment(item.sentiment_score, &item.title),
            category: classify::category(&item.topics, &item.title),
            description: item.summary.unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            source: item.source.unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
            url: item.url,
            published_at: item.published_at.unwrap_or(now),
            title: item.title,
            importance: None,
        })
        .collect()
}

/// Newest first; the secondary provider sends no scores or topics.
pub fn normalize_secondary(mut items: Vec<SecondaryNewsItem>, now: DateTime<Utc>) -> Vec<NewsItem> {
    items.sort_by(|a, b| b.published_at.unwrap_or(now).cmp(&a.published_at.unwrap_or(now)));
    let stamp = now.timestamp_millis();
    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| NewsItem {
            id: format!("news-{idx}-{stamp}"),
            sentiment: classify::sentiment(None, &item.headline),
            category: classify::title_category(&item.headline),
            description: item.summary.unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            source: item.source.unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
            url: item.url,
            published_at: item.published_at.unwrap_or(now),
            title: item.headline,
            importance: None,
        })
        .collect()
}

pub fn filter_by_category(items: Vec<NewsItem>, category: Option<Category>) -> Vec<NewsItem> {
    match category {
        Some(category) => items.into_iter().filter(|i| i.category == category).collect(),
        None => items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::testing::{feed_item, FakeFeed, FakeLlm, FakeSecondary};
    use crate::domain::news::Sentiment;
    use crate::storage::MemoryKeyStore;
    use chrono::{Duration, TimeZone};

    struct Fixture {
        feed: Arc<FakeFeed>,
        secondary: Arc<FakeSecondary>,
        llm: Arc<FakeLlm>,
        service: NewsService,
    }

    fn fixture(keys: MemoryKeyStore, feed: FakeFeed, secondary: FakeSecondary, llm: FakeLlm) -> Fixture {
        let feed = Arc::new(feed);
        let secondary = Arc::new(secondary);
        let llm = Arc::new(llm);
        let service = NewsService::new(
            Arc::new(keys),
            feed.clone(),
            Some(secondary.clone()),
            ImportanceRanker::new(llm.clone()),
        );
        Fixture {
            feed,
            secondary,
            llm,
            service,
        }
    }

    fn feed_of(n: usize) -> Vec<FeedItem> {
        (0..n).map(|i| feed_item(&format!("Headline {i}"))).collect()
    }

    #[tokio::test]
    async fn all_sources_failing_yields_mock_list() {
        let f = fixture(
            MemoryKeyStore::new().with_key(ApiKeyKind::NewsProvider, "av"),
            FakeFeed::failing("HTTP 500"),
            FakeSecondary::failing("HTTP 500"),
            FakeLlm::replying("[]"),
        );

        let items = f.service.fetch_news().await;
        assert_eq!(items.len(), 8);
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4", "5", "6", "7", "8"]);
        assert_eq!(items[0].title, "Fed Signals Potential Rate Cut in September");
        assert_eq!(f.secondary.calls(), 1);
        assert!(f.llm.requests().is_empty());
    }

    #[tokio::test]
    async fn missing_key_goes_straight_to_secondary() {
        let older = Utc.with_ymd_and_hms(2026, 10, 14, 8, 0, 0).unwrap();
        let newer = older + Duration::hours(3);
        let f = fixture(
            MemoryKeyStore::new(),
            FakeFeed::returning(feed_of(3)),
            FakeSecondary::returning(vec![
                SecondaryNewsItem {
                    headline: "Retail sales slump".to_string(),
                    url: "https://example.com/old".to_string(),
                    published_at: Some(older),
                    ..Default::default()
                },
                SecondaryNewsItem {
                    headline: "Oil prices jump".to_string(),
                    source: Some("CNBC".to_string()),
                    url: "https://example.com/new".to_string(),
                    published_at: Some(newer),
                    ..Default::default()
                },
            ]),
            FakeLlm::replying("[]"),
        );

        let items = f.service.fetch_news().await;
        assert!(f.feed.queries().is_empty());
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "Oil prices jump");
        assert_eq!(items[0].category, Category::Energy);
        assert_eq!(items[0].sentiment, Sentiment::Positive);
        assert_eq!(items[1].sentiment, Sentiment::Negative);
        assert_eq!(items[1].source, DEFAULT_SOURCE);
        assert_eq!(items[1].description, NO_DESCRIPTION);
        assert!(items[0].id.starts_with("news-0-"));
    }

    #[tokio::test]
    async fn unranked_live_news_is_capped() {
        let f = fixture(
            MemoryKeyStore::new().with_key(ApiKeyKind::NewsProvider, "av"),
            FakeFeed::returning(feed_of(50)),
            FakeSecondary::failing("unused"),
            FakeLlm::replying("[]"),
        );

        let items = f.service.fetch_news().await;
        assert_eq!(items.len(), NEWS_LIMIT);
        assert_eq!(items[0].title, "Headline 0");
        assert_eq!(f.feed.queries()[0].limit, 50);
        assert_eq!(f.secondary.calls(), 0);
        assert!(f.llm.requests().is_empty());
    }

    #[tokio::test]
    async fn failed_ranking_caps_live_news() {
        let f = fixture(
            MemoryKeyStore::new()
                .with_key(ApiKeyKind::NewsProvider, "av")
                .with_key(ApiKeyKind::CompletionProvider, "sk"),
            FakeFeed::returning(feed_of(25)),
            FakeSecondary::failing("unused"),
            FakeLlm::replying("ok"),
        );
        let items = f.service.fetch_news().await;
        assert_eq!(items.len(), NEWS_LIMIT);
        assert_eq!(f.llm.requests().len(), 1);
    }

    #[tokio::test]
    async fn successful_ranking_skips_the_cap() {
        let f = fixture(
            MemoryKeyStore::new()
                .with_key(ApiKeyKind::NewsProvider, "av")
                .with_key(ApiKeyKind::CompletionProvider, "sk"),
            FakeFeed::returning(feed_of(25)),
            FakeSecondary::failing("unused"),
            FakeLlm::replying("[]"),
        );

        let items = f.service.fetch_news().await;
        assert_eq!(items.len(), 25);
        assert_eq!(items[0].title, "Headline 0");
        assert!(items.iter().all(|i| i.importance.is_none()));
    }

    #[tokio::test]
    async fn ranked_news_is_reordered_and_uncapped() {
        // Ids carry the fetch time, so scores are attached to the ids found in the request.
        struct ScoringLlm;

        #[async_trait::async_trait]
        impl crate::llm::CompletionClient for ScoringLlm {
            fn provider_name(&self) -> &'static str {
                "scoring"
            }

            async fn complete(
                &self,
                _api_key: &str,
                request: crate::llm::CompletionRequest,
            ) -> anyhow::Result<String> {
                let sent: Vec<serde_json::Value> = serde_json::from_str(&request.user)?;
                let id = |pos: usize| sent[pos]["id"].as_str().unwrap_or_default().to_string();
                Ok(serde_json::json!([
                    {"id": id(24), "importance": 95},
                    {"id": id(3), "importance": 60},
                ])
                .to_string())
            }
        }

        let service = NewsService::new(
            Arc::new(
                MemoryKeyStore::new()
                    .with_key(ApiKeyKind::NewsProvider, "av")
                    .with_key(ApiKeyKind::CompletionProvider, "sk"),
            ),
            Arc::new(FakeFeed::returning(feed_of(25))),
            None,
            ImportanceRanker::new(Arc::new(ScoringLlm)),
        );

        let items = service.fetch_news().await;
        assert_eq!(items.len(), 25);
        assert_eq!(items[0].title, "Headline 24");
        assert_eq!(items[0].importance, Some(95));
        assert_eq!(items[1].title, "Headline 3");
        assert_eq!(items[2].title, "Headline 0");
        assert_eq!(items[2].importance, None);
    }

    #[test]
    fn feed_items_are_classified() {
        let now = Utc.with_ymd_and_hms(2026, 10, 15, 12, 0, 0).unwrap();
        let mut scored = feed_item("Chipmakers slide");
        scored.sentiment_score = Some(0.4);
        scored.topics = vec!["Technology".to_string()];
        let mut bare = feed_item("FDA approval boosts biotech shares");
        bare.summary = None;
        bare.source = None;

        let items = normalize_feed(vec![scored, bare], now);
        assert_eq!(items[0].id, format!("news-0-{}", now.timestamp_millis()));
        assert_eq!(items[0].sentiment, Sentiment::Positive);
        assert_eq!(items[0].category, Category::Technology);
        assert_eq!(items[0].published_at, now);
        assert_eq!(items[1].sentiment, Sentiment::Positive);
        assert_eq!(items[1].category, Category::Healthcare);
        assert_eq!(items[1].description, NO_DESCRIPTION);
        assert_eq!(items[1].source, DEFAULT_SOURCE);
    }

    #[test]
    fn filters_by_category() {
        let items = samples::mock_news(Utc::now());
        let economy = filter_by_category(items.clone(), Some(Category::Economy));
        assert_eq!(economy.len(), 3);
        assert_eq!(filter_by_category(items, None).len(), 8);
    }

    #[tokio::test]
    async fn headlines_use_ticker_filter() {
        let f = fixture(
            MemoryKeyStore::new().with_key(ApiKeyKind::NewsProvider, "av"),
            FakeFeed::returning(feed_of(8)),
            FakeSecondary::failing("unused"),
            FakeLlm::replying("[]"),
        );

        let headlines = f.service.headlines_for("AAPL", 5).await;
        assert_eq!(headlines.len(), 5);
        let query = &f.feed.queries()[0];
        assert_eq!(query.tickers.as_deref(), Some("AAPL"));
        assert_eq!(query.limit, 5);
    }

    #[tokio::test]
    async fn headlines_are_empty_without_key() {
        let f = fixture(
            MemoryKeyStore::new(),
            FakeFeed::returning(feed_of(8)),
            FakeSecondary::failing("unused"),
            FakeLlm::replying("[]"),
        );
        assert!(f.service.headlines_for("AAPL", 5).await.is_empty());
        assert!(f.feed.queries().is_empty());
    }
}
