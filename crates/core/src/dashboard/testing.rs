//! In-memory stand-ins for the provider and completion seams.

use crate::domain::news::{Category, NewsItem, Sentiment};
use crate::domain::stock::PricePoint;
use crate::ingest::provider::{MarketDataProvider, NewsFeedProvider, SecondaryNewsProvider};
use crate::ingest::types::{FeedItem, FeedQuery, GlobalQuote, Mover, SecondaryNewsItem};
use crate::llm::error::CompletionError;
use crate::llm::{CompletionClient, CompletionRequest};
use anyhow::{anyhow, Result};
use chrono::{TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub fn news_item(id: &str, title: &str) -> NewsItem {
    NewsItem {
        id: id.to_string(),
        title: title.to_string(),
        description: format!("{title} details"),
        source: "Test Wire".to_string(),
        url: format!("https://example.com/{id}"),
        published_at: Utc.with_ymd_and_hms(2026, 10, 15, 9, 0, 0).unwrap(),
        sentiment: Sentiment::Neutral,
        category: Category::Markets,
        importance: None,
    }
}

pub fn feed_item(title: &str) -> FeedItem {
    FeedItem {
        title: title.to_string(),
        summary: Some(format!("{title} summary")),
        source: Some("Reuters".to_string()),
        url: "https://example.com/feed".to_string(),
        published_at: None,
        sentiment_score: None,
        topics: Vec::new(),
    }
}

pub struct FakeLlm {
    reply: Result<String, String>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl FakeLlm {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(detail: &str) -> Self {
        Self {
            reply: Err(detail.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl CompletionClient for FakeLlm {
    fn provider_name(&self) -> &'static str {
        "fake"
    }

    async fn complete(&self, _api_key: &str, request: CompletionRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request);
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(detail) => Err(CompletionError::http("fake", 500, detail.clone()).into()),
        }
    }
}

pub struct FakeMarket {
    pub movers: Result<Vec<Mover>, String>,
    pub quote: Result<GlobalQuote, String>,
    pub closes: Result<Vec<PricePoint>, String>,
    calls: AtomicUsize,
}

impl FakeMarket {
    pub fn failing(detail: &str) -> Self {
        Self {
            movers: Err(detail.to_string()),
            quote: Err(detail.to_string()),
            closes: Err(detail.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl MarketDataProvider for FakeMarket {
    fn provider_name(&self) -> &'static str {
        "fake"
    }

    async fn top_gainers(&self, _api_key: &str) -> Result<Vec<Mover>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.movers.clone().map_err(|e| anyhow!(e))
    }

    async fn global_quote(&self, _api_key: &str, _symbol: &str) -> Result<GlobalQuote> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.quote.clone().map_err(|e| anyhow!(e))
    }

    async fn daily_closes(&self, _api_key: &str, _symbol: &str) -> Result<Vec<PricePoint>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.closes.clone().map_err(|e| anyhow!(e))
    }
}

pub struct FakeFeed {
    reply: Result<Vec<FeedItem>, String>,
    queries: Mutex<Vec<FeedQuery>>,
}

impl FakeFeed {
    pub fn returning(items: Vec<FeedItem>) -> Self {
        Self {
            reply: Ok(items),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(detail: &str) -> Self {
        Self {
            reply: Err(detail.to_string()),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<FeedQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl NewsFeedProvider for FakeFeed {
    fn provider_name(&self) -> &'static str {
        "fake_feed"
    }

    async fn fetch_feed(&self, _api_key: &str, query: &FeedQuery) -> Result<Vec<FeedItem>> {
        self.queries.lock().unwrap().push(query.clone());
        self.reply.clone().map_err(|e| anyhow!(e))
    }
}

pub struct FakeSecondary {
    reply: Result<Vec<SecondaryNewsItem>, String>,
    calls: AtomicUsize,
}

impl FakeSecondary {
    pub fn returning(items: Vec<SecondaryNewsItem>) -> Self {
        Self {
            reply: Ok(items),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(detail: &str) -> Self {
        Self {
            reply: Err(detail.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl SecondaryNewsProvider for FakeSecondary {
    fn provider_name(&self) -> &'static str {
        "fake_secondary"
    }

    async fn fetch_general_news(&self) -> Result<Vec<SecondaryNewsItem>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone().map_err(|e| anyhow!(e))
    }
}
