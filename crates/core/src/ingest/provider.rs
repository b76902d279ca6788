use crate::domain::stock::PricePoint;
use crate::ingest::types::{FeedItem, FeedQuery, GlobalQuote, Mover, SecondaryNewsItem};
use anyhow::Result;

/// Quotes, daily closes and market movers.
#[async_trait::async_trait]
pub trait MarketDataProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn top_gainers(&self, api_key: &str) -> Result<Vec<Mover>>;

    async fn global_quote(&self, api_key: &str, symbol: &str) -> Result<GlobalQuote>;

    /// Daily closes sorted oldest first.
    async fn daily_closes(&self, api_key: &str, symbol: &str) -> Result<Vec<PricePoint>>;
}

#[async_trait::async_trait]
pub trait NewsFeedProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn fetch_feed(&self, api_key: &str, query: &FeedQuery) -> Result<Vec<FeedItem>>;
}

/// Fallback news source. Holds its own credentials.
#[async_trait::async_trait]
pub trait SecondaryNewsProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn fetch_general_news(&self) -> Result<Vec<SecondaryNewsItem>>;
}
