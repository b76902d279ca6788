use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current price and previous close for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalQuote {
    pub symbol: String,
    pub price: f64,
    pub previous_close: f64,
}

/// One entry of the provider's "top gainers" list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mover {
    pub ticker: String,
    pub change_percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedQuery {
    /// Comma-separated ticker filter.
    pub tickers: Option<String>,
    pub limit: u32,
}

/// A primary-feed article before classification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedItem {
    pub title: String,
    pub summary: Option<String>,
    pub source: Option<String>,
    pub url: String,
    pub published_at: Option<DateTime<Utc>>,
    pub sentiment_score: Option<f64>,
    pub topics: Vec<String>,
}

/// A secondary-provider article before classification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecondaryNewsItem {
    pub headline: String,
    pub summary: Option<String>,
    pub source: Option<String>,
    pub url: String,
    pub published_at: Option<DateTime<Utc>>,
}
