use crate::config::Settings;
use crate::domain::contract::number;
use crate::domain::stock::PricePoint;
use crate::ingest::provider::{MarketDataProvider, NewsFeedProvider};
use crate::ingest::types::{FeedItem, FeedQuery, GlobalQuote, Mover};
use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

const PROVIDER: &str = "alpha_vantage";
const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co";

/// Keys Alpha Vantage uses for rate-limit notices and request errors. They arrive
/// with HTTP 200 in place of the requested payload.
const MESSAGE_KEYS: [&str; 3] = ["Note", "Information", "Error Message"];

#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    http: reqwest::Client,
    base_url: String,
}

impl AlphaVantageClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings
            .alpha_vantage_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Ok(Self::new(settings.http_client()?, base_url))
    }

    async fn query(&self, api_key: &str, params: &[(&str, &str)]) -> Result<Value> {
        let url = format!("{}/query", self.base_url.trim_end_matches('/'));
        let function = params
            .iter()
            .find(|(k, _)| *k == "function")
            .map(|(_, v)| *v)
            .unwrap_or("unknown");

        let res = self
            .http
            .get(url)
            .query(params)
            .query(&[("apikey", api_key)])
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("Alpha Vantage {function} request failed"))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(reqwest::Error::without_url)
            .context("failed to read Alpha Vantage response")?;
        if !status.is_success() {
            bail!("Alpha Vantage {function} HTTP {status}");
        }

        let raw_json = serde_json::from_str::<Value>(&text)
            .with_context(|| format!("Alpha Vantage {function} response is not valid JSON"))?;
        check_provider_message(&raw_json)?;
        Ok(raw_json)
    }
}

#[async_trait::async_trait]
impl MarketDataProvider for AlphaVantageClient {
    fn provider_name(&self) -> &'static str {
        PROVIDER
    }

    async fn top_gainers(&self, api_key: &str) -> Result<Vec<Mover>> {
        let raw = self
            .query(api_key, &[("function", "TOP_GAINERS_LOSERS")])
            .await?;
        parse_top_gainers(raw)
    }

    async fn global_quote(&self, api_key: &str, symbol: &str) -> Result<GlobalQuote> {
        let raw = self
            .query(api_key, &[("function", "GLOBAL_QUOTE"), ("symbol", symbol)])
            .await?;
        parse_global_quote(raw, symbol)
    }

    async fn daily_closes(&self, api_key: &str, symbol: &str) -> Result<Vec<PricePoint>> {
        let raw = self
            .query(
                api_key,
                &[
                    ("function", "TIME_SERIES_DAILY"),
                    ("symbol", symbol),
                    ("outputsize", "compact"),
                ],
            )
            .await?;
        parse_daily_closes(raw)
    }
}

#[async_trait::async_trait]
impl NewsFeedProvider for AlphaVantageClient {
    fn provider_name(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch_feed(&self, api_key: &str, query: &FeedQuery) -> Result<Vec<FeedItem>> {
        let limit = query.limit.to_string();
        let mut params = vec![
            ("function", "NEWS_SENTIMENT"),
            ("sort", "LATEST"),
            ("limit", limit.as_str()),
        ];
        if let Some(tickers) = query.tickers.as_deref() {
            params.push(("tickers", tickers));
        }

        let raw = self.query(api_key, &params).await?;
        parse_news_feed(raw)
    }
}

fn check_provider_message(raw: &Value) -> Result<()> {
    for key in MESSAGE_KEYS {
        if let Some(msg) = raw.get(key).and_then(Value::as_str) {
            bail!("Alpha Vantage returned {key}: {msg}");
        }
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct GlobalQuoteEnvelope {
    #[serde(rename = "Global Quote", default)]
    quote: BTreeMap<String, Value>,
}

fn parse_global_quote(raw: Value, symbol: &str) -> Result<GlobalQuote> {
    let envelope = serde_json::from_value::<GlobalQuoteEnvelope>(raw)
        .context("failed to parse GLOBAL_QUOTE response")?;
    let field = |name: &str| envelope.quote.get(name).and_then(number);

    let price = field("05. price").with_context(|| format!("no price in quote for {symbol}"))?;
    let previous_close = field("08. previous close")
        .with_context(|| format!("no previous close in quote for {symbol}"))?;

    let symbol = envelope
        .quote
        .get("01. symbol")
        .and_then(Value::as_str)
        .unwrap_or(symbol)
        .to_string();

    Ok(GlobalQuote {
        symbol,
        price,
        previous_close,
    })
}

#[derive(Debug, Deserialize)]
struct DailySeriesEnvelope {
    #[serde(rename = "Time Series (Daily)", default)]
    series: BTreeMap<String, BTreeMap<String, Value>>,
}

fn parse_daily_closes(raw: Value) -> Result<Vec<PricePoint>> {
    let envelope = serde_json::from_value::<DailySeriesEnvelope>(raw)
        .context("failed to parse TIME_SERIES_DAILY response")?;

    let mut points: Vec<PricePoint> = envelope
        .series
        .iter()
        .filter_map(|(date, bar)| {
            let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
            let close = bar.get("4. close").and_then(number)?;
            Some(PricePoint { date, close })
        })
        .collect();

    anyhow::ensure!(!points.is_empty(), "daily time series is empty");
    points.sort_by_key(|p| p.date);
    Ok(points)
}

#[derive(Debug, Deserialize)]
struct MoversEnvelope {
    top_gainers: Option<Vec<RawMover>>,
}

#[derive(Debug, Deserialize)]
struct RawMover {
    #[serde(default)]
    ticker: String,
    #[serde(default)]
    change_percentage: Value,
}

fn parse_top_gainers(raw: Value) -> Result<Vec<Mover>> {
    let envelope = serde_json::from_value::<MoversEnvelope>(raw)
        .context("failed to parse TOP_GAINERS_LOSERS response")?;
    let gainers = envelope
        .top_gainers
        .context("TOP_GAINERS_LOSERS response has no top_gainers")?;

    Ok(gainers
        .into_iter()
        .filter(|m| !m.ticker.trim().is_empty())
        .filter_map(|m| {
            Some(Mover {
                change_percentage: number(&m.change_percentage)?,
                ticker: m.ticker.trim().to_string(),
            })
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct NewsEnvelope {
    feed: Option<Vec<RawFeedItem>>,
}

#[derive(Debug, Deserialize)]
struct RawFeedItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    time_published: Option<String>,
    #[serde(default)]
    overall_sentiment_score: Value,
    #[serde(default)]
    topics: Vec<RawTopic>,
}

#[derive(Debug, Deserialize)]
struct RawTopic {
    #[serde(default)]
    topic: String,
}

fn parse_news_feed(raw: Value) -> Result<Vec<FeedItem>> {
    let envelope =
        serde_json::from_value::<NewsEnvelope>(raw).context("failed to parse NEWS_SENTIMENT response")?;
    let feed = envelope
        .feed
        .context("NEWS_SENTIMENT response has no feed array")?;

    Ok(feed
        .into_iter()
        .filter(|item| !item.title.trim().is_empty())
        .map(|item| FeedItem {
            title: item.title.trim().to_string(),
            summary: item.summary.filter(|s| !s.trim().is_empty()),
            source: item.source.filter(|s| !s.trim().is_empty()),
            url: item.url,
            published_at: item.time_published.as_deref().and_then(parse_time_published),
            sentiment_score: number(&item.overall_sentiment_score),
            topics: item
                .topics
                .into_iter()
                .map(|t| t.topic)
                .filter(|t| !t.is_empty())
                .collect(),
        })
        .collect())
}

/// `20240115T123000` (seconds optional) in UTC.
fn parse_time_published(raw: &str) -> Option<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(raw, "%Y%m%dT%H%M%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y%m%dT%H%M"))
        .ok()?;
    Some(Utc.from_utc_datetime(&naive))
}
