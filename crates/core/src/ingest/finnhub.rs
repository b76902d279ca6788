use crate::config::Settings;
use crate::ingest::provider::SecondaryNewsProvider;
use crate::ingest::types::SecondaryNewsItem;
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;

const PROVIDER: &str = "finnhub";
const DEFAULT_BASE_URL: &str = "https://finnhub.io";

#[derive(Debug, Clone)]
pub struct FinnhubClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl FinnhubClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    /// `None` when no Finnhub token is configured.
    pub fn from_settings(settings: &Settings) -> Result<Option<Self>> {
        let Some(token) = settings.finnhub_api_key.clone() else {
            return Ok(None);
        };
        let base_url = settings
            .finnhub_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Ok(Some(Self::new(settings.http_client()?, base_url, token)))
    }
}

#[async_trait::async_trait]
impl SecondaryNewsProvider for FinnhubClient {
    fn provider_name(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch_general_news(&self) -> Result<Vec<SecondaryNewsItem>> {
        let url = format!("{}/api/v1/news", self.base_url.trim_end_matches('/'));
        let res = self
            .http
            .get(url)
            .query(&[("category", "general"), ("token", self.token.as_str())])
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Finnhub news request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(reqwest::Error::without_url)
            .context("failed to read Finnhub response")?;
        if !status.is_success() {
            bail!("Finnhub news HTTP {status}");
        }

        parse_news(&text)
    }
}

#[derive(Debug, Deserialize)]
struct RawNews {
    #[serde(default)]
    headline: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    url: String,
    #[serde(default)]
    datetime: Option<i64>,
}

fn parse_news(text: &str) -> Result<Vec<SecondaryNewsItem>> {
    let raw = serde_json::from_str::<Vec<RawNews>>(text)
        .context("Finnhub news response is not an array of articles")?;

    Ok(raw
        .into_iter()
        .filter(|n| !n.headline.trim().is_empty())
        .map(|n| SecondaryNewsItem {
            headline: n.headline.trim().to_string(),
            summary: n.summary.filter(|s| !s.trim().is_empty()),
            source: n.source.filter(|s| !s.trim().is_empty()),
            url: n.url,
            published_at: n
                .datetime
                .filter(|ts| *ts > 0)
                .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
        })
        .collect())
}
