use crate::dashboard::samples::{self, DEFAULT_POPULAR_STOCKS, HISTORY_POINTS};
use crate::domain::stock::{normalize_symbol, PricePoint, StockQuote};
use crate::ingest::provider::MarketDataProvider;
use crate::ingest::types::{GlobalQuote, Mover};
use crate::storage::{ApiKeyKind, KeyStore};
use anyhow::{Context, Result};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

const POPULAR_COUNT: usize = 5;

pub struct StockService {
    keys: Arc<dyn KeyStore>,
    market: Arc<dyn MarketDataProvider>,
}

impl StockService {
    pub fn new(keys: Arc<dyn KeyStore>, market: Arc<dyn MarketDataProvider>) -> Self {
        Self { keys, market }
    }

    /// Today's top gainers, or the default list when the provider can't answer.
    pub async fn fetch_popular_stocks(&self) -> Vec<String> {
        let key = self.keys.get(ApiKeyKind::NewsProvider);
        if key.is_empty() {
            return default_popular();
        }

        match self.market.top_gainers(&key).await {
            Ok(movers) => {
                let symbols = top_symbols(movers, POPULAR_COUNT);
                if symbols.is_empty() {
                    tracing::warn!(provider = self.market.provider_name(), "top gainers list is empty");
                    default_popular()
                } else {
                    symbols
                }
            }
            Err(err) => {
                tracing::warn!(
                    provider = self.market.provider_name(),
                    error = %err,
                    "top gainers lookup failed"
                );
                default_popular()
            }
        }
    }

    /// Never fails: without a key or on any provider error a synthesized quote is returned.
    pub async fn fetch_stock_data(&self, symbol: &str) -> StockQuote {
        let symbol = normalize_symbol(symbol);
        let key = self.keys.get(ApiKeyKind::NewsProvider);
        if !key.is_empty() {
            match self.fetch_live(&key, &symbol).await {
                Ok(quote) => return quote,
                Err(err) => tracing::warn!(
                    %symbol,
                    provider = self.market.provider_name(),
                    error = %err,
                    "live quote failed; using synthesized data"
                ),
            }
        }

        let mut rng = StdRng::from_entropy();
        samples::synthesize_quote(&symbol, Utc::now().date_naive(), &mut rng)
    }

    async fn fetch_live(&self, key: &str, symbol: &str) -> Result<StockQuote> {
        let quote = self
            .market
            .global_quote(key, symbol)
            .await
            .context("global quote")?;
        let closes = self
            .market
            .daily_closes(key, symbol)
            .await
            .context("daily series")?;
        Ok(build_live_quote(symbol, quote, closes))
    }
}

/// Highest change percentage first.
pub fn top_symbols(mut movers: Vec<Mover>, count: usize) -> Vec<String> {
    movers.sort_by(|a, b| b.change_percentage.total_cmp(&a.change_percentage));
    movers.into_iter().take(count).map(|m| m.ticker).collect()
}

/// `closes` must be oldest first; only the most recent points are kept.
pub fn build_live_quote(symbol: &str, quote: GlobalQuote, mut closes: Vec<PricePoint>) -> StockQuote {
    let change = quote.price - quote.previous_close;
    let change_percent = if quote.previous_close == 0.0 {
        0.0
    } else {
        change / quote.previous_close * 100.0
    };

    if closes.len() > HISTORY_POINTS {
        closes.drain(..closes.len() - HISTORY_POINTS);
    }

    StockQuote {
        symbol: symbol.to_string(),
        company_name: samples::known_stock(symbol)
            .map(|s| s.company_name.to_string())
            .unwrap_or_else(|| symbol.to_string()),
        price: quote.price,
        change,
        change_percent,
        historical_data: closes,
    }
}

fn default_popular() -> Vec<String> {
    DEFAULT_POPULAR_STOCKS.iter().map(|s| s.to_string()).collect()
}
