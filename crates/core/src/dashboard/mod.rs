//! The dashboard's data services wired to the configured providers.

pub mod advisor;
pub mod classify;
pub mod commentary;
pub mod news;
pub mod ranking;
pub mod samples;
pub mod stocks;

#[cfg(test)]
pub(crate) mod testing;

use crate::config::Settings;
use crate::ingest::alpha_vantage::AlphaVantageClient;
use crate::ingest::finnhub::FinnhubClient;
use crate::ingest::provider::{MarketDataProvider, NewsFeedProvider, SecondaryNewsProvider};
use crate::llm::openai::OpenAiClient;
use crate::llm::CompletionClient;
use crate::storage::KeyStore;
use std::sync::Arc;

pub use advisor::StockAdvisor;
pub use commentary::CommentaryGenerator;
pub use news::NewsService;
pub use ranking::{ImportanceRanker, Ranking};
pub use stocks::StockService;

pub struct Dashboard {
    pub keys: Arc<dyn KeyStore>,
    pub stocks: StockService,
    pub news: Arc<NewsService>,
    pub commentary: CommentaryGenerator,
    pub advisor: StockAdvisor,
}

impl Dashboard {
    pub fn new(
        keys: Arc<dyn KeyStore>,
        market: Arc<dyn MarketDataProvider>,
        feed: Arc<dyn NewsFeedProvider>,
        secondary: Option<Arc<dyn SecondaryNewsProvider>>,
        llm: Arc<dyn CompletionClient>,
    ) -> Self {
        let news = Arc::new(NewsService::new(
            keys.clone(),
            feed,
            secondary,
            ImportanceRanker::new(llm.clone()),
        ));
        Self {
            stocks: StockService::new(keys.clone(), market),
            commentary: CommentaryGenerator::new(keys.clone(), llm.clone()),
            advisor: StockAdvisor::new(keys.clone(), llm, Some(news.clone())),
            news,
            keys,
        }
    }

    pub fn from_settings(settings: &Settings, keys: Arc<dyn KeyStore>) -> anyhow::Result<Self> {
        let alpha_vantage = Arc::new(AlphaVantageClient::from_settings(settings)?);
        let secondary: Option<Arc<dyn SecondaryNewsProvider>> = match FinnhubClient::from_settings(settings)? {
            Some(client) => Some(Arc::new(client)),
            None => {
                tracing::info!("FINNHUB_API_KEY not set; secondary news provider disabled");
                None
            }
        };
        let llm = OpenAiClient::from_settings(settings)?;
        tracing::info!(model = llm.model(), "completion client configured");

        Ok(Self::new(
            keys,
            alpha_vantage.clone(),
            alpha_vantage,
            secondary,
            Arc::new(llm),
        ))
    }
}
