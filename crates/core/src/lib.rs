pub mod dashboard;
pub mod domain;
pub mod ingest;
pub mod llm;
pub mod storage;

pub mod config {
    use anyhow::Context;
    use std::path::PathBuf;
    use std::time::Duration;

    #[derive(Debug, Clone, Default)]
    pub struct Settings {
        pub alpha_vantage_api_key: Option<String>,
        pub alpha_vantage_base_url: Option<String>,
        pub openai_api_key: Option<String>,
        pub openai_base_url: Option<String>,
        pub openai_model: Option<String>,
        pub finnhub_api_key: Option<String>,
        pub finnhub_base_url: Option<String>,
        pub key_store_path: Option<PathBuf>,
        pub http_timeout_secs: Option<u64>,
        pub sample_analysis: bool,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let http_timeout_secs = match non_empty_var("MARKETMIND_HTTP_TIMEOUT_SECS") {
                Some(s) => Some(
                    s.parse::<u64>()
                        .with_context(|| format!("MARKETMIND_HTTP_TIMEOUT_SECS is not a number: {s}"))?,
                ),
                None => None,
            };

            Ok(Self {
                alpha_vantage_api_key: non_empty_var("ALPHA_VANTAGE_API_KEY"),
                alpha_vantage_base_url: non_empty_var("ALPHA_VANTAGE_BASE_URL"),
                openai_api_key: non_empty_var("OPENAI_API_KEY"),
                openai_base_url: non_empty_var("OPENAI_BASE_URL"),
                openai_model: non_empty_var("OPENAI_MODEL"),
                finnhub_api_key: non_empty_var("FINNHUB_API_KEY"),
                finnhub_base_url: non_empty_var("FINNHUB_BASE_URL"),
                key_store_path: non_empty_var("MARKETMIND_KEY_STORE").map(PathBuf::from),
                http_timeout_secs,
                sample_analysis: non_empty_var("MARKETMIND_SAMPLE_ANALYSIS")
                    .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                    .unwrap_or(false),
                sentry_dsn: non_empty_var("SENTRY_DSN"),
            })
        }

        /// Builds a reqwest client. No timeout is applied unless one is configured.
        pub fn http_client(&self) -> anyhow::Result<reqwest::Client> {
            let mut builder = reqwest::Client::builder();
            if let Some(secs) = self.http_timeout_secs {
                builder = builder.timeout(Duration::from_secs(secs));
            }
            builder.build().context("failed to build reqwest client")
        }
    }

    fn non_empty_var(name: &str) -> Option<String> {
        std::env::var(name)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}
