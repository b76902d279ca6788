use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockQuote {
    pub symbol: String,
    pub company_name: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    /// Daily closes, oldest first.
    pub historical_data: Vec<PricePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Normalizes user input into a ticker symbol (`" aapl "` -> `"AAPL"`).
pub fn normalize_symbol(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}
