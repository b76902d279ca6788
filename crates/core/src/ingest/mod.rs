pub mod alpha_vantage;
pub mod finnhub;
pub mod provider;
pub mod types;
