use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

pub const RECOMMENDATION_CONFIDENCE: RangeInclusive<u8> = 55..=85;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRecommendation {
    pub recommendation: Recommendation,
    pub confidence: u8,
    pub reasoning: String,
    pub time_horizon: TimeHorizon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    Buy,
    Sell,
    #[default]
    Hold,
}

impl Recommendation {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "buy" => Some(Recommendation::Buy),
            "sell" => Some(Recommendation::Sell),
            "hold" => Some(Recommendation::Hold),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeHorizon {
    ShortTerm,
    #[default]
    MediumTerm,
    LongTerm,
}

impl TimeHorizon {
    pub const ALL: [TimeHorizon; 3] = [
        TimeHorizon::ShortTerm,
        TimeHorizon::MediumTerm,
        TimeHorizon::LongTerm,
    ];

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "short-term" => Some(TimeHorizon::ShortTerm),
            "medium-term" => Some(TimeHorizon::MediumTerm),
            "long-term" => Some(TimeHorizon::LongTerm),
            _ => None,
        }
    }
}
