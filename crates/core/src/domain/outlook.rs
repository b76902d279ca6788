use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

pub const OUTLOOK_CONFIDENCE: RangeInclusive<u8> = 45..=85;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketOutlook {
    pub summary: String,
    pub trend: Trend,
    pub confidence: u8,
    pub noteworthy: Vec<NoteworthyMove>,
    pub factors: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteworthyMove {
    pub symbol: String,
    pub change: f64,
    pub reason: String,
    #[serde(rename = "type")]
    pub kind: MoveKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Bullish,
    Bearish,
    #[default]
    Neutral,
}

impl Trend {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "bullish" => Some(Trend::Bullish),
            "bearish" => Some(Trend::Bearish),
            "neutral" => Some(Trend::Neutral),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveKind {
    Surge,
    Drop,
}

impl MoveKind {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "surge" => Some(MoveKind::Surge),
            "drop" => Some(MoveKind::Drop),
            _ => None,
        }
    }

    /// Fallback when the label is missing or unrecognized.
    pub fn from_change(change: f64) -> Self {
        if change < 0.0 {
            MoveKind::Drop
        } else {
            MoveKind::Surge
        }
    }
}
