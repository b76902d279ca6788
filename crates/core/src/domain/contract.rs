//! Model output shapes and their conversion into validated domain values.
//!
//! Fields are kept as raw JSON so that wrong types degrade to documented defaults
//! instead of failing the whole decode. Only the free-text fields are required.

use crate::domain::outlook::{MarketOutlook, MoveKind, NoteworthyMove, Trend, OUTLOOK_CONFIDENCE};
use crate::domain::recommendation::{
    Recommendation, StockRecommendation, TimeHorizon, RECOMMENDATION_CONFIDENCE,
};
use anyhow::ensure;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// Used whenever the model's confidence is missing or not a number.
pub const DEFAULT_CONFIDENCE: u8 = 70;

pub const IMPORTANCE_RANGE: RangeInclusive<u8> = 1..=100;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LlmMarketOutlook {
    #[serde(default)]
    pub summary: Value,
    #[serde(default)]
    pub trend: Value,
    #[serde(default)]
    pub confidence: Value,
    #[serde(default)]
    pub noteworthy: Value,
    #[serde(default)]
    pub factors: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LlmStockRecommendation {
    #[serde(default)]
    pub recommendation: Value,
    #[serde(default)]
    pub confidence: Value,
    #[serde(default)]
    pub reasoning: Value,
    #[serde(default, alias = "time_horizon")]
    #[serde(rename = "timeHorizon")]
    pub time_horizon: Value,
}

impl LlmMarketOutlook {
    pub fn validate_and_into_outlook(
        self,
        updated_at: DateTime<Utc>,
    ) -> anyhow::Result<MarketOutlook> {
        let summary = non_empty_text(&self.summary);
        ensure!(summary.is_some(), "model output is missing a summary");

        let noteworthy = match &self.noteworthy {
            Value::Array(entries) => entries.iter().filter_map(noteworthy_move).collect(),
            _ => Vec::new(),
        };

        let factors = match &self.factors {
            Value::Array(entries) => entries.iter().filter_map(non_empty_text).collect(),
            _ => Vec::new(),
        };

        Ok(MarketOutlook {
            summary: summary.unwrap_or_default(),
            trend: self
                .trend
                .as_str()
                .and_then(Trend::from_label)
                .unwrap_or_default(),
            confidence: clamp_confidence(&self.confidence, OUTLOOK_CONFIDENCE),
            noteworthy,
            factors,
            updated_at,
        })
    }
}

impl LlmStockRecommendation {
    pub fn validate_and_into_recommendation(self) -> anyhow::Result<StockRecommendation> {
        let reasoning = non_empty_text(&self.reasoning);
        ensure!(reasoning.is_some(), "model output is missing reasoning");

        Ok(StockRecommendation {
            recommendation: self
                .recommendation
                .as_str()
                .and_then(Recommendation::from_label)
                .unwrap_or_default(),
            confidence: clamp_confidence(&self.confidence, RECOMMENDATION_CONFIDENCE),
            reasoning: reasoning.unwrap_or_default(),
            time_horizon: self
                .time_horizon
                .as_str()
                .and_then(TimeHorizon::from_label)
                .unwrap_or_default(),
        })
    }
}

/// Rounds and clamps a model-provided confidence; non-numeric input yields [`DEFAULT_CONFIDENCE`].
pub fn clamp_confidence(raw: &Value, range: RangeInclusive<u8>) -> u8 {
    let value = number(raw)
        .map(|n| n.round())
        .unwrap_or(f64::from(DEFAULT_CONFIDENCE));
    value.clamp(f64::from(*range.start()), f64::from(*range.end())) as u8
}

/// Collects `{id, importance}` entries into a score per id.
///
/// Entries without an id or a numeric importance are skipped. Duplicate ids keep
/// the highest score, so the result does not depend on entry order.
pub fn importance_scores(entries: &[Value]) -> BTreeMap<String, u8> {
    let mut out = BTreeMap::new();
    for entry in entries {
        let id = match entry.get("id") {
            Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            _ => continue,
        };
        let Some(importance) = entry.get("importance").and_then(number) else {
            continue;
        };
        let score = importance
            .round()
            .clamp(f64::from(*IMPORTANCE_RANGE.start()), f64::from(*IMPORTANCE_RANGE.end()))
            as u8;
        out.entry(id)
            .and_modify(|s: &mut u8| *s = (*s).max(score))
            .or_insert(score);
    }
    out
}

fn noteworthy_move(entry: &Value) -> Option<NoteworthyMove> {
    let symbol = entry.get("symbol").and_then(non_empty_text)?.to_ascii_uppercase();
    let change = entry.get("change").and_then(number).unwrap_or(0.0);
    let reason = entry.get("reason").and_then(non_empty_text).unwrap_or_default();
    let kind = entry
        .get("type")
        .and_then(Value::as_str)
        .and_then(MoveKind::from_label)
        .unwrap_or_else(|| MoveKind::from_change(change));

    Some(NoteworthyMove {
        symbol,
        change,
        reason,
        kind,
    })
}

fn non_empty_text(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Accepts JSON numbers and numeric strings such as `"72"` or `"72%"`.
pub(crate) fn number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}
