use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub source: String,
    pub url: String,
    pub published_at: DateTime<Utc>,
    pub sentiment: Sentiment,
    pub category: Category,
    /// 1..=100, set only by the importance ranker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub importance: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl Sentiment {
    pub const THRESHOLD: f64 = 0.2;

    pub fn from_score(score: f64) -> Self {
        if score > Self::THRESHOLD {
            Sentiment::Positive
        } else if score < -Self::THRESHOLD {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    Technology,
    Energy,
    Healthcare,
    Economy,
    Retail,
    Automotive,
    #[default]
    Markets,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Technology,
        Category::Energy,
        Category::Healthcare,
        Category::Economy,
        Category::Retail,
        Category::Automotive,
        Category::Markets,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Technology => "Technology",
            Category::Energy => "Energy",
            Category::Healthcare => "Healthcare",
            Category::Economy => "Economy",
            Category::Retail => "Retail",
            Category::Automotive => "Automotive",
            Category::Markets => "Markets",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| anyhow::anyhow!("unknown news category: {s}"))
    }
}
