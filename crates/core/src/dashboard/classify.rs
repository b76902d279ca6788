use crate::domain::news::{Category, Sentiment};

const POSITIVE_WORDS: &[&str] = &[
    "gain", "gains", "rise", "rises", "rising", "rose", "surge", "surges", "soar", "soars",
    "jump", "jumps", "rally", "rallies", "climb", "climbs", "record", "beat", "beats", "growth",
    "profit", "profits", "boost", "boosts", "strong", "upgrade", "upgraded", "bullish", "higher",
    "optimism", "recovery", "rebound",
];

const NEGATIVE_WORDS: &[&str] = &[
    "fall", "falls", "fell", "drop", "drops", "decline", "declines", "slide", "slides", "slump",
    "plunge", "plunges", "tumble", "tumbles", "crash", "loss", "losses", "miss", "misses", "weak",
    "downgrade", "downgraded", "bearish", "lower", "fear", "fears", "concern", "concerns",
    "recession", "layoffs", "cut", "cuts", "lawsuit",
];

/// Title keywords per category, checked in table order.
const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Technology,
        &["tech", "technology", "software", "chip", "chips", "semiconductor", "ai", "cloud", "apple", "microsoft", "nvidia"],
    ),
    (
        Category::Energy,
        &["oil", "gas", "energy", "crude", "opec", "solar", "power"],
    ),
    (
        Category::Healthcare,
        &["health", "healthcare", "pharma", "drug", "biotech", "fda", "medicare", "medical", "vaccine"],
    ),
    (
        Category::Economy,
        &["fed", "inflation", "gdp", "economy", "economic", "rates", "jobs", "unemployment", "cpi", "treasury"],
    ),
    (
        Category::Retail,
        &["retail", "retailer", "consumer", "store", "stores", "shopping", "e-commerce", "sales"],
    ),
];

/// Sentiment from the provider score when present, otherwise from headline keywords.
pub fn sentiment(score: Option<f64>, headline: &str) -> Sentiment {
    match score {
        Some(score) => Sentiment::from_score(score),
        None => keyword_sentiment(headline),
    }
}

pub fn keyword_sentiment(headline: &str) -> Sentiment {
    let (mut positive, mut negative) = (0usize, 0usize);
    for word in words(headline) {
        if POSITIVE_WORDS.contains(&word.as_str()) {
            positive += 1;
        }
        if NEGATIVE_WORDS.contains(&word.as_str()) {
            negative += 1;
        }
    }

    match positive.cmp(&negative) {
        std::cmp::Ordering::Greater => Sentiment::Positive,
        std::cmp::Ordering::Less => Sentiment::Negative,
        std::cmp::Ordering::Equal => Sentiment::Neutral,
    }
}

/// Category from topic tags when the provider sent any, otherwise from the title.
pub fn category(topics: &[String], title: &str) -> Category {
    if topics.is_empty() {
        title_category(title)
    } else {
        topic_category(topics)
    }
}

pub fn topic_category(topics: &[String]) -> Category {
    let topics: Vec<String> = topics.iter().map(|t| t.to_ascii_lowercase()).collect();
    let any = |needle: &str| topics.iter().any(|t| t.contains(needle));

    if any("technology") {
        Category::Technology
    } else if any("energy") {
        Category::Energy
    } else if any("health") || any("life sciences") {
        Category::Healthcare
    } else if any("econom") {
        Category::Economy
    } else if any("retail") {
        Category::Retail
    } else {
        Category::Markets
    }
}

pub fn title_category(title: &str) -> Category {
    let words = words(title);
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| words.iter().any(|w| keywords.contains(&w.as_str())))
        .map(|(category, _)| *category)
        .unwrap_or_default()
}

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '-'))
        .map(|w| w.trim_matches('-').to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}
