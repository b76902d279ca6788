//! Built-in data served when a provider is unavailable or no key is configured.

use crate::domain::news::{Category, NewsItem, Sentiment};
use crate::domain::outlook::{MarketOutlook, MoveKind, NoteworthyMove, Trend};
use crate::domain::recommendation::{Recommendation, StockRecommendation, TimeHorizon};
use crate::domain::stock::{PricePoint, StockQuote};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

pub const DEFAULT_POPULAR_STOCKS: [&str; 5] = ["AAPL", "MSFT", "GOOGL", "AMZN", "TSLA"];

/// Number of daily points in a synthesized history (today and the 30 days before).
pub const HISTORY_POINTS: usize = 31;

const WALK_STEP: f64 = 0.02;
const WALK_FLOOR: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnownStock {
    pub symbol: &'static str,
    pub company_name: &'static str,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    /// Starting point of the synthesized history.
    pub base_price: f64,
}

pub static KNOWN_STOCKS: [KnownStock; 5] = [
    KnownStock {
        symbol: "AAPL",
        company_name: "Apple Inc.",
        price: 187.32,
        change: 1.56,
        change_percent: 0.84,
        base_price: 185.0,
    },
    KnownStock {
        symbol: "MSFT",
        company_name: "Microsoft Corporation",
        price: 415.23,
        change: -2.45,
        change_percent: -0.59,
        base_price: 420.0,
    },
    KnownStock {
        symbol: "GOOGL",
        company_name: "Alphabet Inc.",
        price: 163.45,
        change: 0.78,
        change_percent: 0.48,
        base_price: 162.0,
    },
    KnownStock {
        symbol: "AMZN",
        company_name: "Amazon.com, Inc.",
        price: 178.95,
        change: -1.32,
        change_percent: -0.73,
        base_price: 180.0,
    },
    KnownStock {
        symbol: "TSLA",
        company_name: "Tesla, Inc.",
        price: 246.47,
        change: 5.82,
        change_percent: 2.42,
        base_price: 240.0,
    },
];

pub fn known_stock(symbol: &str) -> Option<&'static KnownStock> {
    KNOWN_STOCKS.iter().find(|s| s.symbol == symbol)
}

/// Builds a quote for `symbol` without any network access.
pub fn synthesize_quote<R: Rng + ?Sized>(symbol: &str, today: NaiveDate, rng: &mut R) -> StockQuote {
    if let Some(known) = known_stock(symbol) {
        return StockQuote {
            symbol: known.symbol.to_string(),
            company_name: known.company_name.to_string(),
            price: known.price,
            change: known.change,
            change_percent: known.change_percent,
            historical_data: random_walk(known.base_price, today, rng),
        };
    }

    let base_price = rng.gen_range(100.0..=300.0);
    let change = rng.gen_range(-2.5..=2.5);
    StockQuote {
        symbol: symbol.to_string(),
        company_name: format!("{symbol} Corporation"),
        price: base_price,
        change,
        change_percent: change / base_price * 100.0,
        historical_data: random_walk(base_price, today, rng),
    }
}

/// Daily closes ending at `today`, oldest first. Each step moves at most 2% of
/// `base_price` and never drops below 70% of it.
pub fn random_walk<R: Rng + ?Sized>(base_price: f64, today: NaiveDate, rng: &mut R) -> Vec<PricePoint> {
    let floor = base_price * WALK_FLOOR;
    let mut price = base_price;
    (0..HISTORY_POINTS)
        .rev()
        .map(|days_ago| {
            price = (price + rng.gen_range(-1.0..=1.0) * WALK_STEP * base_price).max(floor);
            PricePoint {
                date: today - Duration::days(days_ago as i64),
                close: price,
            }
        })
        .collect()
}

struct MockArticle {
    title: &'static str,
    description: &'static str,
    source: &'static str,
    hours_ago: i64,
    sentiment: Sentiment,
    category: Category,
}

static MOCK_ARTICLES: [MockArticle; 8] = [
    MockArticle {
        title: "Fed Signals Potential Rate Cut in September",
        description: "Federal Reserve Chairman Jerome Powell hinted at a potential interest rate cut in September, citing improving inflation data and concerns about the labor market.",
        source: "Financial Times",
        hours_ago: 2,
        sentiment: Sentiment::Positive,
        category: Category::Economy,
    },
    MockArticle {
        title: "Tech Stocks Slide as Semiconductor Shortage Continues",
        description: "Major tech companies experienced a significant drop in stock prices as the global semiconductor shortage shows no signs of easing, impacting production capabilities.",
        source: "Wall Street Journal",
        hours_ago: 5,
        sentiment: Sentiment::Negative,
        category: Category::Technology,
    },
    MockArticle {
        title: "Oil Prices Surge Amid Middle East Tensions",
        description: "Crude oil prices jumped more than 3% today as geopolitical tensions in the Middle East raised concerns about potential supply disruptions.",
        source: "Reuters",
        hours_ago: 7,
        sentiment: Sentiment::Negative,
        category: Category::Energy,
    },
    MockArticle {
        title: "Amazon Announces Record Prime Day Sales",
        description: "E-commerce giant Amazon reported its most successful Prime Day event ever, with sales surpassing $12 billion globally over the two-day period.",
        source: "Bloomberg",
        hours_ago: 10,
        sentiment: Sentiment::Positive,
        category: Category::Retail,
    },
    MockArticle {
        title: "Inflation Data Shows Signs of Cooling",
        description: "The latest Consumer Price Index report indicates inflation may be slowing, with the core inflation rate coming in below economists' expectations.",
        source: "CNBC",
        hours_ago: 12,
        sentiment: Sentiment::Positive,
        category: Category::Economy,
    },
    MockArticle {
        title: "Healthcare Stocks Rally Following New Medicare Policy",
        description: "Shares of major healthcare providers surged after the government announced changes to Medicare reimbursement policies that are expected to boost profits.",
        source: "MarketWatch",
        hours_ago: 18,
        sentiment: Sentiment::Positive,
        category: Category::Healthcare,
    },
    MockArticle {
        title: "European Central Bank Maintains Current Interest Rates",
        description: "The ECB voted to keep interest rates unchanged at its latest meeting, adopting a wait-and-see approach amid mixed economic signals across the Eurozone.",
        source: "Economic Times",
        hours_ago: 24,
        sentiment: Sentiment::Neutral,
        category: Category::Economy,
    },
    MockArticle {
        title: "Tesla Delivers Record Number of Vehicles in Q2",
        description: "Electric vehicle manufacturer Tesla announced record-breaking deliveries for the second quarter, exceeding analyst expectations and boosting investor confidence.",
        source: "Business Insider",
        hours_ago: 36,
        sentiment: Sentiment::Positive,
        category: Category::Automotive,
    },
];

/// The fixed eight-item list, newest first, timestamped relative to `now`.
pub fn mock_news(now: DateTime<Utc>) -> Vec<NewsItem> {
    MOCK_ARTICLES
        .iter()
        .enumerate()
        .map(|(idx, a)| NewsItem {
            id: (idx + 1).to_string(),
            title: a.title.to_string(),
            description: a.description.to_string(),
            source: a.source.to_string(),
            url: format!("https://example.com/news/{}", idx + 1),
            published_at: now - Duration::hours(a.hours_ago),
            sentiment: a.sentiment,
            category: a.category,
            importance: None,
        })
        .collect()
}

const SAMPLE_SUMMARY: &str = "Based on recent market data and news, there's downward pressure on major indices due to concerns about potential new tariffs and ongoing geopolitical tensions. Tech stocks appear particularly vulnerable this week, while defensive sectors like utilities and consumer staples may outperform. Investors should prepare for increased volatility in the coming days as markets digest new economic data releases.";

static SAMPLE_MOVES: [(&str, f64, &str, MoveKind); 4] = [
    ("NVDA", -8.54, "Facing pressure from potential new export restrictions to China", MoveKind::Drop),
    ("META", 5.27, "Rallying after positive earnings report and increased user engagement metrics", MoveKind::Surge),
    ("TSLA", -3.62, "Declining amid broader market concerns and production challenges", MoveKind::Drop),
    ("XOM", 2.85, "Gaining as oil prices rise due to heightened Middle East tensions", MoveKind::Surge),
];

static SAMPLE_FACTORS: [&str; 5] = [
    "Potential new tariffs on Chinese imports creating uncertainty",
    "Federal Reserve signals maintaining current interest rates",
    "Mixed corporate earnings with 65% of S&P 500 companies beating expectations",
    "Rising treasury yields putting pressure on growth stocks",
    "Increasing geopolitical tensions affecting global trade outlook",
];

/// Canned outlook with a random trend and a confidence in 45..=84.
pub fn sample_outlook<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> MarketOutlook {
    let roll: f64 = rng.gen();
    let trend = if roll > 0.6 {
        Trend::Bearish
    } else if roll > 0.3 {
        Trend::Bullish
    } else {
        Trend::Neutral
    };

    MarketOutlook {
        summary: SAMPLE_SUMMARY.to_string(),
        trend,
        confidence: rng.gen_range(45..85),
        noteworthy: SAMPLE_MOVES
            .iter()
            .map(|(symbol, change, reason, kind)| NoteworthyMove {
                symbol: symbol.to_string(),
                change: *change,
                reason: reason.to_string(),
                kind: *kind,
            })
            .collect(),
        factors: SAMPLE_FACTORS.iter().map(|f| f.to_string()).collect(),
        updated_at: now,
    }
}

struct Reasons {
    buy: &'static [&'static str],
    sell: &'static [&'static str],
    hold: &'static [&'static str],
}

impl Reasons {
    fn for_call(&self, call: Recommendation) -> &'static [&'static str] {
        match call {
            Recommendation::Buy => self.buy,
            Recommendation::Sell => self.sell,
            Recommendation::Hold => self.hold,
        }
    }
}

static KNOWN_REASONS: [(&str, Reasons); 3] = [
    (
        "AAPL",
        Reasons {
            buy: &[
                "Strong product ecosystem with high customer loyalty",
                "Continued growth in services revenue and wearables",
                "Stable cash flow and aggressive share buyback program",
            ],
            sell: &[
                "Slowing iPhone growth and market saturation",
                "Increasing competition in key markets",
                "Potential regulatory challenges in app store business",
            ],
            hold: &[
                "Steady performance but limited short-term catalysts",
                "Balanced risk-reward ratio at current valuation",
                "Wait for next product cycle before reassessing position",
            ],
        },
    ),
    (
        "MSFT",
        Reasons {
            buy: &[
                "Cloud business (Azure) showing strong growth momentum",
                "Successful AI integration across product suite",
                "Dominant position in enterprise software market",
            ],
            sell: &[
                "Potential slowdown in cloud growth rate",
                "High valuation relative to historical averages",
                "Facing increased competition in AI and cloud services",
            ],
            hold: &[
                "Solid fundamentals but priced for perfection",
                "Monitor upcoming earnings for growth trajectory",
                "Consider dollar-cost averaging to build position",
            ],
        },
    ),
    (
        "GOOGL",
        Reasons {
            buy: &[
                "Digital advertising recovery showing positive signs",
                "Strong position in AI with practical applications",
                "YouTube and Cloud segments driving growth",
            ],
            sell: &[
                "Regulatory concerns and potential antitrust actions",
                "Increased competition in core advertising business",
                "Rising costs for AI development pressuring margins",
            ],
            hold: &[
                "Await more clarity on regulatory environment",
                "Monitor AI monetization progress",
                "Consider rotation within tech sector",
            ],
        },
    ),
];

static DEFAULT_REASONS: Reasons = Reasons {
    buy: &[
        "Technical indicators suggest upward momentum",
        "Recent financial results exceeded analyst expectations",
        "Industry trends support continued growth",
        "Valuation appears attractive relative to peers",
    ],
    sell: &[
        "Technical analysis indicates a bearish trend",
        "Recent earnings disappointment suggests fundamental weaknesses",
        "Industry headwinds likely to impact performance",
        "Valuation appears stretched relative to growth prospects",
    ],
    hold: &[
        "Mixed signals in recent performance metrics",
        "Current price reflects fair value based on available information",
        "Monitor upcoming catalysts before adjusting position",
        "Risk-reward profile currently balanced",
    ],
};

/// Canned recommendation drawn from the per-symbol reasoning table.
pub fn sample_recommendation<R: Rng + ?Sized>(symbol: &str, rng: &mut R) -> StockRecommendation {
    let known = KNOWN_REASONS.iter().find(|(s, _)| *s == symbol).map(|(_, r)| r);

    let roll: f64 = rng.gen();
    let recommendation = if roll > 0.6 {
        Recommendation::Buy
    } else if roll > 0.3 {
        Recommendation::Sell
    } else {
        Recommendation::Hold
    };

    let reasons = known.unwrap_or(&DEFAULT_REASONS).for_call(recommendation);
    let reasoning = reasons.choose(rng).copied().unwrap_or_default().to_string();

    let confidence = if known.is_some() {
        rng.gen_range(65..85)
    } else {
        rng.gen_range(55..85)
    };

    let time_horizon = TimeHorizon::ALL
        .choose(rng)
        .copied()
        .unwrap_or_default();

    StockRecommendation {
        recommendation,
        confidence,
        reasoning,
        time_horizon,
    }
}
