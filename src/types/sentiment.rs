use serde::{Deserialize, Serialize};

/// Three-way sentiment classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub fn label(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Negative => "Negative",
            SentimentLabel::Neutral => "Neutral",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        match s {
            "Positive" => Some(SentimentLabel::Positive),
            "Negative" => Some(SentimentLabel::Negative),
            "Neutral" => Some(SentimentLabel::Neutral),
            _ => None,
        }
    }
}

/// Direction of the overall market mood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentTrend {
    Bullish,
    Bearish,
    Stable,
}

impl SentimentTrend {
    pub fn label(&self) -> &'static str {
        match self {
            SentimentTrend::Bullish => "Bullish",
            SentimentTrend::Bearish => "Bearish",
            SentimentTrend::Stable => "Stable",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        match s {
            "Bullish" => Some(SentimentTrend::Bullish),
            "Bearish" => Some(SentimentTrend::Bearish),
            "Stable" => Some(SentimentTrend::Stable),
            _ => None,
        }
    }
}

/// Sentiment of a single piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentReading {
    /// Normalized score (0-100, 50 is neutral).
    pub score: f64,
    /// Raw polarity (-1 to +1).
    pub polarity: f64,
    pub label: SentimentLabel,
    /// Author reliability (0-100) when the source knows who wrote the text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reliability: Option<u8>,
}

impl Default for SentimentReading {
    fn default() -> Self {
        Self {
            score: 50.0,
            polarity: 0.0,
            label: SentimentLabel::Neutral,
            reliability: None,
        }
    }
}

/// Aggregate sentiment over a batch of texts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSentiment {
    pub score: f64,
    pub label: SentimentLabel,
    pub trend: SentimentTrend,
    pub tweet_count: u32,
    pub positive: u32,
    pub negative: u32,
    pub neutral: u32,
    /// Mean author reliability of the readings that carry one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_reliability: Option<f64>,
}

impl Default for MarketSentiment {
    fn default() -> Self {
        Self {
            score: 50.0,
            label: SentimentLabel::Neutral,
            trend: SentimentTrend::Stable,
            tweet_count: 0,
            positive: 0,
            negative: 0,
            neutral: 0,
            average_reliability: None,
        }
    }
}

/// A stored market sentiment reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSentimentSnapshot {
    #[serde(flatten)]
    pub sentiment: MarketSentiment,
    /// Unix timestamp in milliseconds.
    pub recorded_at: i64,
}
