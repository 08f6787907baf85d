//! Sentiment scoring for social-media text.
//!
//! Text is scored with a small finance lexicon into a polarity in [-1, 1],
//! which is then normalized onto the 0-100 scale the prediction model uses
//! (50 is neutral).

use crate::services::round_to;
use crate::types::{MarketSentiment, SentimentLabel, SentimentReading, SentimentTrend};

/// Neutral sentiment score.
pub const NEUTRAL_SCORE: f64 = 50.0;

/// Polarity beyond which text counts as positive or negative.
const LABEL_THRESHOLD: f64 = 0.1;

/// Market mood thresholds on the 0-100 scale.
const BULLISH_MARKET: f64 = 60.0;
const BEARISH_MARKET: f64 = 40.0;

const BULLISH_WORDS: &[&str] = &[
    "bullish", "bull", "buy", "buying", "calls", "moon", "rocket", "rally", "breakout",
    "long", "green", "gain", "gains", "profit", "profits", "strong", "surge", "soar",
    "up", "upgrade", "beat", "beats", "record", "growth", "outperform", "good", "great",
    "positive", "win", "winning",
];

const BEARISH_WORDS: &[&str] = &[
    "bearish", "bear", "sell", "selling", "puts", "crash", "dump", "short", "red", "loss",
    "losses", "weak", "drop", "drops", "fall", "falls", "decline", "correction", "down",
    "downgrade", "miss", "misses", "plunge", "fear", "bad", "negative", "risk", "fraud",
    "lose", "losing",
];

const NEGATORS: &[&str] = &["not", "no", "never", "dont", "don't", "isnt", "isn't", "wont", "won't"];

/// Map a raw polarity (-1 to +1) onto the 0-100 scale with a label.
///
/// `score = (polarity + 1) * 50`; the label is Positive above +0.1,
/// Negative below -0.1, Neutral otherwise.
pub fn normalize(polarity: f64) -> SentimentReading {
    let polarity = if polarity.is_finite() {
        polarity.clamp(-1.0, 1.0)
    } else {
        0.0
    };

    let label = if polarity > LABEL_THRESHOLD {
        SentimentLabel::Positive
    } else if polarity < -LABEL_THRESHOLD {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    };

    SentimentReading {
        score: (polarity + 1.0) * 50.0,
        polarity,
        label,
        reliability: None,
    }
}

/// Strip URLs, mentions and hashtag markers, and collapse whitespace.
pub fn clean_tweet_text(text: &str) -> String {
    text.split_whitespace()
        .filter(|word| {
            !(word.starts_with("http://")
                || word.starts_with("https://")
                || word.starts_with("www.")
                || word.starts_with('@'))
        })
        .map(|word| word.trim_start_matches('#'))
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lexicon polarity of a text in [-1, 1].
///
/// `(positive - negative) / (positive + negative)` over lexicon hits, where
/// a negator directly before a lexicon word flips it. 0 when no word hits.
pub fn polarity(text: &str) -> f64 {
    let tokens: Vec<String> = text
        .split_whitespace()
        .map(|t| {
            t.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
                .to_lowercase()
        })
        .filter(|t| !t.is_empty())
        .collect();

    let mut positive = 0u32;
    let mut negative = 0u32;

    for (i, token) in tokens.iter().enumerate() {
        let direction = if BULLISH_WORDS.contains(&token.as_str()) {
            1
        } else if BEARISH_WORDS.contains(&token.as_str()) {
            -1
        } else {
            continue;
        };

        let negated = i > 0 && NEGATORS.contains(&tokens[i - 1].as_str());
        match (direction, negated) {
            (1, false) | (-1, true) => positive += 1,
            _ => negative += 1,
        }
    }

    let total = positive + negative;
    if total == 0 {
        return 0.0;
    }
    (positive as f64 - negative as f64) / total as f64
}

/// Score a single text.
pub fn analyze(text: &str) -> SentimentReading {
    let reading = normalize(polarity(&clean_tweet_text(text)));
    SentimentReading {
        score: round_to(reading.score, 2),
        polarity: round_to(reading.polarity, 3),
        label: reading.label,
        reliability: None,
    }
}

/// Mean score of a batch of readings; neutral when empty.
pub fn aggregate(readings: &[SentimentReading]) -> f64 {
    if readings.is_empty() {
        return NEUTRAL_SCORE;
    }
    let mean = readings.iter().map(|r| r.score).sum::<f64>() / readings.len() as f64;
    round_to(mean, 2)
}

/// Overall mood over a batch of readings.
pub fn market_sentiment(readings: &[SentimentReading]) -> MarketSentiment {
    if readings.is_empty() {
        return MarketSentiment::default();
    }

    let score = aggregate(readings);
    let (label, trend) = if score > BULLISH_MARKET {
        (SentimentLabel::Positive, SentimentTrend::Bullish)
    } else if score < BEARISH_MARKET {
        (SentimentLabel::Negative, SentimentTrend::Bearish)
    } else {
        (SentimentLabel::Neutral, SentimentTrend::Stable)
    };

    let count = |label: SentimentLabel| readings.iter().filter(|r| r.label == label).count() as u32;

    let rated: Vec<f64> = readings
        .iter()
        .filter_map(|r| r.reliability.map(f64::from))
        .collect();
    let average_reliability = if rated.is_empty() {
        None
    } else {
        Some(round_to(rated.iter().sum::<f64>() / rated.len() as f64, 1))
    };

    MarketSentiment {
        score,
        label,
        trend,
        tweet_count: readings.len() as u32,
        positive: count(SentimentLabel::Positive),
        negative: count(SentimentLabel::Negative),
        neutral: count(SentimentLabel::Neutral),
        average_reliability,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_scale() {
        assert_eq!(normalize(-1.0).score, 0.0);
        assert_eq!(normalize(0.0).score, 50.0);
        assert_eq!(normalize(1.0).score, 100.0);
        assert_eq!(normalize(0.5).score, 75.0);
    }

    #[test]
    fn test_normalize_labels() {
        assert_eq!(normalize(0.11).label, SentimentLabel::Positive);
        assert_eq!(normalize(0.1).label, SentimentLabel::Neutral);
        assert_eq!(normalize(-0.1).label, SentimentLabel::Neutral);
        assert_eq!(normalize(-0.11).label, SentimentLabel::Negative);
    }

    #[test]
    fn test_normalize_out_of_range_input() {
        assert_eq!(normalize(3.0).score, 100.0);
        assert_eq!(normalize(f64::NAN).score, 50.0);
    }

    #[test]
    fn test_clean_tweet_text() {
        let cleaned = clean_tweet_text("@trader  $TCS looking #bullish https://t.co/abc today");
        assert_eq!(cleaned, "$TCS looking bullish today");
    }

    #[test]
    fn test_clean_tweet_text_strips_bare_www_links() {
        let cleaned = clean_tweet_text("read www.moneycontrol.com/crash-report for details");
        assert_eq!(cleaned, "read for details");
        assert_eq!(polarity(&cleaned), 0.0);
    }

    #[test]
    fn test_polarity() {
        assert_eq!(polarity("Nothing to see here"), 0.0);
        assert_eq!(polarity("Strong rally, huge gains!"), 1.0);
        assert_eq!(polarity("crash and dump"), -1.0);
        assert_eq!(polarity("bullish but weak volume"), 0.0);
    }

    #[test]
    fn test_polarity_negation() {
        assert_eq!(polarity("this is not bullish"), -1.0);
        assert_eq!(polarity("no losses today"), 1.0);
    }

    #[test]
    fn test_analyze() {
        let reading = analyze("@desk #Infosys rally looks strong, buy the breakout");
        assert_eq!(reading.label, SentimentLabel::Positive);
        assert_eq!(reading.score, 100.0);
    }

    #[test]
    fn test_aggregate() {
        assert_eq!(aggregate(&[]), 50.0);
        let readings = vec![normalize(1.0), normalize(0.0)];
        assert_eq!(aggregate(&readings), 75.0);
    }

    #[test]
    fn test_market_sentiment() {
        let readings = vec![normalize(0.8), normalize(0.6), normalize(0.0)];
        let market = market_sentiment(&readings);
        assert_eq!(market.tweet_count, 3);
        assert_eq!(market.positive, 2);
        assert_eq!(market.neutral, 1);
        assert_eq!(market.trend, SentimentTrend::Bullish);
        assert_eq!(market.label, SentimentLabel::Positive);
        assert_eq!(market.average_reliability, None);
    }

    #[test]
    fn test_market_sentiment_averages_rated_readings() {
        let rated = |polarity: f64, reliability: u8| SentimentReading {
            reliability: Some(reliability),
            ..normalize(polarity)
        };
        let readings = vec![rated(0.5, 80), rated(-0.5, 25), normalize(0.0)];
        let market = market_sentiment(&readings);
        assert_eq!(market.tweet_count, 3);
        assert_eq!(market.average_reliability, Some(52.5));
    }

    #[test]
    fn test_market_sentiment_empty() {
        assert_eq!(market_sentiment(&[]), MarketSentiment::default());
    }
}
