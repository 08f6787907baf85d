use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Discrete trading recommendation derived from the net signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "Strong Buy")]
    StrongBuy,
    #[serde(rename = "Buy")]
    Buy,
    #[serde(rename = "Hold")]
    Hold,
    #[serde(rename = "Sell")]
    Sell,
    #[serde(rename = "Strong Sell")]
    StrongSell,
}

impl Recommendation {
    /// Map a net signal (buy - sell) to a recommendation.
    ///
    /// Evaluated in order, first match wins:
    /// - `net >= 3`: Strong Buy
    /// - `net >= 1`: Buy
    /// - `net <= -3`: Strong Sell
    /// - `net <= -1`: Sell
    /// - otherwise Hold
    pub fn from_net_signal(net: i32) -> Self {
        match net {
            n if n >= 3 => Recommendation::StrongBuy,
            n if n >= 1 => Recommendation::Buy,
            n if n <= -3 => Recommendation::StrongSell,
            n if n <= -1 => Recommendation::Sell,
            _ => Recommendation::Hold,
        }
    }

    /// Get display label for this recommendation.
    pub fn label(&self) -> &'static str {
        match self {
            Recommendation::StrongBuy => "Strong Buy",
            Recommendation::Buy => "Buy",
            Recommendation::Hold => "Hold",
            Recommendation::Sell => "Sell",
            Recommendation::StrongSell => "Strong Sell",
        }
    }

    /// Parse a display label.
    pub fn from_label(s: &str) -> Option<Self> {
        match s {
            "Strong Buy" => Some(Recommendation::StrongBuy),
            "Buy" => Some(Recommendation::Buy),
            "Hold" => Some(Recommendation::Hold),
            "Sell" => Some(Recommendation::Sell),
            "Strong Sell" => Some(Recommendation::StrongSell),
            _ => None,
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Snapshot of every technical indicator computed for one prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalIndicators {
    pub ma_5: f64,
    pub ma_10: f64,
    pub ma_20: f64,
    pub ema_12: f64,
    pub ema_26: f64,
    /// Relative strength index (0-100).
    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub bollinger_upper: f64,
    pub bollinger_lower: f64,
    pub support: f64,
    pub resistance: f64,
    /// Standard deviation of period returns, in percent.
    pub volatility: f64,
    /// Deviation of MA-5 from the latest close, in percent.
    pub trend_short: f64,
    /// Deviation of MA-20 from the latest close, in percent.
    pub trend_medium: f64,
    /// Current volume relative to the trailing average volume.
    pub volume_ratio: f64,
}

/// Buy/sell signal counts produced by signal fusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignalTally {
    pub buy_signals: u32,
    pub sell_signals: u32,
    pub net_signal: i32,
}

impl SignalTally {
    /// Build a tally, deriving the net signal.
    pub fn new(buy_signals: u32, sell_signals: u32) -> Self {
        Self {
            buy_signals,
            sell_signals,
            net_signal: buy_signals as i32 - sell_signals as i32,
        }
    }

    /// Recommendation for this tally's net signal.
    pub fn recommendation(&self) -> Recommendation {
        Recommendation::from_net_signal(self.net_signal)
    }
}

/// A complete price prediction for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub id: Uuid,
    pub symbol: String,
    pub current_price: f64,
    pub predicted_price: f64,
    pub price_change_percent: f64,
    /// Confidence score, always within 20-95.
    pub confidence: f64,
    pub recommendation: Recommendation,
    pub technical_indicators: TechnicalIndicators,
    pub signals: SignalTally,
    pub sentiment_score: f64,
    /// Unix timestamp (milliseconds) when created.
    pub created_at: i64,
}

/// Directional accuracy of stored predictions for a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionAccuracy {
    pub symbol: String,
    pub accuracy_percent: f64,
    pub total_predictions: u32,
    pub accurate_predictions: u32,
    pub period_days: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommendation_boundaries() {
        assert_eq!(Recommendation::from_net_signal(6), Recommendation::StrongBuy);
        assert_eq!(Recommendation::from_net_signal(3), Recommendation::StrongBuy);
        assert_eq!(Recommendation::from_net_signal(2), Recommendation::Buy);
        assert_eq!(Recommendation::from_net_signal(1), Recommendation::Buy);
        assert_eq!(Recommendation::from_net_signal(0), Recommendation::Hold);
        assert_eq!(Recommendation::from_net_signal(-1), Recommendation::Sell);
        assert_eq!(Recommendation::from_net_signal(-2), Recommendation::Sell);
        assert_eq!(Recommendation::from_net_signal(-3), Recommendation::StrongSell);
        assert_eq!(Recommendation::from_net_signal(-6), Recommendation::StrongSell);
    }

    #[test]
    fn test_recommendation_serialization() {
        let json = serde_json::to_string(&Recommendation::StrongBuy).unwrap();
        assert_eq!(json, "\"Strong Buy\"");

        let parsed: Recommendation = serde_json::from_str("\"Strong Sell\"").unwrap();
        assert_eq!(parsed, Recommendation::StrongSell);
    }

    #[test]
    fn test_recommendation_label_round_trip() {
        for rec in [
            Recommendation::StrongBuy,
            Recommendation::Buy,
            Recommendation::Hold,
            Recommendation::Sell,
            Recommendation::StrongSell,
        ] {
            assert_eq!(Recommendation::from_label(rec.label()), Some(rec));
        }
        assert_eq!(Recommendation::from_label("Neutral"), None);
    }

    #[test]
    fn test_signal_tally_net() {
        let tally = SignalTally::new(1, 4);
        assert_eq!(tally.net_signal, -3);
        assert_eq!(tally.recommendation(), Recommendation::StrongSell);
    }
}
