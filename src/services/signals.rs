//! Signal fusion: turns indicator readings and sentiment into buy/sell
//! signal counts and a recommendation.

use crate::services::indicators::IndicatorReadings;
use crate::types::{Recommendation, SignalTally};

/// Short trend (fraction) beyond which the trend votes twice.
const TREND_THRESHOLD: f64 = 0.02;
const TREND_WEIGHT: u32 = 2;

const RSI_OVERSOLD: f64 = 30.0;
const RSI_OVERBOUGHT: f64 = 70.0;

/// Sentiment scores (0-100) that count as bullish or bearish.
pub const BULLISH_SENTIMENT: f64 = 65.0;
pub const BEARISH_SENTIMENT: f64 = 35.0;

/// The inputs signal fusion reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalInputs {
    /// Short-term trend as a fraction.
    pub short_trend: f64,
    pub rsi: f64,
    pub price: f64,
    pub bollinger_upper: f64,
    pub bollinger_lower: f64,
    pub ma_5: f64,
    pub ma_10: f64,
    pub ma_20: f64,
    /// Sentiment score on the 0-100 scale.
    pub sentiment: f64,
}

impl SignalInputs {
    /// Collect fusion inputs from computed readings.
    pub fn from_readings(readings: &IndicatorReadings, price: f64, sentiment: f64) -> Self {
        Self {
            short_trend: readings.short_trend,
            rsi: readings.rsi,
            price,
            bollinger_upper: readings.bollinger.upper,
            bollinger_lower: readings.bollinger.lower,
            ma_5: readings.ma_5,
            ma_10: readings.ma_10,
            ma_20: readings.ma_20,
            sentiment,
        }
    }
}

/// Count buy and sell signals.
///
/// | Condition                | Effect   |
/// |--------------------------|----------|
/// | short trend > +2%        | buy += 2 |
/// | short trend < -2%        | sell += 2|
/// | RSI < 30                 | buy += 1 |
/// | RSI > 70                 | sell += 1|
/// | price < lower band       | buy += 1 |
/// | price > upper band       | sell += 1|
/// | MA5 > MA10 > MA20        | buy += 1 |
/// | MA5 < MA10 < MA20        | sell += 1|
/// | sentiment > 65           | buy += 1 |
/// | sentiment < 35           | sell += 1|
pub fn tally_signals(inputs: &SignalInputs) -> SignalTally {
    let mut buy = 0u32;
    let mut sell = 0u32;

    if inputs.short_trend > TREND_THRESHOLD {
        buy += TREND_WEIGHT;
    } else if inputs.short_trend < -TREND_THRESHOLD {
        sell += TREND_WEIGHT;
    }

    if inputs.rsi < RSI_OVERSOLD {
        buy += 1;
    } else if inputs.rsi > RSI_OVERBOUGHT {
        sell += 1;
    }

    if inputs.price < inputs.bollinger_lower {
        buy += 1;
    } else if inputs.price > inputs.bollinger_upper {
        sell += 1;
    }

    if inputs.ma_5 > inputs.ma_10 && inputs.ma_10 > inputs.ma_20 {
        buy += 1;
    } else if inputs.ma_5 < inputs.ma_10 && inputs.ma_10 < inputs.ma_20 {
        sell += 1;
    }

    if inputs.sentiment > BULLISH_SENTIMENT {
        buy += 1;
    } else if inputs.sentiment < BEARISH_SENTIMENT {
        sell += 1;
    }

    SignalTally::new(buy, sell)
}

/// Tally signals and map the net signal to a recommendation.
pub fn recommend(inputs: &SignalInputs) -> (SignalTally, Recommendation) {
    let tally = tally_signals(inputs);
    (tally, tally.recommendation())
}
