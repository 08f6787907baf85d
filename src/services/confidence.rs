//! Confidence scoring for a prediction.

/// Bounds of the final confidence score.
pub const MIN_CONFIDENCE: f64 = 20.0;
pub const MAX_CONFIDENCE: f64 = 95.0;

/// History length at which the data-quality term saturates.
const FULL_DATA_POINTS: f64 = 30.0;

/// The inputs confidence scoring reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceInputs {
    /// Std dev of returns as a fraction.
    pub volatility: f64,
    pub data_points: usize,
    pub rsi: f64,
    pub volume_ratio: f64,
    /// Sentiment as a fractional deviation from neutral.
    pub sentiment_factor: f64,
}

/// Individual terms of the confidence score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceBreakdown {
    pub volatility: f64,
    pub data_quality: f64,
    pub rsi: f64,
    pub volume: f64,
    pub sentiment_strength: f64,
}

impl ConfidenceBreakdown {
    /// Compute each term separately.
    ///
    /// - volatility: `max(0, 40 - volatility * 2000)`
    /// - data quality: `min(points / 30, 1) * 30`
    /// - RSI centering: `20 - |rsi - 50| / 2.5`, unfloored
    /// - volume: `min(volume_ratio * 10, 20)`
    /// - sentiment strength: `|sentiment_factor| * 10`
    pub fn from_inputs(inputs: &ConfidenceInputs) -> Self {
        Self {
            volatility: (40.0 - inputs.volatility * 2000.0).max(0.0),
            data_quality: (inputs.data_points as f64 / FULL_DATA_POINTS).min(1.0) * 30.0,
            rsi: 20.0 - (inputs.rsi - 50.0).abs() / 2.5,
            volume: (inputs.volume_ratio * 10.0).min(20.0),
            sentiment_strength: inputs.sentiment_factor.abs() * 10.0,
        }
    }

    /// Unclamped sum of the terms.
    pub fn total(&self) -> f64 {
        self.volatility + self.data_quality + self.rsi + self.volume + self.sentiment_strength
    }
}

/// Confidence score clamped to 20-95.
pub fn confidence(inputs: &ConfidenceInputs) -> f64 {
    let total = ConfidenceBreakdown::from_inputs(inputs).total();
    if total.is_nan() {
        return MIN_CONFIDENCE;
    }
    total.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
}
