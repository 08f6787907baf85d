//! Technical indicator implementations.
//!
//! Every function here is pure and never fails: when a series is too short
//! it returns a documented fallback (0, 50, or the series min/max) so a
//! prediction can always move past the indicator stage.

pub mod bollinger;
pub mod macd;
pub mod moving_average;
pub mod rsi;
pub mod support_resistance;
pub mod volatility;

pub use bollinger::{bollinger_bands, BollingerOutput, BOLLINGER_PERIOD, BOLLINGER_STD_DEV};
pub use macd::{macd, MacdOutput};
pub use moving_average::{exponential_moving_average, moving_average};
pub use rsi::{rsi, RSI_PERIOD};
pub use support_resistance::{support_resistance, Levels};
pub use volatility::volatility;

use crate::services::round_to;
use crate::types::TechnicalIndicators;

/// Number of trailing history points averaged for the volume ratio.
const VOLUME_LOOKBACK: usize = 20;

/// Population standard deviation. 0 for an empty slice.
pub(crate) fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Current volume relative to the mean of the trailing 20 history volumes.
///
/// Returns 1.0 when no usable average exists.
pub fn volume_ratio(history_volumes: &[f64], current_volume: f64) -> f64 {
    let recent = &history_volumes[history_volumes.len().saturating_sub(VOLUME_LOOKBACK)..];
    if recent.is_empty() {
        return 1.0;
    }

    let average = recent.iter().sum::<f64>() / recent.len() as f64;
    if !average.is_finite() || average <= 0.0 || !current_volume.is_finite() {
        return 1.0;
    }

    (current_volume / average).max(0.0)
}

/// Fractional deviation of an average from the latest price. 0 if the
/// price is 0.
pub fn trend(average: f64, latest_price: f64) -> f64 {
    if latest_price == 0.0 {
        return 0.0;
    }
    (average - latest_price) / latest_price
}

/// Unrounded indicator values for one close series.
///
/// Signal fusion and confidence scoring read these; the rounded
/// [`TechnicalIndicators`] snapshot is what gets published.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorReadings {
    pub latest_price: f64,
    pub ma_5: f64,
    pub ma_10: f64,
    pub ma_20: f64,
    pub ema_12: f64,
    pub ema_26: f64,
    pub rsi: f64,
    pub macd: MacdOutput,
    pub bollinger: BollingerOutput,
    pub levels: Levels,
    /// Std dev of returns as a fraction.
    pub volatility: f64,
    /// (MA5 - latest) / latest.
    pub short_trend: f64,
    /// (MA20 - latest) / latest.
    pub medium_trend: f64,
    pub volume_ratio: f64,
}

impl IndicatorReadings {
    /// Compute every indicator for a chronological close series.
    pub fn compute(prices: &[f64], history_volumes: &[f64], current_volume: f64) -> Self {
        let latest_price = prices.last().copied().unwrap_or(0.0);
        let ma_5 = moving_average(prices, 5);
        let ma_20 = moving_average(prices, 20);

        Self {
            latest_price,
            ma_5,
            ma_10: moving_average(prices, 10),
            ma_20,
            ema_12: exponential_moving_average(prices, 12),
            ema_26: exponential_moving_average(prices, 26),
            rsi: rsi(prices, RSI_PERIOD),
            macd: macd(prices),
            bollinger: bollinger_bands(prices, BOLLINGER_PERIOD, BOLLINGER_STD_DEV),
            levels: support_resistance(prices),
            volatility: volatility(prices),
            short_trend: trend(ma_5, latest_price),
            medium_trend: trend(ma_20, latest_price),
            volume_ratio: volume_ratio(history_volumes, current_volume),
        }
    }

    /// Rounded snapshot: prices and percentages to 2 decimals, MACD to 4.
    pub fn snapshot(&self) -> TechnicalIndicators {
        TechnicalIndicators {
            ma_5: round_to(self.ma_5, 2),
            ma_10: round_to(self.ma_10, 2),
            ma_20: round_to(self.ma_20, 2),
            ema_12: round_to(self.ema_12, 2),
            ema_26: round_to(self.ema_26, 2),
            rsi: round_to(self.rsi, 2),
            macd: round_to(self.macd.macd, 4),
            macd_signal: round_to(self.macd.signal, 4),
            bollinger_upper: round_to(self.bollinger.upper, 2),
            bollinger_lower: round_to(self.bollinger.lower, 2),
            support: round_to(self.levels.support, 2),
            resistance: round_to(self.levels.resistance, 2),
            volatility: round_to(self.volatility * 100.0, 2),
            trend_short: round_to(self.short_trend * 100.0, 2),
            trend_medium: round_to(self.medium_trend * 100.0, 2),
            volume_ratio: round_to(self.volume_ratio, 2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_population_std_dev() {
        assert_eq!(population_std_dev(&[]), 0.0);
        assert_eq!(population_std_dev(&[3.0]), 0.0);
        assert!((population_std_dev(&[1.0, 3.0]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_volume_ratio() {
        let volumes = vec![100.0; 30];
        assert!((volume_ratio(&volumes, 150.0) - 1.5).abs() < 1e-12);
        assert_eq!(volume_ratio(&[], 150.0), 1.0);
        assert_eq!(volume_ratio(&[0.0, 0.0], 150.0), 1.0);
        assert_eq!(volume_ratio(&volumes, -5.0), 0.0);
    }

    #[test]
    fn test_volume_ratio_uses_trailing_window() {
        let mut volumes = vec![1_000.0; 10];
        volumes.extend(vec![200.0; 20]);
        assert!((volume_ratio(&volumes, 400.0) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_trend() {
        assert!((trend(105.0, 100.0) - 0.05).abs() < 1e-12);
        assert_eq!(trend(105.0, 0.0), 0.0);
    }

    #[test]
    fn test_readings_sequential_series() {
        let prices: Vec<f64> = (1..=30).map(|i| i as f64).collect();
        let volumes = vec![1_000.0; 30];
        let readings = IndicatorReadings::compute(&prices, &volumes, 1_000.0);

        assert_eq!(readings.latest_price, 30.0);
        assert_eq!(readings.ma_5, 28.0);
        assert_eq!(readings.ma_10, 25.5);
        assert_eq!(readings.ma_20, 20.5);
        assert_eq!(readings.rsi, 100.0);
        assert!((readings.short_trend - (-2.0 / 30.0)).abs() < 1e-12);
        assert_eq!(readings.volume_ratio, 1.0);

        let snapshot = readings.snapshot();
        assert_eq!(snapshot.trend_short, -6.67);
        assert_eq!(snapshot.support, 11.0);
        assert_eq!(snapshot.resistance, 30.0);
        assert!(snapshot.bollinger_upper >= snapshot.bollinger_lower);
    }
}
