//! MACD (Moving Average Convergence Divergence).

use super::moving_average::exponential_moving_average;

const FAST_PERIOD: usize = 12;
const SLOW_PERIOD: usize = 26;

/// Fraction of the MACD line used as its signal line.
const SIGNAL_FACTOR: f64 = 0.2;

/// MACD line, signal line and histogram.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MacdOutput {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// MACD of a close series.
///
/// - MACD Line = EMA(12) - EMA(26)
/// - Signal Line = MACD Line * 0.2, a fixed proxy for the usual EMA(9)
/// - Histogram = MACD Line - Signal Line
///
/// Needs at least 26 prices, otherwise every component is 0.
pub fn macd(prices: &[f64]) -> MacdOutput {
    if prices.len() < SLOW_PERIOD {
        return MacdOutput::default();
    }

    let fast = exponential_moving_average(prices, FAST_PERIOD);
    let slow = exponential_moving_average(prices, SLOW_PERIOD);

    let macd = fast - slow;
    let signal = macd * SIGNAL_FACTOR;

    MacdOutput {
        macd,
        signal,
        histogram: macd - signal,
    }
}
