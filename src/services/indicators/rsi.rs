//! Relative Strength Index (RSI).

/// Default RSI lookback.
pub const RSI_PERIOD: usize = 14;

/// Neutral value returned when the series is too short.
pub const RSI_NEUTRAL: f64 = 50.0;

/// RSI over the trailing `window` price changes.
///
/// Values range from 0-100:
/// - Below 30: Oversold
/// - Above 70: Overbought
///
/// Average gain and average loss are plain means over the trailing window.
/// Returns 50 with fewer than `window + 1` prices, and 100 when the window
/// holds no losses.
pub fn rsi(prices: &[f64], window: usize) -> f64 {
    if window == 0 || prices.len() < window + 1 {
        return RSI_NEUTRAL;
    }

    let recent = &prices[prices.len() - (window + 1)..];
    let (gains, losses) = recent
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .fold((0.0, 0.0), |(gains, losses), change| {
            if change > 0.0 {
                (gains + change, losses)
            } else {
                (gains, losses - change)
            }
        });

    let avg_gain = gains / window as f64;
    let avg_loss = losses / window as f64;

    if avg_loss == 0.0 {
        return 100.0;
    }

    let rs = avg_gain / avg_loss;
    100.0 - (100.0 / (1.0 + rs))
}
