//! Simple and exponential moving averages.

/// Mean of the last `window` prices.
///
/// Returns 0 when fewer than `window` prices exist (or `window` is 0).
/// Callers must tolerate this sentinel.
pub fn moving_average(prices: &[f64], window: usize) -> f64 {
    if window == 0 || prices.len() < window {
        return 0.0;
    }

    prices[prices.len() - window..].iter().sum::<f64>() / window as f64
}

/// Exponential moving average with multiplier `2 / (window + 1)`.
///
/// Seeded with the first price of the series rather than a simple average
/// of the first window. With fewer than `window` prices this falls back to
/// the mean of the whole series.
pub fn exponential_moving_average(prices: &[f64], window: usize) -> f64 {
    if prices.len() < window {
        return moving_average(prices, prices.len());
    }

    let multiplier = 2.0 / (window as f64 + 1.0);
    let mut iter = prices.iter();
    let Some(&seed) = iter.next() else {
        return 0.0;
    };

    iter.fold(seed, |ema, &price| price * multiplier + ema * (1.0 - multiplier))
}
