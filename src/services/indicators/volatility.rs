//! Return volatility.

use super::population_std_dev;

/// Standard deviation of simple period-over-period returns.
///
/// Returns are `(p[i] - p[i-1]) / p[i-1]`; changes from a zero price are
/// skipped. Needs at least 2 prices, otherwise 0.
pub fn volatility(prices: &[f64]) -> f64 {
    if prices.len() < 2 {
        return 0.0;
    }

    let returns: Vec<f64> = prices
        .windows(2)
        .filter(|pair| pair[0] != 0.0)
        .map(|pair| (pair[1] - pair[0]) / pair[0])
        .collect();

    population_std_dev(&returns)
}
