//! Bollinger Bands.

use super::{moving_average::moving_average, population_std_dev};

/// Default band window.
pub const BOLLINGER_PERIOD: usize = 20;

/// Default band width in standard deviations.
pub const BOLLINGER_STD_DEV: f64 = 2.0;

/// Upper, middle and lower band values.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BollingerOutput {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Bollinger Bands over the trailing `window` prices.
///
/// - Middle band: SMA(window)
/// - Upper band: middle + num_std * StdDev
/// - Lower band: middle - num_std * StdDev
///
/// StdDev is the population deviation of the trailing window. Needs at
/// least `window` prices, otherwise every band is 0.
pub fn bollinger_bands(prices: &[f64], window: usize, num_std: f64) -> BollingerOutput {
    if window == 0 || prices.len() < window {
        return BollingerOutput::default();
    }

    let middle = moving_average(prices, window);
    let band = num_std * population_std_dev(&prices[prices.len() - window..]);

    BollingerOutput {
        upper: middle + band,
        middle,
        lower: middle - band,
    }
}
