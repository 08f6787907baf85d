//! Support and resistance levels from recent local extrema.

/// Series shorter than this use the whole-series min/max.
const MIN_EXTREMA_POINTS: usize = 10;

/// Number of trailing prices searched for extrema.
const LOOKBACK: usize = 20;

/// Support and resistance price levels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Levels {
    pub support: f64,
    pub resistance: f64,
}

/// Support/resistance from the trailing 20 prices.
///
/// A price strictly above both neighbours is a local high, strictly below
/// both a local low. Resistance is the highest local high and support the
/// lowest local low, each falling back to the window max/min when no such
/// extremum exists. Fewer than 10 prices use the min/max of the series.
pub fn support_resistance(prices: &[f64]) -> Levels {
    if prices.is_empty() {
        return Levels::default();
    }

    if prices.len() < MIN_EXTREMA_POINTS {
        return Levels {
            support: min_of(prices),
            resistance: max_of(prices),
        };
    }

    let recent = &prices[prices.len().saturating_sub(LOOKBACK)..];

    let mut highs = Vec::new();
    let mut lows = Vec::new();
    for w in recent.windows(3) {
        let (prev, price, next) = (w[0], w[1], w[2]);
        if price > prev && price > next {
            highs.push(price);
        } else if price < prev && price < next {
            lows.push(price);
        }
    }

    Levels {
        support: if lows.is_empty() { min_of(recent) } else { min_of(&lows) },
        resistance: if highs.is_empty() { max_of(recent) } else { max_of(&highs) },
    }
}

fn min_of(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

fn max_of(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_empty() {
        assert_eq!(support_resistance(&[]), Levels::default());
    }

    #[test]
    fn test_levels_short_series_uses_min_max() {
        let levels = support_resistance(&[5.0, 3.0, 8.0, 4.0]);
        assert_eq!(levels.support, 3.0);
        assert_eq!(levels.resistance, 8.0);
    }

    #[test]
    fn test_levels_monotonic_series_falls_back_to_window() {
        let prices: Vec<f64> = (1..=30).map(|i| i as f64).collect();
        let levels = support_resistance(&prices);
        // Window is 11..=30 and has no interior extrema.
        assert_eq!(levels.support, 11.0);
        assert_eq!(levels.resistance, 30.0);
    }

    #[test]
    fn test_levels_local_extrema() {
        let prices = vec![
            10.0, 12.0, 11.0, 13.0, 9.0, 14.0, 12.0, 12.5, 8.0, 15.0, 16.0, 14.5,
        ];
        let levels = support_resistance(&prices);
        // Highs: 12, 13, 14, 12.5, 16. Lows: 11, 9, 12, 8.
        assert_eq!(levels.resistance, 16.0);
        assert_eq!(levels.support, 8.0);
    }

    #[test]
    fn test_levels_extrema_ignore_window_edges() {
        // The lowest price sits on the window edge so it is not a local low.
        let mut prices = vec![1.0];
        prices.extend([5.0, 6.0, 5.5, 6.5, 5.2, 7.0, 6.8, 7.5, 7.2, 8.0]);
        let levels = support_resistance(&prices);
        assert_eq!(levels.support, 5.2);
        assert_eq!(levels.resistance, 7.5);
        assert!(levels.resistance >= levels.support);
    }
}
