//! Property tests for the indicator library.

use stocksense::services::indicators::*;
use stocksense::services::IndicatorReadings;

/// Deterministic pseudo-random walk.
fn random_walk(seed: u64, len: usize) -> Vec<f64> {
    let mut state = seed;
    let mut price = 100.0;
    (0..len)
        .map(|_| {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            let step = ((state >> 33) as f64 / (1u64 << 31) as f64) - 0.5;
            price = (price + step * 4.0).max(1.0);
            price
        })
        .collect()
}

fn sequential() -> Vec<f64> {
    (1..=30).map(|i| i as f64).collect()
}

#[test]
fn test_moving_average_short_series_is_zero() {
    for len in 0..20 {
        let prices = random_walk(len as u64, len);
        assert_eq!(moving_average(&prices, 20), 0.0);
    }
}

#[test]
fn test_moving_average_is_trailing_mean() {
    for seed in 0..20 {
        let prices = random_walk(seed, 50);
        for window in [1, 5, 10, 20, 50] {
            let tail = &prices[prices.len() - window..];
            let expected = tail.iter().sum::<f64>() / window as f64;
            assert!((moving_average(&prices, window) - expected).abs() < 1e-9);
        }
    }
}

#[test]
fn test_sequential_series_hand_values() {
    let prices = sequential();

    assert_eq!(moving_average(&prices, 5), 28.0);
    assert_eq!(moving_average(&prices, 10), 25.5);
    assert_eq!(moving_average(&prices, 20), 20.5);

    // EMA of 1..n seeded with 1 is n - L * (1 - r^(n-1)), L = r / m.
    let ema_12 = 30.0 - 5.5 * (1.0 - (11.0f64 / 13.0).powi(29));
    let ema_26 = 30.0 - 12.5 * (1.0 - (25.0f64 / 27.0).powi(29));
    assert!((exponential_moving_average(&prices, 12) - ema_12).abs() < 1e-9);
    assert!((exponential_moving_average(&prices, 26) - ema_26).abs() < 1e-9);

    assert_eq!(rsi(&prices, RSI_PERIOD), 100.0);

    let m = macd(&prices);
    assert!((m.macd - (ema_12 - ema_26)).abs() < 1e-9);
    assert!((m.signal - m.macd * 0.2).abs() < 1e-12);
    assert!((m.histogram - m.macd * 0.8).abs() < 1e-9);

    // Population std of 11..=30 is sqrt(33.25).
    let bands = bollinger_bands(&prices, BOLLINGER_PERIOD, BOLLINGER_STD_DEV);
    assert_eq!(bands.middle, 20.5);
    assert!((bands.upper - (20.5 + 2.0 * 33.25f64.sqrt())).abs() < 1e-9);
    assert!((bands.lower - (20.5 - 2.0 * 33.25f64.sqrt())).abs() < 1e-9);
}

#[test]
fn test_ema_short_series_falls_back_to_mean() {
    let prices = [10.0, 20.0, 30.0];
    assert_eq!(exponential_moving_average(&prices, 12), 20.0);
    assert_eq!(exponential_moving_average(&[], 12), 0.0);
}

#[test]
fn test_rsi_always_in_range() {
    for seed in 0..50 {
        let prices = random_walk(seed, 60);
        let value = rsi(&prices, RSI_PERIOD);
        assert!((0.0..=100.0).contains(&value), "rsi {} out of range", value);
    }
}

#[test]
fn test_rsi_monotonic_series() {
    let rising: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
    let falling: Vec<f64> = (0..30).map(|i| 100.0 - i as f64).collect();

    assert_eq!(rsi(&rising, RSI_PERIOD), 100.0);
    let value = rsi(&falling, RSI_PERIOD);
    assert!(value.is_finite());
    assert!(value < 1.0);
    assert_eq!(rsi(&[1.0; 14], RSI_PERIOD), 50.0);
}

#[test]
fn test_bollinger_ordering() {
    for seed in 0..50 {
        let prices = random_walk(seed, 40);
        let bands = bollinger_bands(&prices, BOLLINGER_PERIOD, BOLLINGER_STD_DEV);
        assert!(bands.upper >= bands.middle);
        assert!(bands.middle >= bands.lower);
    }

    let short = bollinger_bands(&[1.0, 2.0], BOLLINGER_PERIOD, BOLLINGER_STD_DEV);
    assert_eq!((short.upper, short.middle, short.lower), (0.0, 0.0, 0.0));
}

#[test]
fn test_macd_requires_26_prices() {
    let prices = random_walk(7, 25);
    let m = macd(&prices);
    assert_eq!((m.macd, m.signal, m.histogram), (0.0, 0.0, 0.0));
}

#[test]
fn test_volatility_non_negative() {
    for seed in 0..20 {
        assert!(volatility(&random_walk(seed, 30)) >= 0.0);
    }
    assert_eq!(volatility(&[100.0; 30]), 0.0);
    assert_eq!(volatility(&[100.0]), 0.0);
}

#[test]
fn test_support_resistance_short_series_uses_extremes() {
    let levels = support_resistance(&[5.0, 3.0, 9.0, 4.0]);
    assert_eq!(levels.support, 3.0);
    assert_eq!(levels.resistance, 9.0);
}

#[test]
fn test_support_resistance_local_extrema() {
    // Trailing 20 of a zigzag: peaks at 12, troughs at 8, with an old
    // extreme outside the window.
    let mut prices = vec![1.0, 50.0];
    for _ in 0..10 {
        prices.extend([8.0, 12.0]);
    }
    let levels = support_resistance(&prices);
    assert_eq!(levels.support, 8.0);
    assert_eq!(levels.resistance, 12.0);
}

#[test]
fn test_readings_snapshot_bounds() {
    for seed in 0..20 {
        let prices = random_walk(seed, 45);
        let volumes = vec![1_000.0; 45];
        let snapshot = IndicatorReadings::compute(&prices, &volumes, 1_500.0).snapshot();

        assert!((0.0..=100.0).contains(&snapshot.rsi));
        assert!(snapshot.bollinger_upper >= snapshot.bollinger_lower);
        assert!(snapshot.volatility >= 0.0);
        assert_eq!(snapshot.volume_ratio, 1.5);
    }
}
