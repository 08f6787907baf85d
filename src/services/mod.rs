pub mod cache;
pub mod confidence;
pub mod indicators;
pub mod prediction;
pub mod prediction_store;
pub mod sentiment;
pub mod signals;
pub mod symbols;

pub use cache::Cache;
pub use confidence::{confidence, ConfidenceBreakdown, ConfidenceInputs};
pub use indicators::IndicatorReadings;
pub use prediction::PredictionService;
pub use prediction_store::{PredictionStore, StoreError};
pub use signals::{recommend, tally_signals, SignalInputs};

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
