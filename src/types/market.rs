use serde::{Deserialize, Serialize};

/// Daily OHLCV point from a price history provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    /// Unix timestamp in milliseconds.
    pub date: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl HistoryPoint {
    /// Create a point where open/high/low equal the close.
    pub fn from_close(date: i64, close: f64, volume: f64) -> Self {
        Self {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume,
        }
    }
}

/// Extract the closing prices of a history, oldest first.
pub fn closes(history: &[HistoryPoint]) -> Vec<f64> {
    history.iter().map(|p| p.close).collect()
}

/// Sort a history chronologically and drop points sharing a date.
///
/// The first point seen for a date wins.
pub fn normalize_history(mut history: Vec<HistoryPoint>) -> Vec<HistoryPoint> {
    history.sort_by_key(|p| p.date);
    history.dedup_by_key(|p| p.date);
    history
}

/// Current quote for a symbol, the "current data" a prediction is made against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockQuote {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub volume: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pe_ratio: Option<f64>,
    pub day_high: f64,
    pub day_low: f64,
    /// Unix timestamp in milliseconds.
    pub timestamp: i64,
}

impl StockQuote {
    /// Minimal quote with price, change and volume set.
    pub fn new(symbol: impl Into<String>, price: f64, change: f64, volume: f64) -> Self {
        let symbol = symbol.into();
        let previous = price - change;
        let change_percent = if previous != 0.0 {
            change / previous * 100.0
        } else {
            0.0
        };
        Self {
            name: symbol.clone(),
            symbol,
            price,
            change,
            change_percent,
            volume,
            market_cap: None,
            pe_ratio: None,
            day_high: price,
            day_low: price,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}
