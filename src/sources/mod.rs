//! External data providers.
//!
//! The prediction service only sees the traits below; the concrete clients
//! wrap third-party HTTP APIs and own their rate limiting and retries.

pub mod throttle;
pub mod twitter;
pub mod yahoo;

use async_trait::async_trait;

use crate::error::SourceError;
use crate::services::sentiment;
use crate::types::{HistoryPoint, SentimentReading, StockQuote};

pub use twitter::TwitterClient;
pub use yahoo::YahooFinanceClient;

/// Source of daily price history.
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    /// Fetch history for `symbol` over `period` (e.g. "3mo"), oldest first
    /// and deduplicated by date.
    async fn fetch_history(
        &self,
        symbol: &str,
        period: &str,
    ) -> Result<Vec<HistoryPoint>, SourceError>;
}

/// Source of current quotes.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn fetch_quote(&self, symbol: &str) -> Result<StockQuote, SourceError>;
}

/// Source of social sentiment.
#[async_trait]
pub trait SentimentProvider: Send + Sync {
    /// Per-text readings for a symbol, or for the market when `None`.
    async fn readings(&self, symbol: Option<&str>) -> Result<Vec<SentimentReading>, SourceError>;

    /// Aggregate 0-100 score for a symbol, or for the market when `None`.
    async fn score(&self, symbol: Option<&str>) -> Result<f64, SourceError> {
        let readings = self.readings(symbol).await?;
        Ok(sentiment::aggregate(&readings))
    }

    /// Drop expired cached results. Returns the number removed.
    fn purge_stale(&self) -> usize {
        0
    }
}
