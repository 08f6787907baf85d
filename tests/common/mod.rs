//! In-process providers for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use stocksense::config::{Config, PredictionConfig, SourceConfig};
use stocksense::error::SourceError;
use stocksense::services::{PredictionService, PredictionStore};
use stocksense::sources::{PriceHistoryProvider, QuoteProvider, SentimentProvider};
use stocksense::types::{HistoryPoint, SentimentLabel, SentimentReading, StockQuote};
use stocksense::AppState;

pub const DAY_MS: i64 = 86_400_000;

/// `count` daily points rising by `step` from `start`.
pub fn rising_history(count: usize, start: f64, step: f64) -> Vec<HistoryPoint> {
    (0..count)
        .map(|i| {
            HistoryPoint::from_close(
                1_700_000_000_000 + i as i64 * DAY_MS,
                start + i as f64 * step,
                1_000_000.0,
            )
        })
        .collect()
}

/// History provider serving fixed series and counting calls.
#[derive(Default)]
pub struct MockHistory {
    series: HashMap<String, Vec<HistoryPoint>>,
    calls: AtomicUsize,
}

impl MockHistory {
    pub fn with(mut self, symbol: &str, history: Vec<HistoryPoint>) -> Self {
        self.series.insert(symbol.to_string(), history);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceHistoryProvider for MockHistory {
    async fn fetch_history(
        &self,
        symbol: &str,
        _period: &str,
    ) -> Result<Vec<HistoryPoint>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.series
            .get(symbol)
            .cloned()
            .ok_or_else(|| SourceError::NoData(format!("no history for {symbol}")))
    }
}

/// Quote provider serving fixed quotes.
#[derive(Default)]
pub struct MockQuotes {
    quotes: HashMap<String, StockQuote>,
    calls: AtomicUsize,
}

impl MockQuotes {
    pub fn with(mut self, symbol: &str, price: f64) -> Self {
        self.quotes.insert(
            symbol.to_string(),
            StockQuote::new(symbol, price, 1.0, 1_000_000.0),
        );
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteProvider for MockQuotes {
    async fn fetch_quote(&self, symbol: &str) -> Result<StockQuote, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.quotes
            .get(symbol)
            .cloned()
            .ok_or(SourceError::Status(404))
    }
}

/// Sentiment provider returning one fixed score, or failing when `None`.
pub struct MockSentiment {
    score: Option<f64>,
    calls: AtomicUsize,
}

impl MockSentiment {
    pub fn new(score: Option<f64>) -> Self {
        Self {
            score,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SentimentProvider for MockSentiment {
    async fn readings(&self, _symbol: Option<&str>) -> Result<Vec<SentimentReading>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.score {
            Some(score) => Ok(vec![SentimentReading {
                score,
                polarity: score / 50.0 - 1.0,
                label: if score > 55.0 {
                    SentimentLabel::Positive
                } else if score < 45.0 {
                    SentimentLabel::Negative
                } else {
                    SentimentLabel::Neutral
                },
                reliability: None,
            }]),
            None => Err(SourceError::Status(503)),
        }
    }
}

pub fn prediction_config() -> PredictionConfig {
    PredictionConfig {
        history_period: "3mo".to_string(),
        min_data_points: 30,
        cache_ttl: Duration::from_secs(300),
    }
}

pub fn service(
    history: Arc<MockHistory>,
    quotes: Arc<MockQuotes>,
    sentiment: Option<Arc<MockSentiment>>,
) -> PredictionService {
    PredictionService::new(
        history,
        quotes,
        sentiment.map(|s| s as Arc<dyn SentimentProvider>),
        prediction_config(),
    )
}

pub fn test_config(watchlist: &[&str]) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_path: ":memory:".to_string(),
        twitter_bearer_token: None,
        watchlist: watchlist.iter().map(|s| s.to_string()).collect(),
        retention_days: 90,
        prediction: prediction_config(),
        sources: SourceConfig::default(),
    }
}

pub fn app_state(service: PredictionService, watchlist: &[&str]) -> AppState {
    AppState {
        config: Arc::new(test_config(watchlist)),
        predictions: Arc::new(service),
        store: Arc::new(PredictionStore::new_in_memory().unwrap()),
    }
}
