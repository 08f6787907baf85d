//! Prediction orchestration.
//!
//! A request moves through Validate -> FetchHistory -> ComputeIndicators ->
//! ComputeSignals -> ComputeConfidence -> Assemble. Only validation and the
//! history fetch can fail; the indicator stages always produce a value.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::PredictionConfig;
use crate::error::PredictionError;
use crate::services::cache::Cache;
use crate::services::confidence::{confidence, ConfidenceInputs};
use crate::services::indicators::IndicatorReadings;
use crate::services::round_to;
use crate::services::sentiment::{self, NEUTRAL_SCORE};
use crate::services::signals::{recommend, SignalInputs};
use crate::services::symbols;
use crate::sources::{PriceHistoryProvider, QuoteProvider, SentimentProvider};
use crate::types::{closes, normalize_history, HistoryPoint, MarketSentiment, Prediction, StockQuote};

/// Most quotes returned by a symbol search.
const SEARCH_LIMIT: usize = 10;

/// Weights of the predicted-price blend. They sum to 1.0.
const TREND_WEIGHT: f64 = 0.3;
const MOMENTUM_WEIGHT: f64 = 0.2;
const VOLATILITY_WEIGHT: f64 = 0.1;
const SENTIMENT_WEIGHT: f64 = 0.4;

/// Sentiment as a fractional deviation from neutral, in [-0.5, 0.5].
pub fn sentiment_factor(score: f64) -> f64 {
    (score - NEUTRAL_SCORE) / 100.0
}

/// Trim and uppercase a symbol, rejecting empty or whitespace-bearing input.
pub fn validate_symbol(symbol: &str) -> Result<String, PredictionError> {
    let symbol = symbol.trim();
    if symbol.is_empty() {
        return Err(PredictionError::InvalidInput("symbol is empty".into()));
    }
    if symbol.chars().any(char::is_whitespace) {
        return Err(PredictionError::InvalidInput(format!(
            "symbol contains whitespace: {symbol:?}"
        )));
    }
    Ok(symbol.to_uppercase())
}

fn validate_quote(quote: &StockQuote) -> Result<(), PredictionError> {
    if !quote.price.is_finite() || quote.price <= 0.0 {
        return Err(PredictionError::InvalidInput(format!(
            "price must be a positive number, got {}",
            quote.price
        )));
    }
    if !quote.volume.is_finite() || quote.volume < 0.0 {
        return Err(PredictionError::InvalidInput(format!(
            "volume must be a non-negative number, got {}",
            quote.volume
        )));
    }
    if !quote.change.is_finite() || !quote.change_percent.is_finite() {
        return Err(PredictionError::InvalidInput(
            "change fields must be numbers".into(),
        ));
    }
    Ok(())
}

fn validate_sentiment(score: f64) -> Result<(), PredictionError> {
    if !score.is_finite() || !(0.0..=100.0).contains(&score) {
        return Err(PredictionError::InvalidInput(format!(
            "sentiment score must be within 0-100, got {score}"
        )));
    }
    Ok(())
}

/// Build a prediction from an already validated quote and a history.
///
/// Pure apart from the id and timestamp. Fails only when the blend
/// produces a non-finite number.
pub fn compute_prediction(
    symbol: &str,
    quote: &StockQuote,
    sentiment_score: f64,
    history: &[HistoryPoint],
) -> Result<Prediction, PredictionError> {
    let prices = closes(history);
    let volumes: Vec<f64> = history.iter().map(|p| p.volume).collect();
    let readings = IndicatorReadings::compute(&prices, &volumes, quote.volume);

    let current_price = quote.price;
    let sentiment_factor = sentiment_factor(sentiment_score);
    let momentum = if readings.latest_price > 0.0 {
        readings.macd.histogram / readings.latest_price
    } else {
        0.0
    };

    let predicted_price = current_price
        * (1.0
            + readings.short_trend * TREND_WEIGHT
            + momentum * MOMENTUM_WEIGHT
            + readings.volatility * VOLATILITY_WEIGHT
            + sentiment_factor * SENTIMENT_WEIGHT);
    let price_change_percent = (predicted_price - current_price) / current_price * 100.0;

    let (signals, recommendation) = recommend(&SignalInputs::from_readings(
        &readings,
        current_price,
        sentiment_score,
    ));

    let confidence = confidence(&ConfidenceInputs {
        volatility: readings.volatility,
        data_points: prices.len(),
        rsi: readings.rsi,
        volume_ratio: readings.volume_ratio,
        sentiment_factor,
    });

    if !predicted_price.is_finite() || !price_change_percent.is_finite() {
        return Err(PredictionError::Internal(format!(
            "non-finite predicted price for {symbol}"
        )));
    }

    Ok(Prediction {
        id: Uuid::new_v4(),
        symbol: symbol.to_string(),
        current_price: round_to(current_price, 2),
        predicted_price: round_to(predicted_price, 2),
        price_change_percent: round_to(price_change_percent, 2),
        confidence: round_to(confidence, 1),
        recommendation,
        technical_indicators: readings.snapshot(),
        signals,
        sentiment_score: round_to(sentiment_score, 2),
        created_at: Utc::now().timestamp_millis(),
    })
}

/// Produces predictions from market data and sentiment.
///
/// Owns the TTL cache of fetched histories; every instance has its own.
pub struct PredictionService {
    history: Arc<dyn PriceHistoryProvider>,
    quotes: Arc<dyn QuoteProvider>,
    sentiment: Option<Arc<dyn SentimentProvider>>,
    cache: Cache<Arc<Vec<HistoryPoint>>>,
    config: PredictionConfig,
}

impl PredictionService {
    pub fn new(
        history: Arc<dyn PriceHistoryProvider>,
        quotes: Arc<dyn QuoteProvider>,
        sentiment: Option<Arc<dyn SentimentProvider>>,
        config: PredictionConfig,
    ) -> Self {
        Self {
            history,
            quotes,
            sentiment,
            cache: Cache::new(config.cache_ttl),
            config,
        }
    }

    fn cache_key(symbol: &str, period: &str) -> String {
        format!("prices:{}:{}", symbol, period)
    }

    /// Price history for a symbol, from cache when fresh.
    ///
    /// Any provider failure, or fewer than `min_data_points` distinct
    /// dates, is reported as insufficient history.
    pub async fn fetch_history(
        &self,
        symbol: &str,
        period: &str,
    ) -> Result<Arc<Vec<HistoryPoint>>, PredictionError> {
        let symbol = validate_symbol(symbol)?;
        let key = Self::cache_key(&symbol, period);

        let history = match self.cache.get(&key) {
            Some(cached) => {
                debug!("History cache hit for {}", key);
                cached
            }
            None => {
                debug!("History cache miss for {}, fetching", key);
                let points = self
                    .history
                    .fetch_history(&symbol, period)
                    .await
                    .map_err(|e| {
                        warn!("History fetch failed for {}: {}", symbol, e);
                        PredictionError::InsufficientHistory {
                            symbol: symbol.clone(),
                            available: 0,
                            required: self.config.min_data_points,
                        }
                    })?;
                let points = Arc::new(normalize_history(points));
                self.cache.set(key, points.clone());
                points
            }
        };

        if history.len() < self.config.min_data_points {
            return Err(PredictionError::InsufficientHistory {
                symbol,
                available: history.len(),
                required: self.config.min_data_points,
            });
        }

        Ok(history)
    }

    /// Predict a symbol's next price from a current quote and a sentiment
    /// score on the 0-100 scale.
    pub async fn predict_price(
        &self,
        symbol: &str,
        quote: &StockQuote,
        sentiment_score: f64,
    ) -> Result<Prediction, PredictionError> {
        let result = self.run_prediction(symbol, quote, sentiment_score).await;

        match &result {
            Ok(prediction) => debug!(
                "Predicted {} -> {} ({}, confidence {})",
                prediction.symbol,
                prediction.predicted_price,
                prediction.recommendation,
                prediction.confidence
            ),
            Err(e @ PredictionError::Internal(_)) => {
                error!("Prediction failed for {}: {}", symbol, e)
            }
            Err(e) => warn!("Prediction rejected for {}: {}", symbol, e),
        }

        result
    }

    async fn run_prediction(
        &self,
        symbol: &str,
        quote: &StockQuote,
        sentiment_score: f64,
    ) -> Result<Prediction, PredictionError> {
        let symbol = validate_symbol(symbol)?;
        validate_quote(quote)?;
        validate_sentiment(sentiment_score)?;

        let history = self
            .fetch_history(&symbol, &self.config.history_period)
            .await?;

        compute_prediction(&symbol, quote, sentiment_score, &history)
    }

    /// Current quote for a symbol, named from the known listings when the
    /// provider only echoes the ticker.
    pub async fn quote(&self, symbol: &str) -> Result<StockQuote, PredictionError> {
        let symbol = validate_symbol(symbol)?;

        let mut quote = self.quotes.fetch_quote(&symbol).await.map_err(|e| {
            warn!("Quote fetch failed for {}: {}", symbol, e);
            PredictionError::QuoteUnavailable {
                symbol: symbol.clone(),
                reason: e.to_string(),
            }
        })?;

        if quote.name.is_empty() || quote.name.eq_ignore_ascii_case(&quote.symbol) {
            if let Some(name) = symbols::name_of(&symbol) {
                quote.name = name.to_string();
            }
        }
        Ok(quote)
    }

    /// Quotes for the known listings matching `query`.
    ///
    /// Listings whose quote fails are skipped; at most ten are returned.
    pub async fn search_stocks(&self, query: &str) -> Vec<StockQuote> {
        let mut results = Vec::new();

        for known in symbols::search(query) {
            match self.quote(known.symbol).await {
                Ok(quote) => results.push(quote),
                Err(e) => warn!("Skipping {} in search: {}", known.symbol, e),
            }
            if results.len() >= SEARCH_LIMIT {
                break;
            }
        }

        debug!("Stock search {:?} matched {} quotes", query, results.len());
        results
    }

    /// Fetch the quote and sentiment for a symbol, then predict.
    ///
    /// Returns the prediction and the sentiment score it used.
    pub async fn predict_symbol(&self, symbol: &str) -> Result<(Prediction, f64), PredictionError> {
        let symbol = validate_symbol(symbol)?;
        let quote = self.quote(&symbol).await?;

        let sentiment_score = self.sentiment_for(Some(&symbol)).await;
        let prediction = self.predict_price(&symbol, &quote, sentiment_score).await?;
        Ok((prediction, sentiment_score))
    }

    /// Predict each symbol with neutral sentiment.
    ///
    /// A symbol whose quote or prediction fails is logged and skipped.
    pub async fn batch_predict(&self, symbols: &[String]) -> Vec<Prediction> {
        let mut predictions = Vec::with_capacity(symbols.len());

        for symbol in symbols {
            let quote = match self.quotes.fetch_quote(symbol).await {
                Ok(quote) => quote,
                Err(e) => {
                    warn!("Skipping {} in batch: quote unavailable: {}", symbol, e);
                    continue;
                }
            };

            match self.predict_price(symbol, &quote, NEUTRAL_SCORE).await {
                Ok(prediction) => predictions.push(prediction),
                Err(e) => warn!("Skipping {} in batch: {}", symbol, e),
            }
        }

        info!(
            "Batch prediction finished: {} of {} symbols",
            predictions.len(),
            symbols.len()
        );
        predictions
    }

    /// Sentiment score for a symbol (or the market), 50 when unavailable.
    pub async fn sentiment_for(&self, symbol: Option<&str>) -> f64 {
        let Some(provider) = &self.sentiment else {
            return NEUTRAL_SCORE;
        };

        match provider.score(symbol).await {
            Ok(score) if score.is_finite() => score.clamp(0.0, 100.0),
            Ok(score) => {
                warn!("Discarding non-finite sentiment {} for {:?}", score, symbol);
                NEUTRAL_SCORE
            }
            Err(e) => {
                warn!("Sentiment unavailable for {:?}: {}", symbol, e);
                NEUTRAL_SCORE
            }
        }
    }

    /// Overall market mood, neutral when unavailable.
    pub async fn market_sentiment(&self) -> MarketSentiment {
        let Some(provider) = &self.sentiment else {
            return MarketSentiment::default();
        };

        match provider.readings(None).await {
            Ok(readings) => sentiment::market_sentiment(&readings),
            Err(e) => {
                warn!("Market sentiment unavailable: {}", e);
                MarketSentiment::default()
            }
        }
    }

    /// Drop every cached history for a symbol. Returns the number removed.
    pub fn invalidate(&self, symbol: &str) -> usize {
        match validate_symbol(symbol) {
            Ok(symbol) => self.cache.remove_prefix(&format!("prices:{}:", symbol)),
            Err(_) => 0,
        }
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Evict stale histories, and stale entries of the sentiment provider.
    ///
    /// Stale entries are otherwise only dropped when their key is read
    /// again. Returns the number of entries removed.
    pub fn purge_stale(&self) -> usize {
        let histories = self.cache.cleanup();
        let sentiment = self
            .sentiment
            .as_ref()
            .map_or(0, |provider| provider.purge_stale());

        if histories + sentiment > 0 {
            debug!(
                "Purged {} stale histories and {} stale sentiment entries",
                histories, sentiment
            );
        }
        histories + sentiment
    }

    /// Number of cached histories, stale ones included.
    pub fn cached_histories(&self) -> usize {
        self.cache.len()
    }
}
