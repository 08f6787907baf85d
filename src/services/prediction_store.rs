//! SQLite persistence for prediction history and market mood snapshots.
//!
//! Every prediction served is archived here so its direction can later be
//! checked against the price observed by the next prediction.

use crate::services::round_to;
use crate::types::{
    MarketSentiment, MarketSentimentSnapshot, Prediction, PredictionAccuracy, Recommendation,
    SentimentLabel, SentimentTrend, SignalTally, TechnicalIndicators,
};
use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

const HOUR_MS: i64 = 3_600_000;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Changes smaller than this count as flat.
const FLAT_THRESHOLD: f64 = 0.01;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database connection lock poisoned")]
    Poisoned,
}

/// SQLite store for served predictions and market sentiment.
pub struct PredictionStore {
    conn: Mutex<Connection>,
}

impl PredictionStore {
    /// Open (or create) a store at the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        info!("Prediction store initialized");
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    pub fn new_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        debug!("In-memory prediction store initialized");
        Ok(store)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        let conn = self.conn()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS predictions (
                id TEXT PRIMARY KEY,
                symbol TEXT NOT NULL,
                current_price REAL NOT NULL,
                predicted_price REAL NOT NULL,
                price_change_percent REAL NOT NULL,
                confidence REAL NOT NULL,
                recommendation TEXT NOT NULL,
                buy_signals INTEGER NOT NULL,
                sell_signals INTEGER NOT NULL,
                sentiment_score REAL NOT NULL,
                technical_indicators TEXT NOT NULL,
                created_at INTEGER NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_predictions_symbol_created
             ON predictions(symbol, created_at DESC)",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS market_sentiment (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                score REAL NOT NULL,
                label TEXT NOT NULL,
                trend TEXT NOT NULL,
                tweet_count INTEGER NOT NULL,
                positive INTEGER NOT NULL,
                negative INTEGER NOT NULL,
                neutral INTEGER NOT NULL,
                average_reliability REAL,
                recorded_at INTEGER NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_market_sentiment_recorded
             ON market_sentiment(recorded_at DESC)",
            [],
        )?;

        Ok(())
    }

    /// Archive a prediction. Saving the same id twice overwrites it.
    pub fn save_prediction(&self, prediction: &Prediction) -> Result<(), StoreError> {
        let indicators = serde_json::to_string(&prediction.technical_indicators)?;
        let conn = self.conn()?;

        conn.execute(
            "INSERT OR REPLACE INTO predictions
             (id, symbol, current_price, predicted_price, price_change_percent, confidence,
              recommendation, buy_signals, sell_signals, sentiment_score,
              technical_indicators, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                prediction.id.to_string(),
                prediction.symbol.to_uppercase(),
                prediction.current_price,
                prediction.predicted_price,
                prediction.price_change_percent,
                prediction.confidence,
                prediction.recommendation.label(),
                prediction.signals.buy_signals,
                prediction.signals.sell_signals,
                prediction.sentiment_score,
                indicators,
                prediction.created_at,
            ],
        )?;

        debug!("Saved prediction {} for {}", prediction.id, prediction.symbol);
        Ok(())
    }

    /// Most recent predictions for a symbol, newest first.
    pub fn get_prediction_history(
        &self,
        symbol: &str,
        limit: usize,
    ) -> Result<Vec<Prediction>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, symbol, current_price, predicted_price, price_change_percent,
                    confidence, recommendation, buy_signals, sell_signals, sentiment_score,
                    technical_indicators, created_at
             FROM predictions
             WHERE symbol = ?1
             ORDER BY created_at DESC
             LIMIT ?2",
        )?;

        let rows = stmt.query_map(
            params![symbol.to_uppercase(), limit as i64],
            prediction_from_row,
        )?;
        let predictions = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(predictions)
    }

    /// Number of stored predictions for a symbol.
    pub fn prediction_count(&self, symbol: &str) -> Result<usize, StoreError> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM predictions WHERE symbol = ?1",
            params![symbol.to_uppercase()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Directional accuracy of a symbol's predictions over the last `days`.
    ///
    /// `None` when no prediction falls in the window.
    pub fn get_prediction_accuracy(
        &self,
        symbol: &str,
        days: u32,
    ) -> Result<Option<PredictionAccuracy>, StoreError> {
        let cutoff = Utc::now().timestamp_millis() - i64::from(days) * DAY_MS;
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT current_price, predicted_price
             FROM predictions
             WHERE symbol = ?1 AND created_at >= ?2
             ORDER BY created_at ASC",
        )?;

        let rows = stmt.query_map(params![symbol.to_uppercase(), cutoff], |row| {
            Ok((row.get::<_, f64>(0)?, row.get::<_, f64>(1)?))
        })?;
        let observations = rows.collect::<Result<Vec<_>, _>>()?;

        let (total, accurate) = directional_accuracy(&observations);
        if total == 0 {
            return Ok(None);
        }

        Ok(Some(PredictionAccuracy {
            symbol: symbol.to_uppercase(),
            accuracy_percent: round_to(accurate as f64 / total as f64 * 100.0, 2),
            total_predictions: total,
            accurate_predictions: accurate,
            period_days: days,
        }))
    }

    /// Delete predictions older than `days`. Returns the number removed.
    pub fn cleanup_old_predictions(&self, days: i64) -> Result<usize, StoreError> {
        let cutoff = Utc::now().timestamp_millis() - days * DAY_MS;
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM predictions WHERE created_at < ?1",
            params![cutoff],
        )?;

        if deleted > 0 {
            info!("Removed {} predictions older than {} days", deleted, days);
        }
        Ok(deleted)
    }

    /// Record a market mood reading taken at `recorded_at` (unix ms).
    pub fn save_market_sentiment(
        &self,
        sentiment: &MarketSentiment,
        recorded_at: i64,
    ) -> Result<(), StoreError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO market_sentiment
             (score, label, trend, tweet_count, positive, negative, neutral,
              average_reliability, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                sentiment.score,
                sentiment.label.label(),
                sentiment.trend.label(),
                sentiment.tweet_count,
                sentiment.positive,
                sentiment.negative,
                sentiment.neutral,
                sentiment.average_reliability,
                recorded_at,
            ],
        )?;

        debug!("Saved market sentiment {} ({})", sentiment.score, sentiment.trend.label());
        Ok(())
    }

    /// Market mood readings from the last `hours`, newest first.
    pub fn get_market_sentiment_history(
        &self,
        hours: u32,
    ) -> Result<Vec<MarketSentimentSnapshot>, StoreError> {
        let cutoff = Utc::now().timestamp_millis() - i64::from(hours) * HOUR_MS;
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT score, label, trend, tweet_count, positive, negative, neutral,
                    average_reliability, recorded_at
             FROM market_sentiment
             WHERE recorded_at >= ?1
             ORDER BY recorded_at DESC, id DESC",
        )?;

        let rows = stmt.query_map(params![cutoff], snapshot_from_row)?;
        let snapshots = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(snapshots)
    }

    /// Delete market mood readings older than `days`. Returns the number removed.
    pub fn cleanup_market_sentiment(&self, days: i64) -> Result<usize, StoreError> {
        let cutoff = Utc::now().timestamp_millis() - days * DAY_MS;
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM market_sentiment WHERE recorded_at < ?1",
            params![cutoff],
        )?;

        if deleted > 0 {
            info!("Removed {} market sentiment readings older than {} days", deleted, days);
        }
        Ok(deleted)
    }
}

/// Count predictions whose direction matched the next observed price.
///
/// `observations` are `(current_price, predicted_price)` pairs, oldest
/// first. The next entry's current price is the actual outcome of the one
/// before it. Both changes below 0.01 in magnitude also count as a match.
/// Returns `(total, accurate)`; the newest entry has no outcome yet and only
/// counts toward the total.
pub fn directional_accuracy(observations: &[(f64, f64)]) -> (u32, u32) {
    let accurate = observations
        .windows(2)
        .filter(|pair| {
            let (current, predicted) = pair[0];
            let (actual, _) = pair[1];
            let predicted_change = predicted - current;
            let actual_change = actual - current;

            (predicted_change > 0.0 && actual_change > 0.0)
                || (predicted_change < 0.0 && actual_change < 0.0)
                || (predicted_change.abs() < FLAT_THRESHOLD && actual_change.abs() < FLAT_THRESHOLD)
        })
        .count();

    (observations.len() as u32, accurate as u32)
}

fn conversion_error(
    column: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(err))
}

fn unknown_label(column: usize, label: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        column,
        Type::Text,
        format!("unknown label {label:?}").into(),
    )
}

fn snapshot_from_row(row: &Row<'_>) -> Result<MarketSentimentSnapshot, rusqlite::Error> {
    let label: String = row.get(1)?;
    let label = SentimentLabel::from_label(&label).ok_or_else(|| unknown_label(1, &label))?;
    let trend: String = row.get(2)?;
    let trend = SentimentTrend::from_label(&trend).ok_or_else(|| unknown_label(2, &trend))?;

    Ok(MarketSentimentSnapshot {
        sentiment: MarketSentiment {
            score: row.get(0)?,
            label,
            trend,
            tweet_count: row.get(3)?,
            positive: row.get(4)?,
            negative: row.get(5)?,
            neutral: row.get(6)?,
            average_reliability: row.get(7)?,
        },
        recorded_at: row.get(8)?,
    })
}

fn prediction_from_row(row: &Row<'_>) -> Result<Prediction, rusqlite::Error> {
    let id: String = row.get(0)?;
    let id = Uuid::parse_str(&id).map_err(|e| conversion_error(0, e))?;

    let label: String = row.get(6)?;
    let recommendation =
        Recommendation::from_label(&label).ok_or_else(|| unknown_label(6, &label))?;

    let indicators: String = row.get(10)?;
    let technical_indicators: TechnicalIndicators =
        serde_json::from_str(&indicators).map_err(|e| conversion_error(10, e))?;

    Ok(Prediction {
        id,
        symbol: row.get(1)?,
        current_price: row.get(2)?,
        predicted_price: row.get(3)?,
        price_change_percent: row.get(4)?,
        confidence: row.get(5)?,
        recommendation,
        technical_indicators,
        signals: SignalTally::new(row.get(7)?, row.get(8)?),
        sentiment_score: row.get(9)?,
        created_at: row.get(11)?,
    })
}
