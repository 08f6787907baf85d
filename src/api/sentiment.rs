//! Sentiment API endpoints.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::ApiResponse;
use crate::error::{AppError, Result};
use crate::types::{MarketSentiment, MarketSentimentSnapshot};
use crate::AppState;

const DEFAULT_HISTORY_HOURS: u32 = 24;
const MAX_HISTORY_HOURS: u32 = 24 * 30;

#[derive(Debug, Serialize)]
pub struct SymbolSentimentResponse {
    pub symbol: String,
    pub score: f64,
}

#[derive(Debug, Deserialize)]
pub struct SentimentHistoryQuery {
    pub hours: Option<u32>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_market_sentiment))
        .route("/history", get(get_market_sentiment_history))
        .route("/:symbol", get(get_symbol_sentiment))
}

/// Sentiment score for a symbol, 50 when unavailable.
async fn get_symbol_sentiment(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Json<ApiResponse<SymbolSentimentResponse>> {
    let symbol = symbol.trim().to_uppercase();
    let score = state.predictions.sentiment_for(Some(&symbol)).await;
    Json(ApiResponse::new(SymbolSentimentResponse { symbol, score }))
}

/// Overall market mood. Each reading is recorded; failures are logged only.
async fn get_market_sentiment(State(state): State<AppState>) -> Json<ApiResponse<MarketSentiment>> {
    let sentiment = state.predictions.market_sentiment().await;
    if let Err(e) = state
        .store
        .save_market_sentiment(&sentiment, Utc::now().timestamp_millis())
    {
        warn!("Failed to save market sentiment: {}", e);
    }
    Json(ApiResponse::new(sentiment))
}

/// Recorded market mood readings, newest first.
async fn get_market_sentiment_history(
    State(state): State<AppState>,
    Query(query): Query<SentimentHistoryQuery>,
) -> Result<Json<ApiResponse<Vec<MarketSentimentSnapshot>>>> {
    let hours = query
        .hours
        .unwrap_or(DEFAULT_HISTORY_HOURS)
        .clamp(1, MAX_HISTORY_HOURS);
    let history = state.store.get_market_sentiment_history(hours)?;
    if history.is_empty() {
        return Err(AppError::NotFound(format!(
            "No market sentiment recorded in the last {} hours",
            hours
        )));
    }
    Ok(Json(ApiResponse::new(history)))
}
