//! Prediction API endpoints.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::ApiResponse;
use crate::error::{AppError, Result};
use crate::types::{Prediction, PredictionAccuracy};
use crate::AppState;

const DEFAULT_HISTORY_LIMIT: usize = 10;
const MAX_HISTORY_LIMIT: usize = 100;
const DEFAULT_ACCURACY_DAYS: u32 = 30;

/// Prediction for one symbol with the inputs it was made from.
#[derive(Debug, Serialize)]
pub struct SymbolPredictionResponse {
    pub symbol: String,
    pub current_price: f64,
    pub sentiment_score: f64,
    pub prediction: Prediction,
}

#[derive(Debug, Default, Deserialize)]
pub struct BatchRequest {
    #[serde(default)]
    pub symbols: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct AccuracyQuery {
    pub days: Option<u32>,
}

/// Create the predictions router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/batch", post(batch_predict))
        .route("/:symbol", get(get_prediction))
        .route("/:symbol/history", get(get_history))
        .route("/:symbol/accuracy", get(get_accuracy))
}

/// Archive a served prediction. Failures are logged, never surfaced.
fn persist(state: &AppState, prediction: &Prediction) {
    if let Err(e) = state.store.save_prediction(prediction) {
        warn!("Failed to save prediction for {}: {}", prediction.symbol, e);
    }
}

/// Predict a symbol from its live quote and sentiment.
async fn get_prediction(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<ApiResponse<SymbolPredictionResponse>>> {
    let (prediction, sentiment_score) = state.predictions.predict_symbol(&symbol).await?;
    persist(&state, &prediction);

    Ok(Json(ApiResponse::new(SymbolPredictionResponse {
        symbol: prediction.symbol.clone(),
        current_price: prediction.current_price,
        sentiment_score,
        prediction,
    })))
}

/// Predict several symbols; an empty list predicts the watchlist.
async fn batch_predict(
    State(state): State<AppState>,
    body: Option<Json<BatchRequest>>,
) -> Result<Json<ApiResponse<Vec<Prediction>>>> {
    let Json(request) = body.unwrap_or_default();
    let symbols = if request.symbols.is_empty() {
        state.config.watchlist.clone()
    } else {
        request.symbols
    };

    let predictions = state.predictions.batch_predict(&symbols).await;
    for prediction in &predictions {
        persist(&state, prediction);
    }

    Ok(Json(ApiResponse::new(predictions)))
}

/// Stored predictions for a symbol, newest first.
async fn get_history(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<Vec<Prediction>>>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);
    let history = state.store.get_prediction_history(&symbol, limit)?;
    Ok(Json(ApiResponse::new(history)))
}

/// Directional accuracy of stored predictions.
async fn get_accuracy(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<AccuracyQuery>,
) -> Result<Json<ApiResponse<PredictionAccuracy>>> {
    let days = query.days.unwrap_or(DEFAULT_ACCURACY_DAYS);
    let accuracy = state
        .store
        .get_prediction_accuracy(&symbol, days)?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "No predictions for {} in the last {} days",
                symbol.to_uppercase(),
                days
            ))
        })?;
    Ok(Json(ApiResponse::new(accuracy)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_request_defaults_to_empty() {
        let request: BatchRequest = serde_json::from_str("{}").unwrap();
        assert!(request.symbols.is_empty());

        let request: BatchRequest =
            serde_json::from_str(r#"{"symbols": ["TCS.NS", "INFY.NS"]}"#).unwrap();
        assert_eq!(request.symbols, vec!["TCS.NS", "INFY.NS"]);
    }

    #[test]
    fn test_history_query_parsing() {
        let query: HistoryQuery = serde_urlencoded::from_str("limit=5").unwrap();
        assert_eq!(query.limit, Some(5));
        let query: HistoryQuery = serde_urlencoded::from_str("").unwrap();
        assert_eq!(query.limit, None);
    }
}
