//! Stock quote and search endpoints.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::ApiResponse;
use crate::error::Result;
use crate::types::StockQuote;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/search", get(search_stocks))
        .route("/:symbol", get(get_quote))
}

/// Current quote for a symbol.
async fn get_quote(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<ApiResponse<StockQuote>>> {
    let quote = state.predictions.quote(&symbol).await?;
    Ok(Json(ApiResponse::new(quote)))
}

/// Quotes for known listings matching `q`; empty for a blank query.
async fn search_stocks(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<ApiResponse<Vec<StockQuote>>> {
    Json(ApiResponse::new(
        state.predictions.search_stocks(&query.q).await,
    ))
}
