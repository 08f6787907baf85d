//! Yahoo Finance chart API client.
//!
//! Serves both daily price history and current quotes from the v8 chart
//! endpoint. Exchange suffixes such as `.NS` are passed through unchanged.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::throttle::{retry_with_backoff, RequestThrottle};
use super::{PriceHistoryProvider, QuoteProvider};
use crate::config::SourceConfig;
use crate::error::SourceError;
use crate::types::{normalize_history, HistoryPoint, StockQuote};

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Range requested when only a quote is needed.
const QUOTE_RANGE: &str = "5d";

/// Wait used when a 429 carries no Retry-After header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Yahoo Finance chart response.
#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    meta: YahooMeta,
    timestamp: Option<Vec<i64>>,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooMeta {
    symbol: String,
    long_name: Option<String>,
    short_name: Option<String>,
    regular_market_price: Option<f64>,
    chart_previous_close: Option<f64>,
    previous_close: Option<f64>,
    regular_market_volume: Option<f64>,
    regular_market_day_high: Option<f64>,
    regular_market_day_low: Option<f64>,
    regular_market_time: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct YahooQuote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<f64>>>,
}

/// Uppercase and trim a symbol for the chart URL.
fn yahoo_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

fn into_result(response: YahooChartResponse) -> Result<YahooResult, SourceError> {
    if let Some(error) = response.chart.error {
        return Err(SourceError::NoData(format!(
            "{} - {}",
            error.code, error.description
        )));
    }

    response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| SourceError::NoData("empty chart result".into()))
}

/// Daily points with a positive close, sorted and deduplicated by date.
fn history_points(result: &YahooResult) -> Vec<HistoryPoint> {
    let Some(timestamps) = result.timestamp.as_ref() else {
        return Vec::new();
    };
    let empty = YahooQuote::default();
    let quote = result.indicators.quote.first().unwrap_or(&empty);

    let value = |series: &Option<Vec<Option<f64>>>, i: usize| {
        series
            .as_ref()
            .and_then(|s| s.get(i).copied().flatten())
            .unwrap_or(0.0)
    };

    let points = timestamps
        .iter()
        .enumerate()
        .filter_map(|(i, &timestamp)| {
            let close = value(&quote.close, i);
            if !close.is_finite() || close <= 0.0 {
                return None;
            }
            Some(HistoryPoint {
                date: timestamp * 1000,
                open: value(&quote.open, i),
                high: value(&quote.high, i),
                low: value(&quote.low, i),
                close,
                volume: value(&quote.volume, i),
            })
        })
        .collect();

    normalize_history(points)
}

/// Build a quote from the chart meta block, falling back to the last
/// point of the series for missing fields.
fn quote_from_result(result: &YahooResult) -> Result<StockQuote, SourceError> {
    let meta = &result.meta;
    let history = history_points(result);
    let last = history.last();

    let price = meta
        .regular_market_price
        .or_else(|| last.map(|p| p.close))
        .filter(|p| p.is_finite() && *p > 0.0)
        .ok_or_else(|| SourceError::NoData(format!("no price for {}", meta.symbol)))?;

    let previous = meta
        .chart_previous_close
        .or(meta.previous_close)
        .unwrap_or(price);
    let change = price - previous;
    let change_percent = if previous > 0.0 {
        change / previous * 100.0
    } else {
        0.0
    };

    Ok(StockQuote {
        symbol: meta.symbol.clone(),
        name: meta
            .long_name
            .clone()
            .or_else(|| meta.short_name.clone())
            .unwrap_or_else(|| meta.symbol.clone()),
        price,
        change,
        change_percent,
        volume: meta
            .regular_market_volume
            .or_else(|| last.map(|p| p.volume))
            .unwrap_or(0.0),
        market_cap: None,
        pe_ratio: None,
        day_high: meta.regular_market_day_high.unwrap_or(price),
        day_low: meta.regular_market_day_low.unwrap_or(price),
        timestamp: meta
            .regular_market_time
            .map(|t| t * 1000)
            .unwrap_or_else(|| Utc::now().timestamp_millis()),
    })
}

/// Yahoo Finance API client.
pub struct YahooFinanceClient {
    client: Client,
    throttle: RequestThrottle,
}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client.
    pub fn new(config: &SourceConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            throttle: RequestThrottle::new(config.quote_request_interval),
        }
    }

    async fn request_chart(&self, url: &str) -> Result<YahooResult, SourceError> {
        self.throttle.wait().await;
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            return Err(SourceError::RateLimited { retry_after_secs });
        }
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let data: YahooChartResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;
        into_result(data)
    }

    /// Fetch the chart for a symbol over `range` at daily interval.
    async fn fetch_chart(&self, symbol: &str, range: &str) -> Result<YahooResult, SourceError> {
        let url = format!(
            "{}/{}?range={}&interval=1d&includePrePost=false",
            CHART_URL,
            yahoo_symbol(symbol),
            range
        );
        debug!("Fetching Yahoo Finance chart: {}", url);

        retry_with_backoff(&format!("Yahoo chart {}", symbol), || self.request_chart(&url)).await
    }
}

#[async_trait]
impl PriceHistoryProvider for YahooFinanceClient {
    async fn fetch_history(
        &self,
        symbol: &str,
        period: &str,
    ) -> Result<Vec<HistoryPoint>, SourceError> {
        let result = self.fetch_chart(symbol, period).await?;
        let points = history_points(&result);
        if points.is_empty() {
            return Err(SourceError::NoData(format!("no history for {}", symbol)));
        }
        debug!("Fetched {} history points for {}", points.len(), symbol);
        Ok(points)
    }
}

#[async_trait]
impl QuoteProvider for YahooFinanceClient {
    async fn fetch_quote(&self, symbol: &str) -> Result<StockQuote, SourceError> {
        let result = self.fetch_chart(symbol, QUOTE_RANGE).await?;
        quote_from_result(&result)
    }
}
