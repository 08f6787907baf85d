use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub use crate::services::prediction_store::StoreError;

/// Terminal failure of a prediction request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictionError {
    /// Malformed symbol, quote or sentiment. Caller error, never retried.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Fewer usable closes than the model requires.
    #[error("Not enough historical data for {symbol}: {available} of {required} points")]
    InsufficientHistory {
        symbol: String,
        available: usize,
        required: usize,
    },

    /// The current quote could not be fetched.
    #[error("Quote unavailable for {symbol}: {reason}")]
    QuoteUnavailable { symbol: String, reason: String },

    /// Unexpected internal fault.
    #[error("Prediction failed: {0}")]
    Internal(String),
}

/// Failure reported by an external data provider.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Status(u16),

    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("No data: {0}")]
    NoData(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

impl SourceError {
    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            SourceError::Request(_) | SourceError::RateLimited { .. } => true,
            SourceError::Status(code) => *code >= 500,
            _ => false,
        }
    }
}

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unprocessable: {0}")]
    Unprocessable(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl From<PredictionError> for AppError {
    fn from(err: PredictionError) -> Self {
        let message = err.to_string();
        match err {
            PredictionError::InvalidInput(_) => AppError::BadRequest(message),
            PredictionError::InsufficientHistory { .. } => AppError::Unprocessable(message),
            PredictionError::QuoteUnavailable { .. } => AppError::ExternalApi(message),
            PredictionError::Internal(_) => AppError::Internal(message),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            AppError::ExternalApi(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            AppError::SerdeJson(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            AppError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            AppError::Anyhow(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prediction_error_status_mapping() {
        let cases = [
            (
                PredictionError::InvalidInput("empty symbol".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                PredictionError::InsufficientHistory {
                    symbol: "TCS.NS".into(),
                    available: 12,
                    required: 30,
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                PredictionError::QuoteUnavailable {
                    symbol: "TCS.NS".into(),
                    reason: "timeout".into(),
                },
                StatusCode::BAD_GATEWAY,
            ),
            (
                PredictionError::Internal("non-finite price".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            let response = AppError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn test_insufficient_history_message() {
        let err = PredictionError::InsufficientHistory {
            symbol: "ITC.NS".into(),
            available: 5,
            required: 30,
        };
        assert_eq!(
            err.to_string(),
            "Not enough historical data for ITC.NS: 5 of 30 points"
        );
    }

    #[test]
    fn test_source_error_retryable() {
        assert!(SourceError::Status(503).is_retryable());
        assert!(SourceError::RateLimited { retry_after_secs: 5 }.is_retryable());
        assert!(!SourceError::Status(404).is_retryable());
        assert!(!SourceError::Parse("bad json".into()).is_retryable());
        assert!(!SourceError::NoData("empty".into()).is_retryable());
    }
}
