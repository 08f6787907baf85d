use std::env;
use std::time::Duration;

/// Default symbols used when a batch request names none.
const DEFAULT_WATCHLIST: &str = "RELIANCE.NS,TCS.NS,HDFCBANK.NS,INFY.NS,ITC.NS";

/// Settings handed to the prediction orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionConfig {
    /// History period requested from the price provider (e.g. "3mo").
    pub history_period: String,
    /// Minimum number of distinct closes required for a prediction.
    pub min_data_points: usize,
    /// How long a fetched history stays fresh.
    pub cache_ttl: Duration,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            history_period: "3mo".to_string(),
            min_data_points: 30,
            cache_ttl: Duration::from_secs(300),
        }
    }
}

impl PredictionConfig {
    /// Approximate daily closes a provider returns for the history period.
    ///
    /// `None` for periods without a fixed length ("ytd", "max").
    pub fn expected_trading_days(&self) -> Option<usize> {
        let days = match self.history_period.as_str() {
            "1d" => 1,
            "5d" => 5,
            "1mo" => 21,
            "3mo" => 63,
            "6mo" => 126,
            "1y" => 252,
            "2y" => 504,
            "5y" => 1_260,
            "10y" => 2_520,
            _ => return None,
        };
        Some(days)
    }

    /// Whether the history period can satisfy `min_data_points` at all.
    pub fn period_covers_minimum(&self) -> bool {
        self.expected_trading_days()
            .map_or(true, |days| days >= self.min_data_points)
    }
}

/// Rate limits and query sizes for the upstream clients.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceConfig {
    /// Minimum spacing between quote/history requests.
    pub quote_request_interval: Duration,
    /// Minimum spacing between social search requests.
    pub twitter_request_interval: Duration,
    /// Tweets requested per search (10-100).
    pub tweets_per_query: u32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            quote_request_interval: Duration::from_millis(1500),
            twitter_request_interval: Duration::from_millis(1000),
            tweets_per_query: 20,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// SQLite database path for prediction history.
    pub database_path: String,
    /// Bearer token for the social search API. Sentiment is neutral without it.
    pub twitter_bearer_token: Option<String>,
    /// Symbols predicted by a batch request with no symbols.
    pub watchlist: Vec<String>,
    /// Days of prediction history to keep.
    pub retention_days: i64,
    pub prediction: PredictionConfig,
    pub sources: SourceConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let prediction_defaults = PredictionConfig::default();
        let source_defaults = SourceConfig::default();

        let watchlist = parse_watchlist(
            &env::var("WATCHLIST").unwrap_or_else(|_| DEFAULT_WATCHLIST.to_string()),
        );

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "stocksense.db".to_string()),
            twitter_bearer_token: env::var("TWITTER_BEARER_TOKEN")
                .ok()
                .filter(|t| !t.trim().is_empty()),
            watchlist,
            retention_days: env::var("RETENTION_PREDICTIONS_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(90),
            prediction: PredictionConfig {
                history_period: env::var("HISTORY_PERIOD")
                    .unwrap_or(prediction_defaults.history_period),
                min_data_points: env::var("MIN_DATA_POINTS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(prediction_defaults.min_data_points),
                cache_ttl: env::var("CACHE_TTL_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .map(Duration::from_secs)
                    .unwrap_or(prediction_defaults.cache_ttl),
            },
            sources: SourceConfig {
                quote_request_interval: env::var("QUOTE_REQUEST_INTERVAL_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .map(Duration::from_millis)
                    .unwrap_or(source_defaults.quote_request_interval),
                twitter_request_interval: env::var("TWITTER_REQUEST_INTERVAL_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .map(Duration::from_millis)
                    .unwrap_or(source_defaults.twitter_request_interval),
                tweets_per_query: env::var("TWEETS_PER_QUERY")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .map(|n: u32| n.clamp(10, 100))
                    .unwrap_or(source_defaults.tweets_per_query),
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Parse a comma-separated symbol list, dropping blanks.
fn parse_watchlist(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}
