use std::sync::Arc;
use std::time::Duration;

use stocksense::config::Config;
use stocksense::services::{PredictionService, PredictionStore};
use stocksense::sources::{SentimentProvider, TwitterClient, YahooFinanceClient};
use stocksense::AppState;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How often stored rows past retention and stale cache entries are purged.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stocksense=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Arc::new(Config::from_env());
    info!("Starting StockSense server on {}:{}", config.host, config.port);
    if !config.prediction.period_covers_minimum() {
        warn!(
            "HISTORY_PERIOD {} yields fewer than {} closes, predictions will fail",
            config.prediction.history_period, config.prediction.min_data_points
        );
    }

    let yahoo = Arc::new(YahooFinanceClient::new(&config.sources));
    let sentiment: Option<Arc<dyn SentimentProvider>> = match &config.twitter_bearer_token {
        Some(token) => Some(Arc::new(TwitterClient::new(token.clone(), &config.sources))),
        None => {
            warn!("TWITTER_BEARER_TOKEN not set, sentiment will be neutral");
            None
        }
    };

    let predictions = Arc::new(PredictionService::new(
        yahoo.clone(),
        yahoo,
        sentiment,
        config.prediction.clone(),
    ));

    let store = Arc::new(PredictionStore::new(&config.database_path)?);
    info!("Prediction history stored at {}", config.database_path);

    // Once a day, purge stored rows past retention and stale cache entries
    {
        let store = store.clone();
        let predictions = predictions.clone();
        let retention_days = config.retention_days;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(CLEANUP_INTERVAL);
            loop {
                ticker.tick().await;
                if let Err(e) = store.cleanup_old_predictions(retention_days) {
                    warn!("Prediction cleanup failed: {}", e);
                }
                if let Err(e) = store.cleanup_market_sentiment(retention_days) {
                    warn!("Market sentiment cleanup failed: {}", e);
                }
                predictions.purge_stale();
            }
        });
    }

    let state = AppState {
        config: config.clone(),
        predictions,
        store,
    };

    // Start the server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("StockSense server listening on {}", addr);

    axum::serve(listener, stocksense::app(state)).await?;

    Ok(())
}
