//! Twitter v2 recent-search client scored with the sentiment lexicon.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::throttle::RequestThrottle;
use super::SentimentProvider;
use crate::config::SourceConfig;
use crate::error::SourceError;
use crate::services::sentiment;
use crate::services::Cache;
use crate::types::SentimentReading;

const SEARCH_URL: &str = "https://api.twitter.com/2/tweets/search/recent";

/// Query used for overall market mood.
pub const MARKET_QUERY: &str = "(stocks OR NSE OR Sensex OR Nifty) lang:en -is:retweet";

const CACHE_TTL: Duration = Duration::from_secs(300);

/// Wait used when a 429 carries no usable reset header.
const DEFAULT_RESET_SECS: u64 = 900;

/// Name fragments that suggest a finance professional.
const FINANCIAL_KEYWORDS: &[&str] = &[
    "analyst", "trader", "finance", "investment", "market", "equity", "portfolio", "fund",
];

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<Tweet>,
    #[serde(default)]
    includes: Includes,
}

#[derive(Debug, Default, Deserialize)]
struct Includes {
    #[serde(default)]
    users: Vec<Author>,
}

#[derive(Debug, Deserialize)]
struct Tweet {
    text: String,
    #[serde(default)]
    author_id: Option<String>,
    #[serde(default)]
    public_metrics: TweetMetrics,
}

#[derive(Debug, Default, Deserialize)]
struct TweetMetrics {
    #[serde(default)]
    retweet_count: u64,
    #[serde(default)]
    like_count: u64,
}

#[derive(Debug, Deserialize)]
struct Author {
    id: String,
    #[serde(default)]
    username: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    verified: bool,
    #[serde(default)]
    public_metrics: AuthorMetrics,
}

#[derive(Debug, Default, Deserialize)]
struct AuthorMetrics {
    #[serde(default)]
    followers_count: u64,
}

/// Search query for a symbol's cashtag and hashtag, exchange suffix removed.
pub fn symbol_query(symbol: &str) -> String {
    let base = symbol.trim().trim_start_matches('$');
    let base = base.split('.').next().unwrap_or(base).to_uppercase();
    format!("(${base} OR #{base}) lang:en -is:retweet")
}

/// Seconds until an `x-rate-limit-reset` epoch, at least 1.
fn seconds_until_reset(reset_epoch: Option<i64>, now_epoch: i64) -> u64 {
    match reset_epoch {
        Some(reset) => (reset - now_epoch).max(1) as u64,
        None => DEFAULT_RESET_SECS,
    }
}

/// How much weight an author's voice deserves, 0-100.
///
/// Verification, reach, the tweet's engagement, a username without a
/// trailing number run and a finance-sounding display name all add points.
/// Tweets without an expanded author score 0.
fn author_reliability(author: Option<&Author>, tweet: &Tweet) -> u8 {
    let Some(author) = author else {
        return 0;
    };

    let mut score = 0u32;
    if author.verified {
        score += 40;
    }

    score += match author.public_metrics.followers_count {
        100_000.. => 30,
        50_000.. => 25,
        10_000.. => 20,
        5_000.. => 15,
        1_000.. => 10,
        500.. => 5,
        _ => 0,
    };

    let TweetMetrics {
        retweet_count: retweets,
        like_count: likes,
    } = tweet.public_metrics;
    score += if retweets >= 100 || likes >= 500 {
        15
    } else if retweets >= 50 || likes >= 200 {
        10
    } else if retweets >= 10 || likes >= 50 {
        5
    } else {
        0
    };

    let tail: Vec<char> = author.username.chars().rev().take(4).collect();
    if !tail.is_empty() && !tail.iter().any(char::is_ascii_digit) {
        score += 5;
    }

    let name = author.name.to_lowercase();
    if FINANCIAL_KEYWORDS.iter().any(|k| name.contains(k)) {
        score += 10;
    }

    score.min(100) as u8
}

/// Score every tweet of a search response, rating its author when the
/// response expanded one.
fn score_tweets(response: &SearchResponse) -> Vec<SentimentReading> {
    let authors: HashMap<&str, &Author> = response
        .includes
        .users
        .iter()
        .map(|a| (a.id.as_str(), a))
        .collect();

    response
        .data
        .iter()
        .map(|tweet| {
            let author = tweet
                .author_id
                .as_deref()
                .and_then(|id| authors.get(id).copied());
            SentimentReading {
                reliability: author.map(|a| author_reliability(Some(a), tweet)),
                ..sentiment::analyze(&tweet.text)
            }
        })
        .collect()
}

/// Twitter recent-search client.
pub struct TwitterClient {
    client: Client,
    bearer_token: String,
    max_results: u32,
    throttle: RequestThrottle,
    rate_limited_until: Mutex<Option<Instant>>,
    cache: Cache<Vec<SentimentReading>>,
}

impl TwitterClient {
    pub fn new(bearer_token: impl Into<String>, config: &SourceConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            bearer_token: bearer_token.into(),
            max_results: config.tweets_per_query.clamp(10, 100),
            throttle: RequestThrottle::new(config.twitter_request_interval),
            rate_limited_until: Mutex::new(None),
            cache: Cache::new(CACHE_TTL),
        }
    }

    /// Fail fast while a previous 429 window is still open.
    async fn check_rate_limit(&self) -> Result<(), SourceError> {
        let until = self.rate_limited_until.lock().await;
        if let Some(until) = *until {
            let now = Instant::now();
            if until > now {
                return Err(SourceError::RateLimited {
                    retry_after_secs: (until - now).as_secs().max(1),
                });
            }
        }
        Ok(())
    }

    async fn search(&self, query: &str) -> Result<Vec<SentimentReading>, SourceError> {
        if let Some(cached) = self.cache.get(query) {
            debug!("Tweet cache hit for {}", query);
            return Ok(cached);
        }

        self.check_rate_limit().await?;
        self.throttle.wait().await;

        debug!("Searching tweets: {}", query);
        let response = self
            .client
            .get(SEARCH_URL)
            .bearer_auth(&self.bearer_token)
            .query(&[
                ("query", query.to_string()),
                ("max_results", self.max_results.to_string()),
                ("tweet.fields", "author_id,public_metrics".to_string()),
                ("expansions", "author_id".to_string()),
                ("user.fields", "username,name,verified,public_metrics".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let reset = response
                .headers()
                .get("x-rate-limit-reset")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            let retry_after_secs = seconds_until_reset(reset, Utc::now().timestamp());
            *self.rate_limited_until.lock().await =
                Some(Instant::now() + Duration::from_secs(retry_after_secs));
            warn!("Twitter rate limit hit, backing off {}s", retry_after_secs);
            return Err(SourceError::RateLimited { retry_after_secs });
        }
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        let readings = score_tweets(&body);
        debug!("Scored {} tweets for {}", readings.len(), query);
        self.cache.set(query.to_string(), readings.clone());
        Ok(readings)
    }
}

#[async_trait]
impl SentimentProvider for TwitterClient {
    async fn readings(&self, symbol: Option<&str>) -> Result<Vec<SentimentReading>, SourceError> {
        let query = match symbol {
            Some(symbol) => symbol_query(symbol),
            None => MARKET_QUERY.to_string(),
        };
        self.search(&query).await
    }

    fn purge_stale(&self) -> usize {
        self.cache.cleanup()
    }
}
