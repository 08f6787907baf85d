//! Request spacing and retry for upstream APIs.

use std::future::Future;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_retry::strategy::ExponentialBackoff;
use tokio_retry::RetryIf;
use tracing::warn;

use crate::error::SourceError;

/// Retries after the first attempt.
pub const MAX_RETRIES: usize = 3;

/// Enforces a minimum interval between consecutive requests.
pub struct RequestThrottle {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RequestThrottle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    /// Sleep until the interval since the previous request has passed.
    ///
    /// Holding the lock across the sleep queues concurrent callers.
    pub async fn wait(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let ready_at = previous + self.min_interval;
            if ready_at > Instant::now() {
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last = Some(Instant::now());
    }
}

/// Backoff delays of 1 s, 2 s and 4 s.
pub fn backoff() -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(2)
        .factor(500)
        .take(MAX_RETRIES)
}

/// Run `operation`, retrying retryable failures with [`backoff`].
pub async fn retry_with_backoff<F, Fut, T>(label: &str, mut operation: F) -> Result<T, SourceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SourceError>>,
{
    RetryIf::spawn(
        backoff(),
        || operation(),
        |e: &SourceError| {
            let retry = e.is_retryable();
            if retry {
                warn!("{} failed, retrying: {}", label, e);
            }
            retry
        },
    )
    .await
}
