//! Retry coordinator with exponential backoff.
//!
//! Wraps a single-attempt fetch in a bounded retry loop. Terminal failures
//! (absent resources, malformed payloads, client errors) short-circuit
//! immediately: retrying a guaranteed-absent resource only burns backoff
//! time and delays the user-visible error.

use polylens_core::{FetchResult, RetryConfig};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Retry schedule for outbound calls.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts including the first.
    pub max_attempts: u32,
    /// Sleep before the first retry; doubles per subsequent retry.
    pub base_delay: Duration,
    /// Backoff ceiling.
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
        }
    }

    /// Delay before attempt `n` (1-based): `2^(n-2) * base_delay`, capped.
    fn delay_before(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(2).min(20);
        let delay = self.base_delay.saturating_mul(1u32 << exp);
        delay.min(self.max_delay)
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts, config.base_delay(), config.max_delay())
    }
}

/// Run `f` until it succeeds, fails terminally, or the budget is spent.
///
/// Only retryable failures (timeout, network, 5xx, 429) consume attempts;
/// the sleep between attempts suspends just the calling task. The last
/// failure propagates when the budget is exhausted.
pub async fn with_retry<T, F, Fut>(op: &str, policy: &RetryPolicy, mut f: F) -> FetchResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = FetchResult<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1u32;
    loop {
        match f().await {
            Ok(value) => return Ok(value),
            Err(err) if !err.is_retryable() => return Err(err),
            Err(err) if attempt >= max_attempts => {
                warn!(op, attempt, error = %err, "retry budget exhausted");
                return Err(err);
            }
            Err(err) => {
                let delay = policy.delay_before(attempt + 1);
                warn!(
                    op,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "transient failure, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
