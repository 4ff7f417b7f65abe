//! Generic retry with exponential backoff and jitter.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::warn;

/// Retry policy parameters.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Extra attempts after the initial one
    pub max_retries: u32,

    /// Delay before the first retry; doubles on each subsequent one
    pub base_delay: Duration,

    /// Ceiling on any single delay, jitter included
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(10_000),
        }
    }
}

/// Classifies failures for the retry loop.
///
/// Implemented by the error type of whatever operation is being retried;
/// the loop itself assumes nothing about the transport.
pub trait Retryable {
    /// Whether another attempt could plausibly succeed.
    fn is_transient(&self) -> bool;

    /// Wrap the final error once every attempt is spent, so callers can
    /// tell an exhausted retry loop from a single-shot failure.
    fn into_exhausted(self, attempts: u32) -> Self
    where
        Self: Sized,
    {
        let _ = attempts;
        self
    }
}

/// Run `op`, retrying transient failures with exponential backoff.
///
/// The delay before retry `n` is `min(base * 2^n + jitter(0..1s), max)`.
/// Non-transient errors are returned immediately without retrying. Once
/// `max_retries` extra attempts are spent, the last error is returned
/// through [`Retryable::into_exhausted`].
pub async fn retry_with_backoff<T, E, F, Fut>(mut op: F, config: &RetryConfig) -> Result<T, E>
where
    E: Retryable + std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if !err.is_transient() => return Err(err),
            Err(err) if attempt >= config.max_retries => {
                return Err(err.into_exhausted(attempt + 1));
            }
            Err(err) => {
                let exp = config
                    .base_delay
                    .saturating_mul(2u32.saturating_pow(attempt));
                let jitter = Duration::from_millis(rand::thread_rng().gen_range(0..1000));
                let delay = (exp + jitter).min(config.max_delay);
                warn!(
                    "attempt {} failed ({}), retrying in {:?}",
                    attempt + 1,
                    err,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
