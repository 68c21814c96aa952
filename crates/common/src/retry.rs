//! Bounded retry with exponential backoff for outbound calls.

use std::future::Future;
use std::time::Duration;

use crate::config::RetryConfig;
use crate::error::FretcoachResult;

/// Backoff schedule derived from [`RetryConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// A policy that makes exactly one attempt.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Delay before retry number `retry` (zero-based), doubling each time
    /// and capped at `max_backoff`.
    pub fn backoff_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms.max(config.initial_backoff_ms)),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

/// Run `operation` until it succeeds, fails permanently, or the retry
/// budget is spent.
///
/// Only errors for which [`FretcoachError::is_transient`] holds are retried.
/// The last error is returned when attempts run out.
///
/// [`FretcoachError::is_transient`]: crate::error::FretcoachError::is_transient
pub async fn retry_with_backoff<F, Fut, T>(
    operation_name: &str,
    policy: &RetryPolicy,
    mut operation: F,
) -> FretcoachResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = FretcoachResult<T>>,
{
    let mut retry = 0u32;
    loop {
        match operation().await {
            Ok(value) => {
                if retry > 0 {
                    tracing::debug!(
                        operation = operation_name,
                        attempts = retry + 1,
                        "Operation succeeded after retry"
                    );
                }
                return Ok(value);
            }
            Err(err) if err.is_transient() && retry < policy.max_retries => {
                let delay = policy.backoff_for(retry);
                tracing::warn!(
                    operation = operation_name,
                    attempt = retry + 1,
                    max_attempts = policy.max_retries + 1,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Transient failure, retrying"
                );
                tokio::time::sleep(delay).await;
                retry += 1;
            }
            Err(err) => {
                if retry > 0 {
                    tracing::error!(
                        operation = operation_name,
                        attempts = retry + 1,
                        error = %err,
                        "Operation failed after retries"
                    );
                }
                return Err(err);
            }
        }
    }
}
