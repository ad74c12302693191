//! Bounded retry with exponential backoff and jitter for host calls.

use rand::Rng;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

use super::HostError;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_DELAY_MS: u64 = 1_000;
pub const DEFAULT_MAX_DELAY_MS: u64 = 30_000;

/// Outcome of a retried host call.
#[derive(Debug, Error)]
pub enum RetryError {
    /// Every attempt failed with a transient error.
    #[error("repository unavailable after {attempts} attempts: {source}")]
    Exhausted {
        attempts: u32,
        #[source]
        source: HostError,
    },

    /// A non-transient error; retrying would not help.
    #[error(transparent)]
    Terminal(HostError),
}

/// Exponential backoff schedule applied around every remote host call.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_MAX_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            ..Self::default()
        }
    }

    /// Delay before the retry following the given zero-based attempt:
    /// `base · 2^attempt` plus a uniform jitter of up to one base delay,
    /// capped at `max_delay`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let base_ms = self.base_delay.as_millis() as u64;
        let exponential = base_ms.saturating_mul(1u64 << attempt.min(16));
        let jitter = rand::thread_rng().gen_range(0..=base_ms.max(1));
        Duration::from_millis(
            exponential
                .saturating_add(jitter)
                .min(self.max_delay.as_millis() as u64),
        )
    }

    /// Run `op` until it succeeds, fails terminally, or the attempt budget
    /// is exhausted. A host-provided retry hint overrides the computed
    /// backoff for that attempt.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut op: F) -> Result<T, RetryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, HostError>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if !err.is_transient() => return Err(RetryError::Terminal(err)),
                Err(err) if attempt + 1 >= attempts => {
                    return Err(RetryError::Exhausted {
                        attempts,
                        source: err,
                    })
                }
                Err(err) => {
                    let delay = err.retry_hint().unwrap_or_else(|| self.backoff_delay(attempt));
                    warn!(
                        operation,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "transient host error, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
