use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use log::warn;
use rand::Rng;

use crate::config::RetrySettings;
use crate::errors;

/// Exponential backoff with random jitter for fallible async operations.
///
/// The delay before retry `n` (0-based) is `base_delay * 2^n` plus a uniform
/// jitter in `0..=max_jitter`. Only errors carrying a retryable `ApiError`
/// are retried; anything else is returned on the spot.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_jitter: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_jitter: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_jitter,
        }
    }

    pub fn from_settings(settings: &RetrySettings) -> Self {
        Self::new(
            settings.max_attempts,
            Duration::from_millis(settings.base_delay_ms),
            Duration::from_millis(settings.max_jitter_ms),
        )
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub async fn run<T, F, Fut>(&self, label: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if self.should_retry(attempt, &e) => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        "{} failed (attempt {}/{}), retrying in {:?}: {:#}",
                        label,
                        attempt + 1,
                        self.max_attempts,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff(attempt) + self.jitter()
    }

    // --- Helper Methods ---

    fn should_retry(&self, attempt: u32, error: &anyhow::Error) -> bool {
        attempt + 1 < self.max_attempts && errors::is_retryable(error)
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
    }

    fn jitter(&self) -> Duration {
        let max_ms = self.max_jitter.as_millis() as u64;
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::rng().random_range(0..=max_ms))
    }
}
