use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Keeps a minimum interval between consecutive backend requests
pub struct RateLimiter {
    min_interval: Duration,
    last_request: Option<Instant>,
}

impl RateLimiter {
    pub fn new(min_interval_ms: u64) -> Self {
        Self {
            min_interval: Duration::from_millis(min_interval_ms),
            last_request: None,
        }
    }

    pub async fn wait(&mut self) {
        if let Some(remaining) = self.remaining() {
            sleep(remaining).await;
        }
        self.last_request = Some(Instant::now());
    }

    fn remaining(&self) -> Option<Duration> {
        let elapsed = self.last_request?.elapsed();
        self.min_interval
            .checked_sub(elapsed)
            .filter(|d| !d.is_zero())
    }
}
