use crate::errors::ApiError;
use crate::rate_limiter::RateLimiter;
use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::sync::Mutex;

/// HTTP client with built-in rate limiting and JSON helpers
pub struct RateLimitedClient {
    client: Client,
    rate_limiter: Mutex<RateLimiter>,
}

impl RateLimitedClient {
    pub fn new(user_agent: &str, timeout_secs: u64, rate_limit_ms: u64) -> Result<Self> {
        let client = Self::build_client(user_agent, timeout_secs)?;
        let rate_limiter = Mutex::new(RateLimiter::new(rate_limit_ms));

        Ok(Self {
            client,
            rate_limiter,
        })
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.send_json(url, self.client.get(url)).await
    }

    pub async fn post_json<B: Serialize, T: DeserializeOwned>(&self, url: &str, body: &B) -> Result<T> {
        self.send_json(url, self.client.post(url).json(body)).await
    }

    fn build_client(user_agent: &str, timeout_secs: u64) -> Result<Client> {
        Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to build HTTP client")
    }

    async fn send_json<T: DeserializeOwned>(&self, url: &str, request: RequestBuilder) -> Result<T> {
        self.rate_limiter.lock().await.wait().await;

        let response = request.send().await.map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })?;

        if !status.is_success() {
            return Err(ApiError::Status {
                url: url.to_string(),
                status,
                body: truncate(&body, 200),
            }
            .into());
        }

        serde_json::from_str(&body).map_err(|e| {
            ApiError::Decode {
                url: url.to_string(),
                reason: format!("{} (body starts with: {})", e, truncate(&body, 200)),
            }
            .into()
        })
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
