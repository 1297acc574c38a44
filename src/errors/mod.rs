use reqwest::StatusCode;
use thiserror::Error;

/// Failure talking to the game backend
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned status {status}: {body}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },
    #[error("unexpected response from {url}: {reason}")]
    Decode { url: String, reason: String },
}

impl ApiError {
    /// Transport failures, 5xx and 429 are worth another try
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Transport { .. } => true,
            ApiError::Status { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            ApiError::Decode { .. } => false,
        }
    }
}

/// Whether an error chain carries a retryable `ApiError`
pub fn is_retryable(error: &anyhow::Error) -> bool {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<ApiError>())
        .is_some_and(ApiError::is_retryable)
}

/// Add context to fetch errors
pub fn fetch_context(what: &str) -> String {
    format!("Failed to fetch {}", what)
}

/// Add context to parse errors
pub fn parse_context(data_type: &str) -> String {
    format!("Failed to parse {}", data_type)
}

/// Add context to storage errors
pub fn storage_context(operation: &str, key: &str) -> String {
    format!("Failed to {} stored data for key: {}", operation, key)
}
