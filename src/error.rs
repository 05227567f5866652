// src/error.rs
use thiserror::Error;

/// Failures at the backend boundary. Normalization and aggregation never fail.
#[derive(Debug, Error)]
pub enum PulseError {
    /// Payload did not match the expected record shape (e.g. a topic without
    /// `label` or `pulse_score`, an article without `title` or `source`).
    #[error("malformed backend payload: {0}")]
    MalformedInput(#[from] serde_json::Error),

    #[error("backend request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned {status} for {endpoint}")]
    Status { endpoint: String, status: u16 },

    /// `api_base_url` is not an absolute http(s) URL paths can be appended to.
    #[error("invalid backend base url '{0}'")]
    InvalidBaseUrl(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

impl PulseError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, PulseError::Status { status: 404, .. })
    }
}
