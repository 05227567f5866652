// src/feed/mod.rs
pub mod client;
pub mod fixture;
pub mod types;

use metrics::{describe_counter, describe_histogram};
use once_cell::sync::OnceCell;

use crate::error::PulseError;
use crate::model::{BackendTopic, RawArticle};

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "pulse_topics_normalized_total",
            "Backend topics converted to dashboard topics."
        );
        describe_counter!(
            "pulse_topics_aggregated_total",
            "Synthetic topics built by the fallback aggregator."
        );
        describe_counter!(
            "pulse_fallback_total",
            "Loads that switched from clustered topics to article grouping."
        );
        describe_counter!(
            "pulse_backend_errors_total",
            "Backend fetch/decode errors."
        );
        describe_histogram!("pulse_backend_fetch_ms", "Backend fetch time in milliseconds.");
    });
}

/// Decode a `GET /api/topics` body. Records missing `label` or `pulse_score`
/// are rejected rather than guessed at.
pub fn decode_topics(body: &[u8]) -> Result<Vec<BackendTopic>, PulseError> {
    Ok(serde_json::from_slice(body)?)
}

/// Decode a single topic (`GET /api/topics/{id}`).
pub fn decode_topic(body: &[u8]) -> Result<BackendTopic, PulseError> {
    Ok(serde_json::from_slice(body)?)
}

/// Decode a `GET /api/articles/` body. Records missing `title` or `source`
/// are rejected.
pub fn decode_articles(body: &[u8]) -> Result<Vec<RawArticle>, PulseError> {
    Ok(serde_json::from_slice(body)?)
}

/// Decode a refresh acknowledgement. Its shape belongs to the backend and is
/// passed through untouched.
pub fn decode_value(body: &[u8]) -> Result<serde_json::Value, PulseError> {
    Ok(serde_json::from_slice(body)?)
}
