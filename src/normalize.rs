// src/normalize.rs
//! Backend topic → dashboard topic.
//!
//! Rounding is half away from zero (`f64::round`): 72.5 → 73, -2.5 → -3.
//! Scores are not clamped; a backend sending 150 shows 150.

use crate::model::{label_or, BackendTopic, UiTopic, DEFAULT_COUNTRY, DEFAULT_SECTOR};

/// Convert one server-clustered topic into the canonical card shape.
pub fn normalize(topic: BackendTopic) -> UiTopic {
    UiTopic {
        id: topic.topic_id,
        title: topic.label,
        summary: topic.description.unwrap_or_default(),
        keywords: topic.keywords.unwrap_or_default(),
        country: label_or(topic.country.as_deref(), DEFAULT_COUNTRY),
        sector: label_or(topic.sector.as_deref(), DEFAULT_SECTOR),
        pulse: round_pulse(topic.pulse_score),
        velocity: topic.velocity,
        spread: topic.spread,
        authority: Some(topic.authority),
        novelty: Some(topic.novelty),
        volume: topic.volume,
        sentiment: topic.sentiment_avg.unwrap_or(0.0),
        sources: topic.sources.unwrap_or_default(),
        article_count: Some(topic.article_count.unwrap_or(0)),
        first_seen: topic.first_seen,
        last_updated: topic.last_updated,
    }
}

/// Order-preserving batch form of [`normalize`].
pub fn normalize_all(topics: Vec<BackendTopic>) -> Vec<UiTopic> {
    topics.into_iter().map(normalize).collect()
}

/// Round half away from zero. NaN and infinities become 0.
pub fn round_pulse(score: f64) -> i64 {
    if !score.is_finite() {
        return 0;
    }
    score.round() as i64
}
