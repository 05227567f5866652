// src/model.rs
//! Record shapes exchanged with the Pulse backend and the dashboard.
//!
//! `RawArticle` and `BackendTopic` mirror the backend JSON payloads; optional
//! fields stay `Option` here and are defaulted only when a `UiTopic` is built.
//! `UiTopic` is the canonical view-model every consumer reads.

use serde::{Deserialize, Serialize};

/// Country label used when a record carries none.
pub const DEFAULT_COUNTRY: &str = "GLOBAL";
/// Sector label used when a record carries none.
pub const DEFAULT_SECTOR: &str = "News";

/// One ingested document as served by `GET /api/articles/`.
///
/// Precondition: `title` and `source` are present. The decoder rejects payloads
/// missing either.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawArticle {
    #[serde(default)]
    pub id: Option<i64>,
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    pub source: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub sentiment_score: Option<f64>,
    #[serde(default)]
    pub engagement_score: Option<f64>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

/// One server-side topic cluster as served by `GET /api/topics`.
///
/// Precondition: `label` and `pulse_score` are present. Metric fields the
/// backend defaults to zero are defaulted the same way here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackendTopic {
    pub topic_id: String,
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    pub pulse_score: f64,
    #[serde(default)]
    pub velocity: f64,
    #[serde(default)]
    pub spread: f64,
    #[serde(default)]
    pub authority: f64,
    #[serde(default)]
    pub novelty: f64,
    #[serde(default)]
    pub volume: Option<u64>,
    #[serde(default)]
    pub sentiment_avg: Option<f64>,
    #[serde(default)]
    pub sources: Option<Vec<String>>,
    #[serde(default)]
    pub article_count: Option<u64>,
    #[serde(default)]
    pub first_seen: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// Canonical topic card consumed by the dashboard.
///
/// Topics built by the fallback aggregator leave `authority`, `novelty`,
/// `volume` and `article_count` as `None`; only backend-clustered topics
/// carry them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UiTopic {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub keywords: Vec<String>,
    pub country: String,
    pub sector: String,
    pub pulse: i64,
    pub velocity: f64,
    pub spread: f64,
    pub authority: Option<f64>,
    pub novelty: Option<f64>,
    pub volume: Option<u64>,
    pub sentiment: f64,
    pub sources: Vec<String>,
    pub article_count: Option<u64>,
    pub first_seen: Option<String>,
    pub last_updated: Option<String>,
}

/// Treat `None` and `""` alike, falling back to `default`.
pub(crate) fn label_or(value: Option<&str>, default: &str) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => default.to_string(),
    }
}
