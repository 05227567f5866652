// src/filter.rs
//! Client-side narrowing and ordering of an already-built topic list.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PulseError;
use crate::model::{BackendTopic, UiTopic};

/// Dashboard filters. Empty strings are treated as "no constraint".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TopicFilter {
    pub country: Option<String>,
    pub sector: Option<String>,
    pub search: Option<String>,
}

fn active(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|s| !s.is_empty())
}

impl TopicFilter {
    pub fn is_empty(&self) -> bool {
        active(&self.country).is_none()
            && active(&self.sector).is_none()
            && active(&self.search).is_none()
    }

    pub fn matches(&self, topic: &UiTopic) -> bool {
        if let Some(c) = active(&self.country) {
            if !topic.country.eq_ignore_ascii_case(c) {
                return false;
            }
        }
        if let Some(s) = active(&self.sector) {
            if topic.sector != s {
                return false;
            }
        }
        if let Some(q) = active(&self.search) {
            if !topic.title.to_lowercase().contains(&q.to_lowercase()) {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, topics: Vec<UiTopic>) -> Vec<UiTopic> {
        if self.is_empty() {
            return topics;
        }
        topics.into_iter().filter(|t| self.matches(t)).collect()
    }
}

/// Orderings the backend's `sort_by` parameter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    PulseScore,
    Volume,
    Velocity,
    Novelty,
    LastUpdated,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::PulseScore => "pulse_score",
            SortKey::Volume => "volume",
            SortKey::Velocity => "velocity",
            SortKey::Novelty => "novelty",
            SortKey::LastUpdated => "last_updated",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = PulseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pulse_score" => Ok(SortKey::PulseScore),
            "volume" => Ok(SortKey::Volume),
            "velocity" => Ok(SortKey::Velocity),
            "novelty" => Ok(SortKey::Novelty),
            "last_updated" => Ok(SortKey::LastUpdated),
            other => Err(PulseError::InvalidQuery(format!("unknown sort_by '{other}'"))),
        }
    }
}

/// Parse a backend timestamp: RFC 3339 first, then naive ISO-8601 taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|n| n.and_utc())
}

// Descending; `None` after every `Some`.
fn desc<T: PartialOrd>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable descending sort by `key`. Topics lacking the field go last.
pub fn sort_topics(topics: &mut [UiTopic], key: SortKey) {
    match key {
        SortKey::PulseScore => topics.sort_by(|a, b| b.pulse.cmp(&a.pulse)),
        SortKey::Volume => topics.sort_by(|a, b| desc(a.volume, b.volume)),
        SortKey::Velocity => topics.sort_by(|a, b| desc(Some(a.velocity), Some(b.velocity))),
        SortKey::Novelty => topics.sort_by(|a, b| desc(a.novelty, b.novelty)),
        SortKey::LastUpdated => topics.sort_by(|a, b| {
            desc(
                a.last_updated.as_deref().and_then(parse_timestamp),
                b.last_updated.as_deref().and_then(parse_timestamp),
            )
        }),
    }
}

/// Backend-side ordering of raw topic records, as `GET /api/topics` applies it:
/// descending on the unrounded field, stable, absent values last.
pub fn sort_backend_topics(topics: &mut [BackendTopic], key: SortKey) {
    match key {
        SortKey::PulseScore => {
            topics.sort_by(|a, b| desc(Some(a.pulse_score), Some(b.pulse_score)))
        }
        SortKey::Volume => topics.sort_by(|a, b| desc(a.volume, b.volume)),
        SortKey::Velocity => topics.sort_by(|a, b| desc(Some(a.velocity), Some(b.velocity))),
        SortKey::Novelty => topics.sort_by(|a, b| desc(Some(a.novelty), Some(b.novelty))),
        SortKey::LastUpdated => topics.sort_by(|a, b| {
            desc(
                a.last_updated.as_deref().and_then(parse_timestamp),
                b.last_updated.as_deref().and_then(parse_timestamp),
            )
        }),
    }
}
