// src/pipeline.rs
//! Topic loading: pick the clustered or fallback path, build cards, filter.

use std::fmt;
use std::str::FromStr;

use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::aggregate::aggregate;
use crate::error::PulseError;
use crate::feed::ensure_metrics_described;
use crate::feed::types::{ArticleQuery, TopicFeed, TopicQuery};
use crate::filter::{sort_topics, SortKey, TopicFilter};
use crate::model::UiTopic;
use crate::normalize::normalize_all;

/// Articles pulled for one fallback grouping pass (backend max is 500).
pub const FALLBACK_ARTICLE_LIMIT: u32 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicMode {
    /// Backend clusters topics; normalize them.
    Clustered,
    /// Backend only has articles; group them locally.
    Fallback,
    /// Clustered, switching to fallback when the backend has no topics.
    #[default]
    Auto,
}

impl FromStr for TopicMode {
    type Err = PulseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "clustered" => Ok(TopicMode::Clustered),
            "fallback" => Ok(TopicMode::Fallback),
            "auto" => Ok(TopicMode::Auto),
            other => Err(PulseError::InvalidQuery(format!("unknown mode '{other}'"))),
        }
    }
}

/// Which path produced a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicOrigin {
    Clustered,
    Aggregated,
}

impl fmt::Display for TopicOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopicOrigin::Clustered => f.write_str("clustered"),
            TopicOrigin::Aggregated => f.write_str("aggregated"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicPage {
    pub origin: TopicOrigin,
    pub topics: Vec<UiTopic>,
}

#[derive(Debug, Clone)]
pub struct TopicRequest {
    pub limit: u32,
    pub sort_by: SortKey,
    pub filter: TopicFilter,
    pub mode: TopicMode,
    pub article_limit: u32,
}

impl Default for TopicRequest {
    fn default() -> Self {
        Self {
            limit: 20,
            sort_by: SortKey::default(),
            filter: TopicFilter::default(),
            mode: TopicMode::default(),
            article_limit: FALLBACK_ARTICLE_LIMIT,
        }
    }
}

/// Fetch and build one page of dashboard topics.
pub async fn load_topics(
    feed: &dyn TopicFeed,
    req: &TopicRequest,
) -> Result<TopicPage, PulseError> {
    ensure_metrics_described();

    let page = match req.mode {
        TopicMode::Clustered => clustered(feed, req).await?,
        TopicMode::Fallback => fallback(feed, req).await?,
        TopicMode::Auto => match clustered(feed, req).await {
            Ok(p) if !p.topics.is_empty() || server_filtered(req) => p,
            Ok(_) => {
                info!(target: "pulse::pipeline", feed = feed.name(), "no clustered topics, grouping articles");
                counter!("pulse_fallback_total").increment(1);
                fallback(feed, req).await?
            }
            Err(e) if e.is_not_found() => {
                info!(target: "pulse::pipeline", feed = feed.name(), "topic endpoint missing, grouping articles");
                counter!("pulse_fallback_total").increment(1);
                fallback(feed, req).await?
            }
            Err(e) => return Err(e),
        },
    };

    let mut topics = req.filter.apply(page.topics);
    topics.truncate(req.limit as usize);

    info!(
        target: "pulse::pipeline",
        origin = %page.origin,
        topics = topics.len(),
        mode = ?req.mode,
        "topics loaded"
    );
    Ok(TopicPage {
        origin: page.origin,
        topics,
    })
}

// An empty answer to a country/sector query means "no match", not "no clustering".
fn server_filtered(req: &TopicRequest) -> bool {
    let set = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
    set(&req.filter.country) || set(&req.filter.sector)
}

async fn clustered(feed: &dyn TopicFeed, req: &TopicRequest) -> Result<TopicPage, PulseError> {
    let query = TopicQuery {
        limit: req.limit,
        sort_by: req.sort_by,
        country: req.filter.country.clone(),
        sector: req.filter.sector.clone(),
    };
    let raw = feed.fetch_topics(&query).await?;
    counter!("pulse_topics_normalized_total").increment(raw.len() as u64);
    Ok(TopicPage {
        origin: TopicOrigin::Clustered,
        topics: normalize_all(raw),
    })
}

async fn fallback(feed: &dyn TopicFeed, req: &TopicRequest) -> Result<TopicPage, PulseError> {
    let query = ArticleQuery {
        limit: req.article_limit,
        ..ArticleQuery::default()
    };
    let articles = feed.fetch_articles(&query).await?;
    let mut topics = aggregate(&articles);
    if req.sort_by != SortKey::PulseScore {
        sort_topics(&mut topics, req.sort_by);
    }
    counter!("pulse_topics_aggregated_total").increment(topics.len() as u64);
    Ok(TopicPage {
        origin: TopicOrigin::Aggregated,
        topics,
    })
}
