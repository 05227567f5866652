// src/feed/types.rs
use async_trait::async_trait;
use serde::Deserialize;

use crate::error::PulseError;
use crate::filter::SortKey;
use crate::model::{BackendTopic, RawArticle};

/// Query for `GET /api/topics`.
#[derive(Debug, Clone, Deserialize)]
pub struct TopicQuery {
    #[serde(default = "default_topic_limit")]
    pub limit: u32,
    #[serde(default)]
    pub sort_by: SortKey,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
}

fn default_topic_limit() -> u32 {
    20
}

impl Default for TopicQuery {
    fn default() -> Self {
        Self {
            limit: default_topic_limit(),
            sort_by: SortKey::default(),
            country: None,
            sector: None,
        }
    }
}

/// Query for `GET /api/articles/`.
#[derive(Debug, Clone, Deserialize)]
pub struct ArticleQuery {
    #[serde(default = "default_article_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
}

fn default_article_limit() -> u32 {
    50
}

impl Default for ArticleQuery {
    fn default() -> Self {
        Self {
            limit: default_article_limit(),
            offset: 0,
            source: None,
            language: None,
            country: None,
            search: None,
        }
    }
}

/// Where topic records come from. The HTTP client is the production impl.
#[async_trait]
pub trait TopicFeed: Send + Sync {
    async fn fetch_topics(&self, query: &TopicQuery) -> Result<Vec<BackendTopic>, PulseError>;
    async fn fetch_articles(&self, query: &ArticleQuery) -> Result<Vec<RawArticle>, PulseError>;
    fn name(&self) -> &'static str;
}
