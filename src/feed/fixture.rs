// src/feed/fixture.rs
//! In-memory feed serving canned records. Used by tests and `--fixture` runs.

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::error::PulseError;
use crate::feed::types::{ArticleQuery, TopicFeed, TopicQuery};
use crate::feed::{decode_articles, decode_topics};
use crate::filter::sort_backend_topics;
use crate::model::{BackendTopic, RawArticle};

#[derive(Debug, Clone, Default)]
pub struct StaticFeed {
    pub topics: Vec<BackendTopic>,
    pub articles: Vec<RawArticle>,
    /// When set, the topic endpoint behaves like a backend without clustering.
    pub topics_status: Option<u16>,
}

impl StaticFeed {
    pub fn new(topics: Vec<BackendTopic>, articles: Vec<RawArticle>) -> Self {
        Self {
            topics,
            articles,
            topics_status: None,
        }
    }

    /// A backend that only serves articles: `/api/topics` answers 404.
    pub fn articles_only(articles: Vec<RawArticle>) -> Self {
        Self {
            topics: Vec::new(),
            articles,
            topics_status: Some(404),
        }
    }

    /// Load `topics.json` and `articles.json` from `dir`; either may be missing.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let read = |name: &str| -> Result<Option<Vec<u8>>> {
            let p = dir.join(name);
            if !p.exists() {
                return Ok(None);
            }
            std::fs::read(&p)
                .map(Some)
                .with_context(|| format!("reading fixture {}", p.display()))
        };
        let topics = match read("topics.json")? {
            Some(b) => decode_topics(&b).context("decoding topics.json")?,
            None => Vec::new(),
        };
        let articles = match read("articles.json")? {
            Some(b) => decode_articles(&b).context("decoding articles.json")?,
            None => Vec::new(),
        };
        Ok(Self::new(topics, articles))
    }
}

#[async_trait]
impl TopicFeed for StaticFeed {
    async fn fetch_topics(&self, query: &TopicQuery) -> Result<Vec<BackendTopic>, PulseError> {
        if let Some(status) = self.topics_status {
            return Err(PulseError::Status {
                endpoint: "/api/topics".into(),
                status,
            });
        }
        // Same steps as the backend listing: filter, order, then cap.
        let country = query.country.as_deref().filter(|c| !c.is_empty());
        let sector = query.sector.as_deref().filter(|s| !s.is_empty());
        let mut out: Vec<BackendTopic> = self
            .topics
            .iter()
            .filter(|t| match country {
                Some(c) => t.country.as_deref() == Some(c.to_uppercase().as_str()),
                None => true,
            })
            .filter(|t| match sector {
                Some(s) => t.sector.as_deref() == Some(s),
                None => true,
            })
            .cloned()
            .collect();
        sort_backend_topics(&mut out, query.sort_by);
        out.truncate(query.limit as usize);
        Ok(out)
    }

    async fn fetch_articles(&self, query: &ArticleQuery) -> Result<Vec<RawArticle>, PulseError> {
        Ok(self
            .articles
            .iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .cloned()
            .collect())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_dir_tolerates_missing_files() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("articles.json"),
            r#"[{"title":"Sciopero trasporti nazionale","source":"ANSA"}]"#,
        )
        .unwrap();
        let feed = StaticFeed::from_dir(tmp.path()).unwrap();
        assert!(feed.topics.is_empty());
        assert_eq!(feed.articles.len(), 1);
    }

    fn topic(id: &str, country: &str, sector: &str, score: f64, velocity: f64) -> BackendTopic {
        serde_json::from_value(serde_json::json!({
            "topic_id": id, "label": id, "country": country, "sector": sector,
            "pulse_score": score, "velocity": velocity
        }))
        .unwrap()
    }

    fn ids(v: &[BackendTopic]) -> Vec<&str> {
        v.iter().map(|t| t.topic_id.as_str()).collect()
    }

    fn feed() -> StaticFeed {
        StaticFeed::new(
            vec![
                topic("a", "IT", "News", 10.0, 0.9),
                topic("b", "DE", "Tech", 90.0, 0.1),
                topic("c", "IT", "Sport", 50.0, 0.5),
            ],
            Vec::new(),
        )
    }

    #[tokio::test]
    async fn topics_are_ordered_before_the_limit_cuts() {
        let q = TopicQuery {
            limit: 2,
            ..TopicQuery::default()
        };
        let out = feed().fetch_topics(&q).await.unwrap();
        assert_eq!(ids(&out), vec!["b", "c"]);
    }

    #[tokio::test]
    async fn topics_follow_requested_sort_key() {
        let q = TopicQuery {
            sort_by: crate::filter::SortKey::Velocity,
            ..TopicQuery::default()
        };
        let out = feed().fetch_topics(&q).await.unwrap();
        assert_eq!(ids(&out), vec!["a", "c", "b"]);
    }

    #[tokio::test]
    async fn topics_filter_by_country_and_sector() {
        let q = TopicQuery {
            country: Some("it".into()),
            ..TopicQuery::default()
        };
        assert_eq!(ids(&feed().fetch_topics(&q).await.unwrap()), vec!["c", "a"]);

        let q = TopicQuery {
            country: Some("IT".into()),
            sector: Some("News".into()),
            ..TopicQuery::default()
        };
        assert_eq!(ids(&feed().fetch_topics(&q).await.unwrap()), vec!["a"]);
    }

    #[test]
    fn from_dir_rejects_malformed_topics() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("topics.json"), r#"[{"topic_id":"t"}]"#).unwrap();
        assert!(StaticFeed::from_dir(tmp.path()).is_err());
    }
}
