// src/feed/client.rs
//! Thin REST client for the Pulse backend. One request per call, no retries.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use metrics::{counter, histogram};
use reqwest::{Client, Method, RequestBuilder, Url};

use crate::config::PulseConfig;
use crate::error::PulseError;
use crate::feed::types::{ArticleQuery, TopicFeed, TopicQuery};
use crate::feed::{
    decode_articles, decode_topic, decode_topics, decode_value, ensure_metrics_described,
};
use crate::model::{BackendTopic, RawArticle};

#[derive(Clone)]
pub struct PulseClient {
    http: Client,
    base: Url,
    base_url: String,
}

impl PulseClient {
    pub fn new(cfg: &PulseConfig) -> Result<Self, PulseError> {
        let base_url = cfg.api_base_url.trim_end_matches('/').to_string();
        let base = Url::parse(&base_url)
            .ok()
            .filter(|u| !u.cannot_be_a_base())
            .ok_or_else(|| PulseError::InvalidBaseUrl(cfg.api_base_url.clone()))?;
        let http = Client::builder()
            .user_agent(concat!("pulse-topics/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base,
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Append `segments` to the base path. Each one is percent-encoded, so a
    /// topic id containing `/` or `?` stays a single segment.
    pub fn endpoint_url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // `new` rejected cannot-be-a-base URLs, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("Content-Type", "application/json")
    }

    /// Send and return the raw body of a 2xx response.
    async fn send(&self, req: RequestBuilder, endpoint: &str) -> Result<Vec<u8>, PulseError> {
        ensure_metrics_described();
        let t0 = Instant::now();
        let resp = match req.send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(target: "pulse::client", error = ?e, endpoint, "backend request failed");
                counter!("pulse_backend_errors_total").increment(1);
                return Err(e.into());
            }
        };
        histogram!("pulse_backend_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(target: "pulse::client", status = status.as_u16(), endpoint, "backend error status");
            counter!("pulse_backend_errors_total").increment(1);
            return Err(PulseError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }
        match resp.bytes().await {
            Ok(b) => Ok(b.to_vec()),
            Err(e) => {
                tracing::warn!(target: "pulse::client", error = ?e, endpoint, "backend body read failed");
                counter!("pulse_backend_errors_total").increment(1);
                Err(e.into())
            }
        }
    }

    /// One round trip: build, send, decode. Every failure along the way
    /// bumps `pulse_backend_errors_total` exactly once.
    async fn call<T>(
        &self,
        method: Method,
        segments: &[&str],
        params: &[(&str, String)],
        decode: impl FnOnce(&[u8]) -> Result<T, PulseError>,
    ) -> Result<T, PulseError> {
        let url = self.endpoint_url(segments);
        let endpoint = url.path().to_string();
        let mut req = self.request(method, url);
        if !params.is_empty() {
            req = req.query(params);
        }
        let body = self.send(req, &endpoint).await?;
        decode(&body).inspect_err(|e| {
            tracing::warn!(target: "pulse::client", error = %e, endpoint = %endpoint, "backend payload rejected");
            counter!("pulse_backend_errors_total").increment(1);
        })
    }

    pub async fn get_topics(&self, q: &TopicQuery) -> Result<Vec<BackendTopic>, PulseError> {
        let mut params: Vec<(&str, String)> = vec![
            ("limit", q.limit.to_string()),
            ("sort_by", q.sort_by.to_string()),
        ];
        push_opt(&mut params, "country", &q.country);
        push_opt(&mut params, "sector", &q.sector);
        self.call(Method::GET, &["api", "topics"], &params, decode_topics)
            .await
    }

    pub async fn get_topic(&self, topic_id: &str) -> Result<BackendTopic, PulseError> {
        self.call(Method::GET, &["api", "topics", topic_id], &[], decode_topic)
            .await
    }

    pub async fn get_topic_articles(
        &self,
        topic_id: &str,
        limit: u32,
    ) -> Result<Vec<RawArticle>, PulseError> {
        self.call(
            Method::GET,
            &["api", "topics", topic_id, "articles"],
            &[("limit", limit.to_string())],
            decode_articles,
        )
        .await
    }

    pub async fn get_articles(&self, q: &ArticleQuery) -> Result<Vec<RawArticle>, PulseError> {
        let mut params: Vec<(&str, String)> = vec![
            ("limit", q.limit.to_string()),
            ("offset", q.offset.to_string()),
        ];
        push_opt(&mut params, "source", &q.source);
        push_opt(&mut params, "language", &q.language);
        push_opt(&mut params, "country", &q.country);
        push_opt(&mut params, "search", &q.search);
        // Trailing empty segment keeps the backend's `/api/articles/` form.
        self.call(Method::GET, &["api", "articles", ""], &params, decode_articles)
            .await
    }

    /// Ask the backend to recompute one topic's metrics. Response passed through.
    pub async fn refresh_topic_metrics(
        &self,
        topic_id: &str,
    ) -> Result<serde_json::Value, PulseError> {
        self.call(
            Method::POST,
            &["api", "topics", topic_id, "refresh"],
            &[],
            decode_value,
        )
        .await
    }

    pub async fn refresh_all_metrics(&self) -> Result<serde_json::Value, PulseError> {
        self.call(
            Method::POST,
            &["api", "topics", "refresh-all"],
            &[],
            decode_value,
        )
        .await
    }
}

fn push_opt<'a>(params: &mut Vec<(&'a str, String)>, name: &'a str, value: &Option<String>) {
    if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
        params.push((name, v.to_string()));
    }
}

#[async_trait]
impl TopicFeed for PulseClient {
    async fn fetch_topics(&self, query: &TopicQuery) -> Result<Vec<BackendTopic>, PulseError> {
        self.get_topics(query).await
    }

    async fn fetch_articles(&self, query: &ArticleQuery) -> Result<Vec<RawArticle>, PulseError> {
        self.get_articles(query).await
    }

    fn name(&self) -> &'static str {
        "pulse-backend"
    }
}
