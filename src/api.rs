// src/api.rs
//! HTTP surface the dashboard talks to.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;

use crate::aggregate::aggregate;
use crate::config::PulseConfig;
use crate::error::PulseError;
use crate::feed::types::TopicFeed;
use crate::filter::{SortKey, TopicFilter};
use crate::model::{BackendTopic, RawArticle, UiTopic};
use crate::normalize::normalize_all;
use crate::pipeline::{load_topics, TopicPage, TopicRequest, FALLBACK_ARTICLE_LIMIT};

#[derive(Clone)]
pub struct AppState {
    pub feed: Arc<dyn TopicFeed>,
    pub config: Arc<PulseConfig>,
}

impl AppState {
    pub fn new(feed: Arc<dyn TopicFeed>, config: PulseConfig) -> Self {
        Self {
            feed,
            config: Arc::new(config),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/topics", get(list_topics))
        .route("/normalize", post(normalize_topics))
        .route("/aggregate", post(aggregate_articles))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

impl IntoResponse for PulseError {
    fn into_response(self) -> Response {
        let status = match &self {
            PulseError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            PulseError::Status { status: 404, .. } => StatusCode::NOT_FOUND,
            PulseError::MalformedInput(_)
            | PulseError::Http(_)
            | PulseError::Status { .. }
            | PulseError::InvalidBaseUrl(_) => StatusCode::BAD_GATEWAY,
        };
        if status.is_server_error() {
            tracing::warn!(target: "pulse::api", error = %self, "request failed");
        }
        let body = serde_json::json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
struct TopicsParams {
    limit: Option<u32>,
    sort_by: Option<String>,
    country: Option<String>,
    sector: Option<String>,
    search: Option<String>,
    mode: Option<String>,
}

impl TopicsParams {
    fn into_request(self, cfg: &PulseConfig) -> Result<TopicRequest, PulseError> {
        let sort_by = match self.sort_by.as_deref() {
            Some(s) if !s.is_empty() => s.parse()?,
            _ => SortKey::default(),
        };
        let mode = match self.mode.as_deref() {
            Some(m) if !m.is_empty() => m.parse()?,
            _ => cfg.mode,
        };
        let limit = self.limit.unwrap_or(cfg.default_limit);
        if !(1..=100).contains(&limit) {
            return Err(PulseError::InvalidQuery(format!(
                "limit must be within 1..=100, got {limit}"
            )));
        }
        Ok(TopicRequest {
            limit,
            sort_by,
            filter: TopicFilter {
                country: self.country,
                sector: self.sector,
                search: self.search,
            },
            mode,
            article_limit: FALLBACK_ARTICLE_LIMIT,
        })
    }
}

async fn list_topics(
    State(state): State<AppState>,
    Query(params): Query<TopicsParams>,
) -> Result<Json<TopicPage>, PulseError> {
    let req = params.into_request(&state.config)?;
    let page = load_topics(state.feed.as_ref(), &req).await?;
    Ok(Json(page))
}

async fn normalize_topics(Json(topics): Json<Vec<BackendTopic>>) -> Json<Vec<UiTopic>> {
    Json(normalize_all(topics))
}

async fn aggregate_articles(Json(articles): Json<Vec<RawArticle>>) -> Json<Vec<UiTopic>> {
    Json(aggregate(&articles))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::TopicMode;

    #[test]
    fn params_fall_back_to_config() {
        let cfg = PulseConfig {
            default_limit: 7,
            mode: TopicMode::Fallback,
            ..PulseConfig::default()
        };
        let req = TopicsParams::default().into_request(&cfg).unwrap();
        assert_eq!(req.limit, 7);
        assert_eq!(req.mode, TopicMode::Fallback);
        assert_eq!(req.sort_by, SortKey::PulseScore);
    }

    #[test]
    fn bad_sort_and_limit_are_rejected() {
        let cfg = PulseConfig::default();
        let p = TopicsParams {
            sort_by: Some("hype".into()),
            ..Default::default()
        };
        assert!(matches!(
            p.into_request(&cfg),
            Err(PulseError::InvalidQuery(_))
        ));
        let p = TopicsParams {
            limit: Some(0),
            ..Default::default()
        };
        assert!(p.into_request(&cfg).is_err());
    }
}
