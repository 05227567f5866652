// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod aggregate;
pub mod api;
pub mod config;
pub mod error;
pub mod feed;
pub mod filter;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod telemetry;

// ---- Re-exports for stable public API ----
pub use crate::aggregate::aggregate;
pub use crate::api::router;
pub use crate::error::PulseError;
pub use crate::model::{BackendTopic, RawArticle, UiTopic};
pub use crate::normalize::normalize;

use std::sync::Arc;

use crate::api::AppState;
use crate::config::PulseConfig;
use crate::feed::client::PulseClient;

/// Build the full router against the configured backend.
///
/// Pass `metrics` to also mount `/metrics`.
pub fn app(cfg: PulseConfig, metrics: Option<&telemetry::Metrics>) -> anyhow::Result<axum::Router> {
    let client = PulseClient::new(&cfg)?;
    tracing::info!(target: "pulse::api", backend = client.base_url(), mode = ?cfg.mode, "backend client ready");
    let state = AppState::new(Arc::new(client), cfg);
    let mut router = api::router(state);
    if let Some(m) = metrics {
        router = router.merge(m.router());
    }
    Ok(router)
}
