//! Pulse topics gateway: binary entrypoint
//! Boots the Axum HTTP server in front of the Pulse backend.
//!
//! `--fixture <dir>` serves `topics.json` / `articles.json` from disk instead
//! of calling the backend.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use pulse_topics::api::{self, AppState};
use pulse_topics::config::PulseConfig;
use pulse_topics::feed::fixture::StaticFeed;
use pulse_topics::telemetry::Metrics;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact logs by default, JSON lines when PULSE_LOG_JSON=1.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pulse_topics=info,pulse=info,warn"));

    let json = std::env::var("PULSE_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .init();
    }
}

fn fixture_dir() -> Result<Option<PathBuf>> {
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        None => Ok(None),
        Some("--fixture") => match args.next() {
            Some(dir) => Ok(Some(PathBuf::from(dir))),
            None => bail!("--fixture needs a directory"),
        },
        Some(other) => bail!("unknown argument '{other}' (usage: pulse-topics [--fixture <dir>])"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = PulseConfig::load_default().context("loading pulse config")?;
    let metrics = Metrics::init()?;

    let router = match fixture_dir()? {
        Some(dir) => {
            let feed = StaticFeed::from_dir(&dir)?;
            tracing::info!(
                dir = %dir.display(),
                topics = feed.topics.len(),
                articles = feed.articles.len(),
                "serving fixtures"
            );
            api::router(AppState::new(Arc::new(feed), cfg.clone())).merge(metrics.router())
        }
        None => pulse_topics::app(cfg.clone(), Some(&metrics))?,
    };

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr)
        .await
        .with_context(|| format!("binding {}", cfg.bind_addr))?;
    tracing::info!(addr = %cfg.bind_addr, "listening");
    axum::serve(listener, router).await?;
    Ok(())
}
