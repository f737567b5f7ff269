//! QuestWeave Engine - Main entry point.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use questweave_engine::infrastructure::{
    atlas::AtlasClient,
    cache::{AtlasCache, DEFAULT_ATLAS_TTL_SECS},
    clock::{SystemClock, SystemRandom},
    ports::ClockPort,
    retry::{ResilientAtlasClient, RetryConfig},
};
use questweave_engine::stores::TensionStore;
use questweave_engine::use_cases::QuestBoard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "questweave_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting QuestWeave Engine");

    // Load configuration
    let atlas_url = std::env::var("ATLAS_BASE_URL")
        .or_else(|_| std::env::var("ATLAS_URL"))
        .unwrap_or_else(|_| "http://localhost:4800".into());
    let atlas_ttl_secs: u64 = std::env::var("ATLAS_CACHE_TTL_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_ATLAS_TTL_SECS);
    let tick_secs: u64 = std::env::var("TICK_INTERVAL_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(60);

    // Wire the atlas client with retry and caching
    let retry_config = RetryConfig::default();
    tracing::info!(
        "Atlas client configured: url={}, max_retries={}, cache_ttl_secs={}",
        atlas_url,
        retry_config.max_retries,
        atlas_ttl_secs
    );
    let atlas = Arc::new(AtlasClient::new(&atlas_url));
    let resilient = Arc::new(ResilientAtlasClient::new(atlas, retry_config));
    let atlas_cache = Arc::new(AtlasCache::new(
        resilient,
        Duration::from_secs(atlas_ttl_secs),
    ));

    let clock = SystemClock::new();
    let tension = Arc::new(TensionStore::new());
    let board = Arc::new(QuestBoard::new(tension.clone()));

    // World tick: decay tension, roll revolts, expire quests, sweep caches
    let tick_tension = tension.clone();
    let tick_board = board.clone();
    let tick_cache = atlas_cache.clone();
    let tick_task = tokio::spawn(async move {
        let mut rng = SystemRandom::new();
        let mut interval = tokio::time::interval(Duration::from_secs(tick_secs));
        loop {
            interval.tick().await;
            let now = clock.now();

            let events = tick_tension.tick(now, &mut rng).await;
            for event in &events {
                tracing::info!(event_type = event.event_type(), "World event");
            }

            let expired = tick_board.expire_due(now);
            if !expired.is_empty() {
                tracing::debug!(count = expired.len(), "Expired quests swept");
            }

            let cleaned = tick_cache.cleanup_expired().await;
            if cleaned > 0 {
                tracing::debug!(count = cleaned, "Expired atlas entries swept");
            }
        }
    });

    tracing::info!(tick_secs, "Engine running, press Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    tick_task.abort();

    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
