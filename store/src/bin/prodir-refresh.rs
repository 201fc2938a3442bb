//! Admin refresh tool.
//!
//! Refetches every shared collection from the remote store and overwrites
//! the local snapshot files. Unlike the silent fallback behavior of normal
//! loads, a failure here is reported: the operator asked for a refresh and
//! deserves to know it did not happen.

use prodir_store::{Config, FileCache, PgRemoteStore, SyncStore};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "prodir_store=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    let Some(database_url) = &config.database_url else {
        tracing::error!("PRODIR_DATABASE_URL is not set; nothing to refresh");
        return Err("remote store is not configured".into());
    };

    let remote = PgRemoteStore::connect(database_url, config.max_connections).await?;
    let cache = FileCache::new(&config.cache_dir);
    let store = SyncStore::new(Arc::new(remote), Arc::new(cache));

    tracing::info!(cache_dir = %config.cache_dir.display(), "refreshing all shared collections");
    store.force_refresh_all().await?;
    tracing::info!("refresh complete");

    Ok(())
}
