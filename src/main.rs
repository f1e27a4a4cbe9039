use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use reelswipe_ads::ads::SystemClock;
use reelswipe_ads::api::{create_router, AppState};
use reelswipe_ads::config::Config;
use reelswipe_ads::db::{
    create_redis_client, MemorySettingsStore, RedisSettingsStore, SettingsStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    // Settings survive restarts only when Redis is configured
    let settings: Arc<dyn SettingsStore> = match &config.redis_url {
        Some(url) => {
            let client = create_redis_client(url)?;
            tracing::info!("Using Redis-backed settings store");
            Arc::new(RedisSettingsStore::new(client))
        }
        None => {
            tracing::info!("No REDIS_URL set, settings are in-memory only");
            Arc::new(MemorySettingsStore::new())
        }
    };

    let state = AppState::initialize(&config, settings, Arc::new(SystemClock)).await?;
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Ad decision service listening");
    axum::serve(listener, app).await?;

    Ok(())
}
