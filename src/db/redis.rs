use async_trait::async_trait;
use redis::{AsyncCommands, Client};

use crate::error::{AppError, AppResult};
use crate::models::{SettingsPatch, SettingsRecord};

use super::settings::{SettingsStore, SETTINGS_STORAGE_NAME};

/// Creates the Redis client backing the settings store
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Settings store persisted in Redis as one JSON value under the fixed
/// storage name
pub struct RedisSettingsStore {
    client: Client,
}

impl RedisSettingsStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn key() -> String {
        format!("{}:settings", SETTINGS_STORAGE_NAME)
    }
}

#[async_trait]
impl SettingsStore for RedisSettingsStore {
    async fn load(&self) -> AppResult<Option<SettingsRecord>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(Self::key()).await.map_err(|e| {
            tracing::warn!(error = %e, "Settings read failed");
            e
        })?;

        match cached {
            Some(json) => {
                let record = serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Settings deserialization error: {}", e))
                })?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, record: &SettingsRecord) -> AppResult<()> {
        let json = serde_json::to_string(record)
            .map_err(|e| AppError::Internal(format!("Settings serialization error: {}", e)))?;

        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn.set(Self::key(), json).await.map_err(|e| {
            tracing::warn!(error = %e, "Settings write failed");
            e
        })?;

        tracing::debug!(key = %Self::key(), "Settings persisted");
        Ok(())
    }

    // Read-modify-write without a transaction: this service is the only
    // writer of the settings record.
    async fn merge(&self, patch: &SettingsPatch) -> AppResult<SettingsRecord> {
        let mut record = self.load().await?.unwrap_or_default();
        patch.apply(&mut record);
        self.save(&record).await?;
        Ok(record)
    }
}
