use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::AppResult;
use crate::models::{SettingsPatch, SettingsRecord};

/// Fixed storage name for the single persisted ad-settings record
pub const SETTINGS_STORAGE_NAME: &str = "ad-storage";

/// Asynchronous key-value backend for the persisted ad settings.
///
/// Only premium/ads-enabled/frequency survive restarts; impression
/// counters and timestamps are session-scoped and never pass through
/// this interface.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Reads the persisted record, `None` when nothing was ever saved
    async fn load(&self) -> AppResult<Option<SettingsRecord>>;

    /// Writes the full record
    async fn save(&self, record: &SettingsRecord) -> AppResult<()>;

    /// Read-modify-write: applies the patch over the stored record
    /// (or defaults) and persists the result
    async fn merge(&self, patch: &SettingsPatch) -> AppResult<SettingsRecord>;
}

/// In-process settings store, used in tests and redis-less deployments
#[derive(Default)]
pub struct MemorySettingsStore {
    record: RwLock<Option<SettingsRecord>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load(&self) -> AppResult<Option<SettingsRecord>> {
        Ok(self.record.read().await.clone())
    }

    async fn save(&self, record: &SettingsRecord) -> AppResult<()> {
        *self.record.write().await = Some(record.clone());
        Ok(())
    }

    async fn merge(&self, patch: &SettingsPatch) -> AppResult<SettingsRecord> {
        let mut guard = self.record.write().await;
        let mut record = guard.clone().unwrap_or_default();
        patch.apply(&mut record);
        *guard = Some(record.clone());
        Ok(record)
    }
}
