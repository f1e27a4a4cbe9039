pub mod redis;
pub mod settings;

pub use redis::create_redis_client;
pub use redis::RedisSettingsStore;
pub use settings::{MemorySettingsStore, SettingsStore, SETTINGS_STORAGE_NAME};

#[cfg(test)]
pub use settings::MockSettingsStore;
