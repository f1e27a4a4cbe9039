use std::sync::Arc;

use tokio::sync::RwLock;

use crate::ads::{select_capability, AdCapability, AdUnitResolver, Clock, FrequencyStore};
use crate::config::Config;
use crate::db::SettingsStore;
use crate::error::AppResult;
use crate::models::Watchlist;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Mutable session state behind one lock; handlers serialize the
    /// check-then-record sequence through it
    pub inner: Arc<RwLock<AppStateInner>>,
    pub units: Arc<AdUnitResolver>,
    pub capability: Arc<dyn AdCapability>,
    pub settings: Arc<dyn SettingsStore>,
}

/// Inner state that can be modified
pub struct AppStateInner {
    pub frequency: FrequencyStore,
    pub watchlist: Watchlist,
}

impl AppState {
    /// Builds the application state: loads persisted settings (compiled
    /// defaults when nothing is stored) and wires the frequency store,
    /// unit resolver and render capability.
    pub async fn initialize(
        config: &Config,
        settings: Arc<dyn SettingsStore>,
        clock: Arc<dyn Clock>,
    ) -> AppResult<Self> {
        let record = settings.load().await?.unwrap_or_default();
        let mut frequency = FrequencyStore::from_settings(&record, clock);
        frequency.subscribe(|event| {
            tracing::trace!(event = ?event, "Ad state changed");
        });

        tracing::info!(
            is_premium = frequency.is_premium(),
            ads_enabled = frequency.ads_enabled(),
            test_units = config.ads_use_test_units,
            "Ad state initialized"
        );

        Ok(Self {
            inner: Arc::new(RwLock::new(AppStateInner {
                frequency,
                watchlist: Watchlist::new(),
            })),
            units: Arc::new(AdUnitResolver::new(
                config.ads_use_test_units,
                config.ad_unit_overrides(),
            )),
            capability: select_capability(config.native_ads_enabled),
            settings,
        })
    }
}
