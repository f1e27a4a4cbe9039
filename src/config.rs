use serde::Deserialize;

use crate::ads::AdUnitOverrides;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Redis connection URL; unset runs with in-memory settings only
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Serve Google sample ad units instead of production ones
    #[serde(default = "default_use_test_units")]
    pub ads_use_test_units: bool,

    /// Whether this build can render native ads at all
    #[serde(default = "default_native_ads_enabled")]
    pub native_ads_enabled: bool,

    /// Per-placement production unit-id overrides
    #[serde(default)]
    pub ad_unit_home_between_rows: Option<String>,
    #[serde(default)]
    pub ad_unit_swipe_interstitial: Option<String>,
    #[serde(default)]
    pub ad_unit_watchlist_inline: Option<String>,
    #[serde(default)]
    pub ad_unit_profile_section: Option<String>,
    #[serde(default)]
    pub ad_unit_media_detail: Option<String>,
    #[serde(default)]
    pub ad_unit_analytics_section: Option<String>,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_use_test_units() -> bool {
    true
}

fn default_native_ads_enabled() -> bool {
    true
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            redis_url: None,
            ads_use_test_units: default_use_test_units(),
            native_ads_enabled: default_native_ads_enabled(),
            ad_unit_home_between_rows: None,
            ad_unit_swipe_interstitial: None,
            ad_unit_watchlist_inline: None,
            ad_unit_profile_section: None,
            ad_unit_media_detail: None,
            ad_unit_analytics_section: None,
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// The unit-id overrides as the resolver consumes them
    pub fn ad_unit_overrides(&self) -> AdUnitOverrides {
        AdUnitOverrides {
            home_between_rows: self.ad_unit_home_between_rows.clone(),
            swipe_interstitial: self.ad_unit_swipe_interstitial.clone(),
            watchlist_inline: self.ad_unit_watchlist_inline.clone(),
            profile_section: self.ad_unit_profile_section.clone(),
            media_detail: self.ad_unit_media_detail.clone(),
            analytics_section: self.ad_unit_analytics_section.clone(),
        }
    }
}
