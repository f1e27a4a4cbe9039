use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

mod watchlist;

pub use watchlist::{MediaType, Watchlist, WatchlistEntry};

/// A location in the app UI where an ad may be displayed.
///
/// Closed set: adding a placement means adding a unit id mapping and
/// (for production) an override knob in `Config`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// Banner slotted between home-screen content rows
    HomeBetweenRows,
    /// Full-screen ad between swipe actions
    SwipeInterstitial,
    /// Native ad inlined in the watchlist
    WatchlistInline,
    /// Banner in the profile section
    ProfileSection,
    /// Native ad on the media detail screen
    MediaDetail,
    /// Banner under the stats/analytics section
    AnalyticsSection,
}

impl Placement {
    /// All placements, in a fixed order (used for unit maps and resets)
    pub const ALL: [Placement; 6] = [
        Placement::HomeBetweenRows,
        Placement::SwipeInterstitial,
        Placement::WatchlistInline,
        Placement::ProfileSection,
        Placement::MediaDetail,
        Placement::AnalyticsSection,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Placement::HomeBetweenRows => "home_between_rows",
            Placement::SwipeInterstitial => "swipe_interstitial",
            Placement::WatchlistInline => "watchlist_inline",
            Placement::ProfileSection => "profile_section",
            Placement::MediaDetail => "media_detail",
            Placement::AnalyticsSection => "analytics_section",
        }
    }
}

impl Display for Placement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Placement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "home_between_rows" => Ok(Placement::HomeBetweenRows),
            "swipe_interstitial" => Ok(Placement::SwipeInterstitial),
            "watchlist_inline" => Ok(Placement::WatchlistInline),
            "profile_section" => Ok(Placement::ProfileSection),
            "media_detail" => Ok(Placement::MediaDetail),
            "analytics_section" => Ok(Placement::AnalyticsSection),
            other => Err(format!("unknown placement: {}", other)),
        }
    }
}

/// Opaque per-placement notification from the ad network collaborator.
///
/// The policy core only consumes these as signals; it knows nothing about
/// the network protocol behind them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdSignal {
    /// A creative finished loading and is ready to render
    Loaded,
    /// The network could not deliver a creative; shown as "no ad"
    Failed,
    /// The user dismissed a rendered ad
    Closed,
}

/// The single persisted settings record, stored under the fixed
/// `ad-storage` name. Impression counters and timestamps are deliberately
/// absent: they are session-scoped and die with the process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsRecord {
    pub is_premium: bool,
    pub ads_enabled: bool,
    pub frequency: crate::ads::FrequencyConfig,
}

impl Default for SettingsRecord {
    fn default() -> Self {
        Self {
            is_premium: false,
            ads_enabled: true,
            frequency: crate::ads::FrequencyConfig::default(),
        }
    }
}

/// Partial update to the persisted settings record. `None` fields are
/// left as-is by `SettingsStore::merge`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsPatch {
    pub is_premium: Option<bool>,
    pub ads_enabled: Option<bool>,
    pub max_impressions_per_session: Option<u32>,
    pub max_impressions_per_placement: Option<u32>,
    pub min_time_between_ads_ms: Option<i64>,
    pub swipes_between_interstitials: Option<u32>,
}

impl SettingsPatch {
    /// Applies this patch on top of an existing record
    pub fn apply(&self, record: &mut SettingsRecord) {
        if let Some(premium) = self.is_premium {
            record.is_premium = premium;
            // Premium implies no ads
            if premium {
                record.ads_enabled = false;
            }
        }
        if let Some(enabled) = self.ads_enabled {
            record.ads_enabled = enabled && !record.is_premium;
        }
        if let Some(v) = self.max_impressions_per_session {
            record.frequency.max_impressions_per_session = v;
        }
        if let Some(v) = self.max_impressions_per_placement {
            record.frequency.max_impressions_per_placement = v;
        }
        if let Some(v) = self.min_time_between_ads_ms {
            record.frequency.min_time_between_ads_ms = v;
        }
        if let Some(v) = self.swipes_between_interstitials {
            record.frequency.swipes_between_interstitials = v;
        }
    }
}
