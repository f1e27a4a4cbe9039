pub mod capability;
pub mod frequency;
pub mod units;
pub mod views;

pub use capability::{select_capability, AdCapability};
pub use frequency::{
    AdDecision, Clock, DenyReason, FrequencyConfig, FrequencyStore, StoreEvent, SubscriptionId,
    SystemClock, DEFAULT_SWIPES_BETWEEN_INTERSTITIALS,
};
pub use units::{AdUnitOverrides, AdUnitResolver};
pub use views::{InterstitialView, PlacementView};
