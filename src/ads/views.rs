use crate::models::Placement;

use super::frequency::FrequencyStore;

/// Per-placement pass-through view over the frequency store, the shape
/// presentation code consumes. Holds no state of its own.
pub struct PlacementView<'a> {
    store: &'a FrequencyStore,
    placement: Placement,
}

impl<'a> PlacementView<'a> {
    pub fn new(store: &'a FrequencyStore, placement: Placement) -> Self {
        Self { store, placement }
    }

    pub fn can_show(&self) -> bool {
        self.store.can_show_ad(self.placement)
    }

    pub fn impressions(&self) -> u32 {
        self.store.impressions(self.placement)
    }

    pub fn time_since_last_ms(&self) -> i64 {
        self.store.time_since_last_ad(self.placement)
    }

    /// Milliseconds until the min-time rule clears, 0 when it does not
    /// apply (never shown, or window already elapsed)
    pub fn time_remaining_ms(&self) -> i64 {
        if self.store.last_shown_ms(self.placement) == 0 {
            return 0;
        }
        let remaining =
            self.store.config().min_time_between_ads_ms - self.time_since_last_ms();
        remaining.max(0)
    }
}

/// Swipe-interstitial view: the placement view plus swipe progress
pub struct InterstitialView<'a> {
    store: &'a FrequencyStore,
}

impl<'a> InterstitialView<'a> {
    pub fn new(store: &'a FrequencyStore) -> Self {
        Self { store }
    }

    pub fn should_show(&self) -> bool {
        self.store.should_show_interstitial()
    }

    pub fn swipes_until_next(&self) -> u32 {
        self.store
            .config()
            .swipes_between_interstitials
            .saturating_sub(self.store.swipes_since_interstitial())
    }
}
