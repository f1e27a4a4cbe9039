use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::models::{Placement, SettingsRecord};

/// Compiled-in swipe threshold. This field is never taken from persisted
/// settings: every load forces it back to this value, discarding any
/// previously persisted override. Other config fields persist normally.
pub const DEFAULT_SWIPES_BETWEEN_INTERSTITIALS: u32 = 7;

/// Wall-clock source, injected so the min-time rule is testable
pub trait Clock: Send + Sync {
    /// Current time as epoch milliseconds
    fn now_ms(&self) -> i64;
}

/// Production clock backed by system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Immutable frequency-cap policy parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyConfig {
    /// Impressions allowed per session, across all placements
    #[serde(default = "default_session_cap")]
    pub max_impressions_per_session: u32,
    /// Impressions allowed per placement
    #[serde(default = "default_placement_cap")]
    pub max_impressions_per_placement: u32,
    /// Minimum gap between two impressions at the same placement
    #[serde(default = "default_min_time_ms")]
    pub min_time_between_ads_ms: i64,
    /// Swipes required before the next interstitial
    #[serde(default = "default_swipe_threshold")]
    pub swipes_between_interstitials: u32,
}

fn default_session_cap() -> u32 {
    10
}

fn default_placement_cap() -> u32 {
    3
}

fn default_min_time_ms() -> i64 {
    60_000
}

fn default_swipe_threshold() -> u32 {
    DEFAULT_SWIPES_BETWEEN_INTERSTITIALS
}

impl Default for FrequencyConfig {
    fn default() -> Self {
        Self {
            max_impressions_per_session: default_session_cap(),
            max_impressions_per_placement: default_placement_cap(),
            min_time_between_ads_ms: default_min_time_ms(),
            swipes_between_interstitials: default_swipe_threshold(),
        }
    }
}

/// Why `can_show_ad` said no
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    Premium,
    AdsDisabled,
    SessionCapReached,
    PlacementCapReached,
    TooSoonAfterLastAd,
}

/// Outcome of a frequency-policy check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdDecision {
    Allowed,
    Denied(DenyReason),
}

impl AdDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AdDecision::Allowed)
    }

    pub fn deny_reason(&self) -> Option<DenyReason> {
        match self {
            AdDecision::Allowed => None,
            AdDecision::Denied(reason) => Some(*reason),
        }
    }
}

/// Change notification emitted after a store mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    ImpressionRecorded { placement: Placement },
    SwipeRecorded { swipes: u32 },
    SwipeCountReset,
    SessionReset,
    PremiumChanged { is_premium: bool },
    AdsEnabledChanged { ads_enabled: bool },
}

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn Fn(&StoreEvent) + Send + Sync>;

/// Session-scoped impression state. All fields start at zero; a last-shown
/// time of 0 means "never shown" and skips the min-time rule.
#[derive(Debug, Clone, Default)]
struct ImpressionState {
    impressions: HashMap<Placement, u32>,
    last_shown_ms: HashMap<Placement, i64>,
    session_impressions: u32,
    swipes_since_interstitial: u32,
}

/// Single authority for whether an ad impression is permitted at a
/// placement, and for recording impressions and swipes.
///
/// `can_show_ad` / `record_impression` is a check-then-act pair and is not
/// atomic. Callers must check before recording and must serialize access;
/// in this service every mutation goes through the `AppState` lock, which
/// preserves that contract.
pub struct FrequencyStore {
    config: FrequencyConfig,
    state: ImpressionState,
    is_premium: bool,
    ads_enabled: bool,
    clock: Arc<dyn Clock>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl FrequencyStore {
    /// Creates a store with the given policy and zeroed counters
    pub fn new(config: FrequencyConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            state: ImpressionState::default(),
            is_premium: false,
            ads_enabled: true,
            clock,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Builds a store from a persisted settings record.
    ///
    /// Persisted fields win over defaults, except the swipe threshold,
    /// which is forced back to the compiled default on every load. Any
    /// persisted override of that one field is silently discarded.
    pub fn from_settings(record: &SettingsRecord, clock: Arc<dyn Clock>) -> Self {
        let mut config = record.frequency;
        config.swipes_between_interstitials = DEFAULT_SWIPES_BETWEEN_INTERSTITIALS;

        let mut store = Self::new(config, clock);
        store.is_premium = record.is_premium;
        store.ads_enabled = record.ads_enabled && !record.is_premium;
        store
    }

    pub fn config(&self) -> &FrequencyConfig {
        &self.config
    }

    pub fn is_premium(&self) -> bool {
        self.is_premium
    }

    pub fn ads_enabled(&self) -> bool {
        self.ads_enabled
    }

    /// The settings view of the current state, for persistence
    pub fn settings_record(&self) -> SettingsRecord {
        SettingsRecord {
            is_premium: self.is_premium,
            ads_enabled: self.ads_enabled,
            frequency: self.config,
        }
    }

    /// Applies a merged settings record to the live store. Unlike load,
    /// no forced override happens here; a changed swipe threshold takes
    /// effect until the next process start reverts it.
    pub fn apply_settings(&mut self, record: &SettingsRecord) {
        self.config = record.frequency;
        self.set_premium(record.is_premium);
        if !record.is_premium {
            self.set_ads_enabled(record.ads_enabled);
        }
    }

    /// Evaluates the frequency policy for a placement.
    ///
    /// Pure with respect to state plus wall-clock time; never mutates.
    pub fn decision(&self, placement: Placement) -> AdDecision {
        if self.is_premium {
            return AdDecision::Denied(DenyReason::Premium);
        }
        if !self.ads_enabled {
            return AdDecision::Denied(DenyReason::AdsDisabled);
        }
        if self.state.session_impressions >= self.config.max_impressions_per_session {
            return AdDecision::Denied(DenyReason::SessionCapReached);
        }
        if self.impressions(placement) >= self.config.max_impressions_per_placement {
            return AdDecision::Denied(DenyReason::PlacementCapReached);
        }

        let last_shown = self.last_shown_ms(placement);
        if last_shown != 0 {
            let elapsed = self.clock.now_ms() - last_shown;
            if elapsed < self.config.min_time_between_ads_ms {
                return AdDecision::Denied(DenyReason::TooSoonAfterLastAd);
            }
        }

        AdDecision::Allowed
    }

    pub fn can_show_ad(&self, placement: Placement) -> bool {
        self.decision(placement).is_allowed()
    }

    /// Records an impression at a placement.
    ///
    /// Unconditional: no cap is re-checked here. Callers must have passed
    /// `can_show_ad` first.
    pub fn record_impression(&mut self, placement: Placement) {
        let now = self.clock.now_ms();
        self.state.last_shown_ms.insert(placement, now);
        *self.state.impressions.entry(placement).or_insert(0) += 1;
        self.state.session_impressions += 1;

        tracing::debug!(
            placement = %placement,
            session_impressions = self.state.session_impressions,
            "Impression recorded"
        );
        self.emit(StoreEvent::ImpressionRecorded { placement });
    }

    /// Counts one swipe toward the next interstitial
    pub fn record_swipe(&mut self) {
        self.state.swipes_since_interstitial += 1;
        self.emit(StoreEvent::SwipeRecorded {
            swipes: self.state.swipes_since_interstitial,
        });
    }

    /// Zeroes the swipe counter, after an interstitial is dismissed
    pub fn reset_swipe_count(&mut self) {
        self.state.swipes_since_interstitial = 0;
        self.emit(StoreEvent::SwipeCountReset);
    }

    /// Session-boundary reset: zeroes the session total and every
    /// per-placement count. Last-shown timestamps are kept so the
    /// min-time rule still applies across the boundary.
    pub fn reset_session_impressions(&mut self) {
        self.state.session_impressions = 0;
        self.state.impressions.clear();
        tracing::info!("Session impression counters reset");
        self.emit(StoreEvent::SessionReset);
    }

    /// Whether the swipe interstitial is due
    pub fn should_show_interstitial(&self) -> bool {
        !self.is_premium
            && self.ads_enabled
            && self.state.swipes_since_interstitial >= self.config.swipes_between_interstitials
    }

    /// Milliseconds since the last impression at a placement.
    ///
    /// When the placement has never shown an ad the result is the full
    /// epoch offset; callers must treat the 0 sentinel specially, as
    /// `decision` does.
    pub fn time_since_last_ad(&self, placement: Placement) -> i64 {
        self.clock.now_ms() - self.last_shown_ms(placement)
    }

    pub fn impressions(&self, placement: Placement) -> u32 {
        self.state.impressions.get(&placement).copied().unwrap_or(0)
    }

    pub fn last_shown_ms(&self, placement: Placement) -> i64 {
        self.state.last_shown_ms.get(&placement).copied().unwrap_or(0)
    }

    pub fn session_impressions(&self) -> u32 {
        self.state.session_impressions
    }

    pub fn swipes_since_interstitial(&self) -> u32 {
        self.state.swipes_since_interstitial
    }

    pub fn set_premium(&mut self, is_premium: bool) {
        self.is_premium = is_premium;
        self.emit(StoreEvent::PremiumChanged { is_premium });
        // Premium implies no ads
        if is_premium && self.ads_enabled {
            self.set_ads_enabled(false);
        }
    }

    pub fn set_ads_enabled(&mut self, ads_enabled: bool) {
        self.ads_enabled = ads_enabled && !self.is_premium;
        self.emit(StoreEvent::AdsEnabledChanged {
            ads_enabled: self.ads_enabled,
        });
    }

    /// Registers a change subscriber. Subscribers are invoked
    /// synchronously, in subscription order, after every mutation.
    pub fn subscribe<F>(&mut self, subscriber: F) -> SubscriptionId
    where
        F: Fn(&StoreEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Removes a subscriber; unknown ids are ignored
    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
    }

    fn emit(&self, event: StoreEvent) {
        for (_, subscriber) in &self.subscribers {
            subscriber(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Mutex;

    /// Test clock advanced by hand
    struct ManualClock {
        now_ms: AtomicI64,
    }

    impl ManualClock {
        fn starting_at(ms: i64) -> Arc<Self> {
            Arc::new(Self {
                now_ms: AtomicI64::new(ms),
            })
        }

        fn advance(&self, ms: i64) {
            self.now_ms.fetch_add(ms, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now_ms(&self) -> i64 {
            self.now_ms.load(Ordering::SeqCst)
        }
    }

    fn test_config() -> FrequencyConfig {
        FrequencyConfig {
            max_impressions_per_session: 2,
            max_impressions_per_placement: 5,
            min_time_between_ads_ms: 60_000,
            swipes_between_interstitials: 3,
        }
    }

    fn test_store() -> (FrequencyStore, Arc<ManualClock>) {
        let clock = ManualClock::starting_at(1_000_000);
        let store = FrequencyStore::new(test_config(), clock.clone());
        (store, clock)
    }

    #[test]
    fn test_premium_denies_every_placement() {
        let (mut store, _) = test_store();
        store.set_premium(true);
        for placement in Placement::ALL {
            assert_eq!(
                store.decision(placement),
                AdDecision::Denied(DenyReason::Premium)
            );
        }
    }

    #[test]
    fn test_ads_disabled_denies_every_placement() {
        let (mut store, _) = test_store();
        store.set_ads_enabled(false);
        for placement in Placement::ALL {
            assert!(!store.can_show_ad(placement));
        }
    }

    #[test]
    fn test_session_cap_denies_all_placements() {
        let (mut store, clock) = test_store();
        // Cap of 2 across any placements
        store.record_impression(Placement::HomeBetweenRows);
        clock.advance(120_000);
        store.record_impression(Placement::MediaDetail);
        clock.advance(120_000);

        for placement in Placement::ALL {
            assert_eq!(
                store.decision(placement),
                AdDecision::Denied(DenyReason::SessionCapReached)
            );
        }
    }

    #[test]
    fn test_session_cap_spills_to_untouched_placement() {
        // The concrete scenario: two impressions on home_between_rows deny
        // watchlist_inline even though its own count is zero.
        let (mut store, clock) = test_store();
        store.record_impression(Placement::HomeBetweenRows);
        clock.advance(120_000);
        store.record_impression(Placement::HomeBetweenRows);

        assert_eq!(store.impressions(Placement::WatchlistInline), 0);
        assert_eq!(
            store.decision(Placement::WatchlistInline),
            AdDecision::Denied(DenyReason::SessionCapReached)
        );
    }

    #[test]
    fn test_placement_cap_is_per_placement() {
        let clock = ManualClock::starting_at(1_000_000);
        let config = FrequencyConfig {
            max_impressions_per_session: 100,
            max_impressions_per_placement: 2,
            min_time_between_ads_ms: 1_000,
            swipes_between_interstitials: 3,
        };
        let mut store = FrequencyStore::new(config, clock.clone());

        store.record_impression(Placement::ProfileSection);
        clock.advance(10_000);
        store.record_impression(Placement::ProfileSection);
        clock.advance(10_000);

        assert_eq!(
            store.decision(Placement::ProfileSection),
            AdDecision::Denied(DenyReason::PlacementCapReached)
        );
        // Untouched placement stays eligible while the session cap holds
        assert!(store.can_show_ad(Placement::MediaDetail));
    }

    #[test]
    fn test_min_time_rule_blocks_until_elapsed() {
        let (mut store, clock) = test_store();
        store.record_impression(Placement::MediaDetail);

        assert_eq!(
            store.decision(Placement::MediaDetail),
            AdDecision::Denied(DenyReason::TooSoonAfterLastAd)
        );

        clock.advance(59_999);
        assert!(!store.can_show_ad(Placement::MediaDetail));

        clock.advance(1);
        assert!(store.can_show_ad(Placement::MediaDetail));
    }

    #[test]
    fn test_never_shown_skips_min_time_rule() {
        let (store, clock) = test_store();
        // last_shown == 0 must not trip the min-time rule even though the
        // raw elapsed value is the whole epoch offset
        assert_eq!(store.last_shown_ms(Placement::AnalyticsSection), 0);
        assert_eq!(
            store.time_since_last_ad(Placement::AnalyticsSection),
            clock.now_ms()
        );
        assert!(store.can_show_ad(Placement::AnalyticsSection));
    }

    #[test]
    fn test_record_impression_does_not_self_protect() {
        let (mut store, _) = test_store();
        // Over-recording past every cap is allowed; enforcement is the
        // caller's contract via can_show_ad
        for _ in 0..10 {
            store.record_impression(Placement::HomeBetweenRows);
        }
        assert_eq!(store.impressions(Placement::HomeBetweenRows), 10);
        assert_eq!(store.session_impressions(), 10);
    }

    #[test]
    fn test_interstitial_threshold() {
        let (mut store, _) = test_store();
        assert!(!store.should_show_interstitial());

        store.record_swipe();
        store.record_swipe();
        assert!(!store.should_show_interstitial());

        store.record_swipe();
        assert!(store.should_show_interstitial());

        store.reset_swipe_count();
        assert!(!store.should_show_interstitial());
        assert_eq!(store.swipes_since_interstitial(), 0);
    }

    #[test]
    fn test_interstitial_suppressed_for_premium() {
        let (mut store, _) = test_store();
        for _ in 0..5 {
            store.record_swipe();
        }
        store.set_premium(true);
        assert!(!store.should_show_interstitial());
    }

    #[test]
    fn test_session_reset_clears_counts_but_keeps_timestamps() {
        let (mut store, clock) = test_store();
        store.record_impression(Placement::HomeBetweenRows);
        let shown_at = store.last_shown_ms(Placement::HomeBetweenRows);

        store.reset_session_impressions();

        assert_eq!(store.session_impressions(), 0);
        assert_eq!(store.impressions(Placement::HomeBetweenRows), 0);
        assert_eq!(store.last_shown_ms(Placement::HomeBetweenRows), shown_at);

        // Min-time rule still applies across the session boundary
        assert!(!store.can_show_ad(Placement::HomeBetweenRows));
        clock.advance(60_000);
        assert!(store.can_show_ad(Placement::HomeBetweenRows));
    }

    #[test]
    fn test_set_premium_forces_ads_disabled() {
        let (mut store, _) = test_store();
        assert!(store.ads_enabled());
        store.set_premium(true);
        assert!(!store.ads_enabled());

        // Ads cannot be re-enabled while premium
        store.set_ads_enabled(true);
        assert!(!store.ads_enabled());
    }

    #[test]
    fn test_from_settings_forces_swipe_threshold_to_default() {
        // Intentional behavior, not a bug: a persisted override of the
        // swipe threshold is discarded on every load.
        let clock = ManualClock::starting_at(0);
        let record = SettingsRecord {
            is_premium: false,
            ads_enabled: true,
            frequency: FrequencyConfig {
                max_impressions_per_session: 4,
                max_impressions_per_placement: 2,
                min_time_between_ads_ms: 30_000,
                swipes_between_interstitials: 1,
            },
        };

        let store = FrequencyStore::from_settings(&record, clock);
        assert_eq!(store.config().max_impressions_per_session, 4);
        assert_eq!(store.config().max_impressions_per_placement, 2);
        assert_eq!(store.config().min_time_between_ads_ms, 30_000);
        assert_eq!(
            store.config().swipes_between_interstitials,
            DEFAULT_SWIPES_BETWEEN_INTERSTITIALS
        );
    }

    #[test]
    fn test_from_settings_premium_disables_ads() {
        let clock = ManualClock::starting_at(0);
        let record = SettingsRecord {
            is_premium: true,
            ads_enabled: true,
            frequency: FrequencyConfig::default(),
        };
        let store = FrequencyStore::from_settings(&record, clock);
        assert!(store.is_premium());
        assert!(!store.ads_enabled());
    }

    #[test]
    fn test_subscribers_fire_in_subscription_order() {
        let (mut store, _) = test_store();
        let log = Arc::new(Mutex::new(Vec::new()));

        let first = log.clone();
        store.subscribe(move |event| {
            if matches!(event, StoreEvent::SwipeRecorded { .. }) {
                first.lock().unwrap().push("first");
            }
        });
        let second = log.clone();
        store.subscribe(move |event| {
            if matches!(event, StoreEvent::SwipeRecorded { .. }) {
                second.lock().unwrap().push("second");
            }
        });

        store.record_swipe();
        assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let (mut store, _) = test_store();
        let log = Arc::new(Mutex::new(Vec::new()));

        let sink = log.clone();
        let id = store.subscribe(move |event| {
            sink.lock().unwrap().push(event.clone());
        });

        store.record_swipe();
        store.unsubscribe(id);
        store.record_swipe();

        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_impression_event_carries_placement() {
        let (mut store, _) = test_store();
        let log = Arc::new(Mutex::new(Vec::new()));

        let sink = log.clone();
        store.subscribe(move |event| {
            sink.lock().unwrap().push(event.clone());
        });

        store.record_impression(Placement::MediaDetail);
        assert_eq!(
            *log.lock().unwrap(),
            vec![StoreEvent::ImpressionRecorded {
                placement: Placement::MediaDetail
            }]
        );
    }
}
