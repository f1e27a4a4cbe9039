use std::collections::HashMap;

use crate::models::Placement;

// Google sample unit ids, safe to request from any build
const TEST_BANNER: &str = "ca-app-pub-3940256099942544/6300978111";
const TEST_INTERSTITIAL: &str = "ca-app-pub-3940256099942544/1033173712";
const TEST_NATIVE: &str = "ca-app-pub-3940256099942544/2247696110";

// Production fallbacks, used when no per-placement override is configured
const PROD_HOME_BETWEEN_ROWS: &str = "ca-app-pub-7203458715513593/1400541207";
const PROD_SWIPE_INTERSTITIAL: &str = "ca-app-pub-7203458715513593/8087459531";
const PROD_WATCHLIST_INLINE: &str = "ca-app-pub-7203458715513593/6774377869";
const PROD_PROFILE_SECTION: &str = "ca-app-pub-7203458715513593/5461296190";
const PROD_MEDIA_DETAIL: &str = "ca-app-pub-7203458715513593/4148214525";
const PROD_ANALYTICS_SECTION: &str = "ca-app-pub-7203458715513593/2835132851";

/// Per-placement production unit-id overrides, read once from the
/// environment at startup
#[derive(Debug, Clone, Default)]
pub struct AdUnitOverrides {
    pub home_between_rows: Option<String>,
    pub swipe_interstitial: Option<String>,
    pub watchlist_inline: Option<String>,
    pub profile_section: Option<String>,
    pub media_detail: Option<String>,
    pub analytics_section: Option<String>,
}

/// Deterministic placement → ad-network unit id map.
///
/// One boolean swaps the whole map between the test set and the
/// production set; production ids honor per-placement overrides with
/// hard-coded fallbacks. Built once at startup, immutable after.
#[derive(Debug, Clone)]
pub struct AdUnitResolver {
    units: HashMap<Placement, String>,
    use_test_units: bool,
}

impl AdUnitResolver {
    pub fn new(use_test_units: bool, overrides: AdUnitOverrides) -> Self {
        let units = Placement::ALL
            .into_iter()
            .map(|placement| {
                let id = if use_test_units {
                    Self::test_unit(placement).to_string()
                } else {
                    Self::production_unit(placement, &overrides)
                };
                (placement, id)
            })
            .collect();

        Self {
            units,
            use_test_units,
        }
    }

    fn test_unit(placement: Placement) -> &'static str {
        match placement {
            Placement::HomeBetweenRows => TEST_BANNER,
            Placement::SwipeInterstitial => TEST_INTERSTITIAL,
            Placement::WatchlistInline => TEST_NATIVE,
            Placement::ProfileSection => TEST_BANNER,
            Placement::MediaDetail => TEST_NATIVE,
            Placement::AnalyticsSection => TEST_BANNER,
        }
    }

    fn production_unit(placement: Placement, overrides: &AdUnitOverrides) -> String {
        let (override_id, fallback) = match placement {
            Placement::HomeBetweenRows => (&overrides.home_between_rows, PROD_HOME_BETWEEN_ROWS),
            Placement::SwipeInterstitial => {
                (&overrides.swipe_interstitial, PROD_SWIPE_INTERSTITIAL)
            }
            Placement::WatchlistInline => (&overrides.watchlist_inline, PROD_WATCHLIST_INLINE),
            Placement::ProfileSection => (&overrides.profile_section, PROD_PROFILE_SECTION),
            Placement::MediaDetail => (&overrides.media_detail, PROD_MEDIA_DETAIL),
            Placement::AnalyticsSection => (&overrides.analytics_section, PROD_ANALYTICS_SECTION),
        };
        override_id.clone().unwrap_or_else(|| fallback.to_string())
    }

    pub fn unit_id(&self, placement: Placement) -> &str {
        // The map is total over Placement::ALL by construction
        &self.units[&placement]
    }

    pub fn use_test_units(&self) -> bool {
        self.use_test_units
    }

    /// Full placement → unit id map, in `Placement::ALL` order
    pub fn all(&self) -> Vec<(Placement, &str)> {
        Placement::ALL
            .into_iter()
            .map(|p| (p, self.unit_id(p)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_test_mode_uses_google_sample_units() {
        let resolver = AdUnitResolver::new(true, AdUnitOverrides::default());
        assert_eq!(resolver.unit_id(Placement::HomeBetweenRows), TEST_BANNER);
        assert_eq!(
            resolver.unit_id(Placement::SwipeInterstitial),
            TEST_INTERSTITIAL
        );
        assert_eq!(resolver.unit_id(Placement::MediaDetail), TEST_NATIVE);
        assert!(resolver.use_test_units());
    }

    #[test]
    fn test_production_mode_uses_fallbacks() {
        let resolver = AdUnitResolver::new(false, AdUnitOverrides::default());
        assert_eq!(
            resolver.unit_id(Placement::WatchlistInline),
            PROD_WATCHLIST_INLINE
        );
        assert_eq!(
            resolver.unit_id(Placement::AnalyticsSection),
            PROD_ANALYTICS_SECTION
        );
    }

    #[test]
    fn test_production_override_beats_fallback() {
        let overrides = AdUnitOverrides {
            profile_section: Some("ca-app-pub-1111111111111111/2222222222".to_string()),
            ..Default::default()
        };
        let resolver = AdUnitResolver::new(false, overrides);
        assert_eq!(
            resolver.unit_id(Placement::ProfileSection),
            "ca-app-pub-1111111111111111/2222222222"
        );
        // Other placements keep their fallbacks
        assert_eq!(resolver.unit_id(Placement::MediaDetail), PROD_MEDIA_DETAIL);
    }

    #[test]
    fn test_overrides_ignored_in_test_mode() {
        let overrides = AdUnitOverrides {
            media_detail: Some("ca-app-pub-1111111111111111/3333333333".to_string()),
            ..Default::default()
        };
        let resolver = AdUnitResolver::new(true, overrides);
        assert_eq!(resolver.unit_id(Placement::MediaDetail), TEST_NATIVE);
    }

    #[test]
    fn test_map_is_total() {
        let resolver = AdUnitResolver::new(true, AdUnitOverrides::default());
        assert_eq!(resolver.all().len(), Placement::ALL.len());
    }
}
