use std::sync::Arc;

/// Whether the runtime can physically render ads.
///
/// Selected once at startup from configuration, never by probing for a
/// native module and swallowing the failure. The frequency policy behaves
/// identically under either implementation; when rendering is unavailable
/// the worst case is "ad not shown", silently.
pub trait AdCapability: Send + Sync {
    fn can_render(&self) -> bool;
}

/// Native ad rendering is present
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeAdCapability;

impl AdCapability for NativeAdCapability {
    fn can_render(&self) -> bool {
        true
    }
}

/// No ad rendering in this build; every request degrades to "no ad"
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableAdCapability;

impl AdCapability for UnavailableAdCapability {
    fn can_render(&self) -> bool {
        false
    }
}

/// Picks the capability implementation for this process
pub fn select_capability(native_ads_enabled: bool) -> Arc<dyn AdCapability> {
    if native_ads_enabled {
        Arc::new(NativeAdCapability)
    } else {
        tracing::info!("Native ad rendering disabled; serving without ads");
        Arc::new(UnavailableAdCapability)
    }
}
