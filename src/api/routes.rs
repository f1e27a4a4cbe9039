use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Ad decisioning
        .route(
            "/placements/:placement/decision",
            get(handlers::get_decision),
        )
        .route(
            "/placements/:placement/impressions",
            post(handlers::record_impression),
        )
        .route("/placements/:placement/signals", post(handlers::ad_signal))
        // Swipes and session boundaries
        .route("/swipes", post(handlers::record_swipe))
        .route(
            "/interstitial/dismissed",
            post(handlers::interstitial_dismissed),
        )
        .route("/session/reset", post(handlers::reset_session))
        // Settings
        .route("/settings", get(handlers::get_settings))
        .route("/settings", put(handlers::update_settings))
        // Ad units
        .route("/units", get(handlers::get_units))
        // Watchlist
        .route("/watchlist", get(handlers::get_watchlist))
        .route("/watchlist", post(handlers::add_watchlist_entry))
        .route("/watchlist/:id", delete(handlers::remove_watchlist_entry))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
