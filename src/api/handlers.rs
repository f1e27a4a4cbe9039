use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ads::{DenyReason, InterstitialView, PlacementView};
use crate::error::{AppError, AppResult};
use crate::models::{
    AdSignal, MediaType, Placement, SettingsPatch, SettingsRecord, WatchlistEntry,
};

use super::AppState;

// Request/Response types

#[derive(Debug, Serialize)]
pub struct DecisionResponse {
    pub placement: Placement,
    /// Policy verdict combined with render capability
    pub allowed: bool,
    /// Denial reason from the frequency policy, if any
    pub reason: Option<DenyReason>,
    pub can_render: bool,
    pub unit_id: String,
    pub impressions: u32,
    pub time_since_last_ms: i64,
    pub time_remaining_ms: i64,
}

#[derive(Debug, Serialize)]
pub struct ImpressionResponse {
    pub placement: Placement,
    pub impressions: u32,
    pub session_impressions: u32,
}

#[derive(Debug, Deserialize)]
pub struct SignalRequest {
    pub signal: AdSignal,
}

#[derive(Debug, Serialize)]
pub struct SwipeResponse {
    pub swipes_since_interstitial: u32,
    pub swipes_until_next: u32,
    pub should_show_interstitial: bool,
}

#[derive(Debug, Serialize)]
pub struct UnitEntry {
    pub placement: Placement,
    pub unit_id: String,
}

#[derive(Debug, Serialize)]
pub struct UnitsResponse {
    pub use_test_units: bool,
    pub units: Vec<UnitEntry>,
}

#[derive(Debug, Deserialize)]
pub struct CreateWatchlistRequest {
    pub title: String,
    pub media_type: MediaType,
}

fn parse_placement(raw: &str) -> AppResult<Placement> {
    raw.parse().map_err(AppError::InvalidInput)
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Evaluate the frequency policy for a placement
pub async fn get_decision(
    State(state): State<AppState>,
    Path(placement): Path<String>,
) -> AppResult<Json<DecisionResponse>> {
    let placement = parse_placement(&placement)?;
    let inner = state.inner.read().await;

    let decision = inner.frequency.decision(placement);
    let can_render = state.capability.can_render();
    let view = PlacementView::new(&inner.frequency, placement);

    Ok(Json(DecisionResponse {
        placement,
        allowed: decision.is_allowed() && can_render,
        reason: decision.deny_reason(),
        can_render,
        unit_id: state.units.unit_id(placement).to_string(),
        impressions: view.impressions(),
        time_since_last_ms: view.time_since_last_ms(),
        time_remaining_ms: view.time_remaining_ms(),
    }))
}

/// Record one impression at a placement.
///
/// Callers must have passed the decision endpoint first; recording is
/// unconditional by contract.
pub async fn record_impression(
    State(state): State<AppState>,
    Path(placement): Path<String>,
) -> AppResult<(StatusCode, Json<ImpressionResponse>)> {
    let placement = parse_placement(&placement)?;
    let mut inner = state.inner.write().await;

    inner.frequency.record_impression(placement);

    Ok((
        StatusCode::CREATED,
        Json(ImpressionResponse {
            placement,
            impressions: inner.frequency.impressions(placement),
            session_impressions: inner.frequency.session_impressions(),
        }),
    ))
}

/// Consume an opaque ad-network signal for a placement
pub async fn ad_signal(
    State(state): State<AppState>,
    Path(placement): Path<String>,
    Json(request): Json<SignalRequest>,
) -> AppResult<StatusCode> {
    let placement = parse_placement(&placement)?;

    match request.signal {
        AdSignal::Loaded => {
            tracing::debug!(placement = %placement, "Ad creative loaded");
        }
        AdSignal::Failed => {
            // No retry here; the network collaborator retries after close
            tracing::warn!(placement = %placement, "Ad load failed, showing nothing");
        }
        AdSignal::Closed => {
            if placement == Placement::SwipeInterstitial {
                let mut inner = state.inner.write().await;
                inner.frequency.reset_swipe_count();
            }
        }
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Count one swipe toward the next interstitial
pub async fn record_swipe(State(state): State<AppState>) -> Json<SwipeResponse> {
    let mut inner = state.inner.write().await;
    inner.frequency.record_swipe();

    let view = InterstitialView::new(&inner.frequency);
    Json(SwipeResponse {
        swipes_since_interstitial: inner.frequency.swipes_since_interstitial(),
        swipes_until_next: view.swipes_until_next(),
        should_show_interstitial: view.should_show(),
    })
}

/// Reset the swipe counter after an interstitial was dismissed
pub async fn interstitial_dismissed(State(state): State<AppState>) -> StatusCode {
    let mut inner = state.inner.write().await;
    inner.frequency.reset_swipe_count();
    StatusCode::OK
}

/// Session-boundary reset of impression counters
pub async fn reset_session(State(state): State<AppState>) -> StatusCode {
    let mut inner = state.inner.write().await;
    inner.frequency.reset_session_impressions();
    StatusCode::OK
}

/// Current persisted-settings view of the store
pub async fn get_settings(State(state): State<AppState>) -> Json<SettingsRecord> {
    let inner = state.inner.read().await;
    Json(inner.frequency.settings_record())
}

/// Merge a settings patch, persist it, and apply it to the live store
pub async fn update_settings(
    State(state): State<AppState>,
    Json(patch): Json<SettingsPatch>,
) -> AppResult<Json<SettingsRecord>> {
    let merged = state.settings.merge(&patch).await?;

    let mut inner = state.inner.write().await;
    inner.frequency.apply_settings(&merged);

    Ok(Json(merged))
}

/// Full placement → unit id map
pub async fn get_units(State(state): State<AppState>) -> Json<UnitsResponse> {
    let units = state
        .units
        .all()
        .into_iter()
        .map(|(placement, unit_id)| UnitEntry {
            placement,
            unit_id: unit_id.to_string(),
        })
        .collect();

    Json(UnitsResponse {
        use_test_units: state.units.use_test_units(),
        units,
    })
}

/// Get the watchlist
pub async fn get_watchlist(State(state): State<AppState>) -> Json<crate::models::Watchlist> {
    let inner = state.inner.read().await;
    Json(inner.watchlist.clone())
}

/// Add a title to the watchlist
pub async fn add_watchlist_entry(
    State(state): State<AppState>,
    Json(request): Json<CreateWatchlistRequest>,
) -> (StatusCode, Json<WatchlistEntry>) {
    let entry = WatchlistEntry::new(request.title, request.media_type);
    let response = entry.clone();

    let mut inner = state.inner.write().await;
    inner.watchlist.add(entry);

    (StatusCode::CREATED, Json(response))
}

/// Remove a watchlist entry by id
pub async fn remove_watchlist_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let mut inner = state.inner.write().await;
    match inner.watchlist.remove(id) {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => Err(AppError::NotFound(format!("watchlist entry {}", id))),
    }
}
