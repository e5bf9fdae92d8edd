use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::models::*;
use crate::notify::ProgressReport;
use crate::phase;
use crate::store::StoreError;

// ============================================================
// Error Handling
// ============================================================

/// Log a store error and return a sanitized response to the client.
fn store_error(e: StoreError) -> (StatusCode, String) {
    tracing::error!("Feature store error: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

/// A workspace without a feature database simply has no progress yet.
fn or_empty<T: Default>(result: Result<T, StoreError>) -> Result<T, (StatusCode, String)> {
    match result {
        Err(StoreError::Missing) => Ok(T::default()),
        other => other.map_err(store_error),
    }
}

#[derive(Debug, Deserialize)]
pub struct PhaseQuery {
    pub phase: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProgressResponse {
    pub phase: Option<u32>,
    pub passing: u32,
    pub total: u32,
    pub percentage: f64,
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Progress
// ============================================================

pub async fn get_progress(
    State(state): State<AppState>,
    Query(query): Query<PhaseQuery>,
) -> Result<Json<ProgressResponse>, (StatusCode, String)> {
    let snapshot = or_empty(state.store.try_snapshot(query.phase))?;
    Ok(Json(ProgressResponse {
        phase: query.phase,
        passing: snapshot.passing,
        total: snapshot.total,
        percentage: snapshot.percentage(),
    }))
}

pub async fn check_progress(
    State(state): State<AppState>,
    Query(query): Query<PhaseQuery>,
) -> Json<ProgressReport> {
    Json(
        state
            .notifier
            .report_progress(&state.store, query.phase)
            .await,
    )
}

// ============================================================
// Phases
// ============================================================

pub async fn list_phases(State(state): State<AppState>) -> Json<Vec<PhaseStatus>> {
    Json(phase::phase_overview(&state.store))
}

pub async fn get_current_phase(State(state): State<AppState>) -> Json<CurrentPhase> {
    Json(phase::current_phase_status(&state.store))
}

// ============================================================
// Features
// ============================================================

pub async fn list_passing_features(
    State(state): State<AppState>,
) -> Result<Json<Vec<PassingFeature>>, (StatusCode, String)> {
    or_empty(state.store.try_passing_features()).map(Json)
}
