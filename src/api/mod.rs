mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::notify::Notifier;
use crate::store::FeatureStore;

/// Shared state for the read-only progress API of one workspace.
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: FeatureStore,
    pub notifier: Notifier,
}

impl AppState {
    pub fn new(store: FeatureStore, notifier: Notifier) -> Self {
        Self { store, notifier }
    }
}

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        // Progress
        .route("/progress", get(handlers::get_progress))
        .route("/progress/check", post(handlers::check_progress))
        // Phases
        .route("/phases", get(handlers::list_phases))
        .route("/phases/current", get(handlers::get_current_phase))
        // Features
        .route("/features/passing", get(handlers::list_passing_features))
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
