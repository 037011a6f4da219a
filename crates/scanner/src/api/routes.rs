//! Axum route definitions for the scanner API.

use axum::routing::get;
use axum::Router;
use server::{health_routes, HealthState};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::api::handlers::{self, ApiState};

/// Create all scanner routes.
///
/// # Routes
///
/// - `GET /` - static scanner page
/// - `GET /scan?threshold=` - ranked volatile symbols
/// - `GET /health` - liveness
pub fn create_router(state: ApiState, health: Arc<HealthState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/scan", get(handlers::scan))
        .with_state(state)
        .merge(health_routes(health))
        .layer(TraceLayer::new_for_http())
}
