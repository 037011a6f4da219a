//! Health check endpoint

use axum::{extract::State, response::Json, routing::get, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Body of `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: String,
    pub uptime_seconds: u64,
}

/// Shared state for the health endpoint
#[derive(Debug, Clone)]
pub struct HealthState {
    pub service_name: String,
    pub version: String,
    pub start_time: Instant,
}

impl HealthState {
    pub fn new(service_name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            version: version.into(),
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn status(&self) -> HealthStatus {
        HealthStatus {
            status: "ok".to_string(),
            service: self.service_name.clone(),
            version: self.version.clone(),
            timestamp: Utc::now().to_rfc3339(),
            uptime_seconds: self.uptime_seconds(),
        }
    }
}

pub async fn health_handler(State(state): State<Arc<HealthState>>) -> Json<HealthStatus> {
    Json(state.status())
}

/// Router serving `GET /health`
pub fn health_routes(state: Arc<HealthState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[test]
    fn test_health_status() {
        let state = HealthState::new("volscan", "0.1.0");
        let status = state.status();

        assert_eq!(status.status, "ok");
        assert_eq!(status.service, "volscan");
        assert_eq!(status.version, "0.1.0");
        assert_eq!(status.uptime_seconds, 0);
    }

    #[tokio::test]
    async fn test_health_route() {
        let router = health_routes(Arc::new(HealthState::new("volscan", "0.1.0")));

        let response = router
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let status: HealthStatus = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(status.service, "volscan");
    }
}
