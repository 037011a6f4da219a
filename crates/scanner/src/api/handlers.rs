//! HTTP request handlers for the scanner API.

use axum::extract::rejection::QueryRejection;
use axum::extract::{ConnectInfo, Query, State};
use axum::http::HeaderMap;
use axum::response::Html;
use axum::Json;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::api::models::{ApiError, ScanParams, ScanRow};
use crate::gate::ScanGate;
use crate::types::ScanRequest;

const INDEX_HTML: &str = include_str!("../../assets/index.html");

/// Header carrying the original client address behind a proxy
const FORWARDED_FOR: &str = "x-forwarded-for";

/// Shared state for scanner API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub gate: Arc<ScanGate>,
    /// Threshold used when the query omits one
    pub default_threshold: f64,
}

impl ApiState {
    pub fn new(gate: Arc<ScanGate>, default_threshold: f64) -> Self {
        Self {
            gate,
            default_threshold,
        }
    }
}

/// Who is asking: first `X-Forwarded-For` entry, else the peer IP, else `"unknown"`.
pub fn client_identity(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    headers
        .get(FORWARDED_FOR)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|first| !first.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// GET /
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /scan?threshold=<0..100>
pub async fn scan(
    State(state): State<ApiState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    query: Result<Query<ScanParams>, QueryRejection>,
) -> Result<Json<Vec<ScanRow>>, ApiError> {
    let Query(params) = query.map_err(|rejection| ApiError::InvalidQuery(rejection.body_text()))?;

    let identity = client_identity(&headers, peer.map(|ConnectInfo(addr)| addr));
    let threshold = params.threshold.unwrap_or(state.default_threshold);

    let output = state
        .gate
        .handle(&ScanRequest::new(threshold, identity))
        .await?;

    Ok(Json(output.results.iter().map(ScanRow::from).collect()))
}
