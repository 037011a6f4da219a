//! API request/response models.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::GateError;
use crate::format::{format_pct, format_significant};
use crate::types::VolatilityResult;

/// Significant digits for prices in scan rows
const PRICE_DIGITS: usize = 6;

/// Query parameters for `GET /scan`.
#[derive(Debug, Default, Deserialize)]
pub struct ScanParams {
    /// Minimum candle range in percent, `[0, 100]`
    pub threshold: Option<f64>,
}

/// One row of the scan response, pre-formatted for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRow {
    pub symbol: String,
    /// `current` or `previous`
    pub candle: String,
    pub price: String,
    /// `"high / low"`
    pub range: String,
    pub volatility: String,
    pub change: String,
}

impl From<&VolatilityResult> for ScanRow {
    fn from(result: &VolatilityResult) -> Self {
        Self {
            symbol: result.symbol.clone(),
            candle: result.candle.as_str().to_string(),
            price: format_significant(result.price, PRICE_DIGITS),
            range: format!(
                "{} / {}",
                format_significant(result.high, PRICE_DIGITS),
                format_significant(result.low, PRICE_DIGITS)
            ),
            volatility: format_pct(result.volatility_pct),
            change: format_pct(result.change_pct),
        }
    }
}

/// Error responses of the scan endpoint.
#[derive(Debug)]
pub enum ApiError {
    Gate(GateError),
    /// Query string could not be decoded
    InvalidQuery(String),
}

impl From<GateError> for ApiError {
    fn from(error: GateError) -> Self {
        ApiError::Gate(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Gate(GateError::RateLimited { wait_secs }) => (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::RETRY_AFTER, wait_secs.to_string())],
                Json(json!({
                    "error": GateError::RateLimited { wait_secs }.to_string(),
                })),
            )
                .into_response(),
            ApiError::Gate(GateError::Upstream(upstream)) => (
                StatusCode::BAD_GATEWAY,
                Json(json!({
                    "error": "Exchange ticker response error",
                    "http_status": upstream.http_status,
                    "detail": upstream.detail,
                })),
            )
                .into_response(),
            ApiError::Gate(error @ GateError::InvalidThreshold(_)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": error.to_string() })),
            )
                .into_response(),
            ApiError::Gate(error @ GateError::ScanInterrupted) => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "error": error.to_string() })),
            )
                .into_response(),
            ApiError::InvalidQuery(message) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": message })),
            )
                .into_response(),
        }
    }
}
