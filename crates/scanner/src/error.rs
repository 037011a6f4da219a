//! Scanner error types

use serde_json::{json, Value};
use thiserror::Error;

/// Failure of a single JSON fetch
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// Connection, TLS, timeout or body read failure
    #[error("request_exception: {0}")]
    RequestException(String),

    /// The server answered but the body was not JSON
    #[error("non_json_response: {body}")]
    NonJsonResponse {
        status: u16,
        /// First 300 characters of the body
        body: String,
    },
}

impl FetchError {
    /// JSON object describing the failure, as embedded in 502 bodies.
    pub fn to_detail(&self) -> Value {
        match self {
            FetchError::RequestException(_) => json!({ "error": self.to_string() }),
            FetchError::NonJsonResponse { status, .. } => json!({
                "error": self.to_string(),
                "status_code": status,
            }),
        }
    }
}

/// The ticker listing could not be used
#[derive(Error, Debug, Clone, PartialEq)]
#[error("exchange ticker request failed (status {http_status})")]
pub struct UpstreamError {
    /// HTTP status of the ticker response, 0 when no response arrived
    pub http_status: u16,
    /// Decoded body or error object
    pub detail: Value,
}

/// Why the gate refused or failed a scan request
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GateError {
    #[error("threshold must be a number between 0 and 100, got {0}")]
    InvalidThreshold(f64),

    #[error("Too many requests. Try again in {wait_secs} seconds.")]
    RateLimited { wait_secs: u64 },

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// The scan task was cancelled before finishing, e.g. during shutdown
    #[error("Scan was interrupted. Try again later.")]
    ScanInterrupted,
}

/// Errors raised while assembling the scanner
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Invalid scanner configuration: {0}")]
    Config(String),
}

/// Result type for scanner construction
pub type Result<T> = std::result::Result<T, ScanError>;
