//! JSON-over-HTTPS fetcher
//!
//! Never fails with an error value: every outcome, including transport
//! failures, is folded into a [`JsonResponse`] so callers can decide how
//! much of the failure to surface.

use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::error::{FetchError, Result};

/// Characters of a non-JSON body kept for diagnostics
const BODY_PREVIEW_CHARS: usize = 300;

/// Outcome of one GET
#[derive(Debug, Clone, PartialEq)]
pub struct JsonResponse {
    /// HTTP status, 0 when no response was received
    pub status: u16,
    pub body: std::result::Result<Value, FetchError>,
}

impl JsonResponse {
    fn transport_failure(error: impl std::fmt::Display) -> Self {
        Self {
            status: 0,
            body: Err(FetchError::RequestException(error.to_string())),
        }
    }
}

/// Shared HTTP client that identifies itself with a fixed user agent
#[derive(Debug, Clone)]
pub struct MarketClient {
    http: Client,
}

impl MarketClient {
    pub fn new(user_agent: &str) -> Result<Self> {
        let http = Client::builder().user_agent(user_agent).build()?;
        Ok(Self { http })
    }

    /// GET `url` with `query` appended and decode the body as JSON.
    ///
    /// `timeout` covers connecting, sending and reading the whole body.
    pub async fn fetch_json(
        &self,
        url: &str,
        query: &[(&str, &str)],
        timeout: Duration,
    ) -> JsonResponse {
        let response = match self.http.get(url).query(query).timeout(timeout).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(%url, error = %e, "Request failed");
                return JsonResponse::transport_failure(e);
            }
        };

        let status = response.status().as_u16();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                debug!(%url, status, error = %e, "Reading response body failed");
                return JsonResponse::transport_failure(e);
            }
        };

        match serde_json::from_str::<Value>(&text) {
            Ok(body) => JsonResponse {
                status,
                body: Ok(body),
            },
            Err(_) => {
                debug!(%url, status, "Response body is not JSON");
                JsonResponse {
                    status,
                    body: Err(FetchError::NonJsonResponse {
                        status,
                        body: text.chars().take(BODY_PREVIEW_CHARS).collect(),
                    }),
                }
            }
        }
    }
}
