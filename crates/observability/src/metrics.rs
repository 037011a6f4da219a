//! Prometheus metrics for the scan pipeline
//!
//! Without an installed exporter every recording call is a no-op, so the
//! metric handles are safe to use in tests.

use metrics::{counter, gauge, histogram, Counter, Gauge, Histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

/// Start the Prometheus exporter; metrics are served at `http://0.0.0.0:{port}/metrics`.
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;

    PrometheusBuilder::new().with_http_listener(addr).install()?;

    tracing::info!(%addr, "Metrics server listening");
    Ok(())
}

/// How the gate resolved a scan request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    CacheHit,
    CacheMiss,
    RateLimited,
    UpstreamError,
}

impl ScanOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CacheHit => "cache_hit",
            Self::CacheMiss => "cache_miss",
            Self::RateLimited => "rate_limited",
            Self::UpstreamError => "upstream_error",
        }
    }
}

/// Metric handles for one scanner instance
///
/// * `volscan_requests_total{outcome}` - gate decisions
/// * `volscan_scan_duration_seconds` - wall time of fresh scans
/// * `volscan_eligible_symbols` - symbols dispatched by the last scan
/// * `volscan_symbol_failures_total` - per-symbol fetches dropped
/// * `volscan_results` - qualifying symbols in the last scan
#[derive(Clone)]
pub struct ScanMetrics {
    scan_duration: Histogram,
    eligible_symbols: Gauge,
    results: Gauge,
    symbol_failures: Counter,
}

impl ScanMetrics {
    pub fn new() -> Self {
        Self {
            scan_duration: histogram!("volscan_scan_duration_seconds"),
            eligible_symbols: gauge!("volscan_eligible_symbols"),
            results: gauge!("volscan_results"),
            symbol_failures: counter!("volscan_symbol_failures_total"),
        }
    }

    pub fn record_outcome(&self, outcome: ScanOutcome) {
        counter!("volscan_requests_total", "outcome" => outcome.as_str()).increment(1);
    }

    /// Record a completed fresh scan
    pub fn record_scan(&self, duration: Duration, eligible: usize, results: usize) {
        self.scan_duration.record(duration.as_secs_f64());
        self.eligible_symbols.set(eligible as f64);
        self.results.set(results as f64);
    }

    /// Symbols dropped from a scan because their candles could not be fetched
    pub fn symbols_failed(&self, count: usize) {
        self.symbol_failures.increment(count as u64);
    }
}

impl Default for ScanMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_exporter() {
        let metrics = ScanMetrics::new();
        metrics.record_outcome(ScanOutcome::CacheHit);
        metrics.record_scan(Duration::from_millis(250), 120, 7);
        metrics.symbols_failed(3);
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(ScanOutcome::CacheHit.as_str(), "cache_hit");
        assert_eq!(ScanOutcome::CacheMiss.as_str(), "cache_miss");
        assert_eq!(ScanOutcome::RateLimited.as_str(), "rate_limited");
        assert_eq!(ScanOutcome::UpstreamError.as_str(), "upstream_error");
    }
}
