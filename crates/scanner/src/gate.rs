//! Request gate in front of the scan pipeline
//!
//! Order of checks for every request:
//!
//! 1. Threshold must lie in `[0, 100]`.
//! 2. Per-client cooldown. Admission is recorded before any upstream call.
//! 3. Cache lookup keyed by the threshold rounded to four decimals.
//! 4. Fresh scan. Concurrent misses on the same key share one scan.

use observability::{ScanMetrics, ScanOutcome};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::error::GateError;
use crate::pipeline::ScanPipeline;
use crate::store::ScanStore;
use crate::types::{ScanRequest, VolatilityResult};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateSettings {
    /// How long results for one threshold are served without rescanning
    pub cache_ttl: Duration,
    /// Minimum spacing between admitted requests from one client
    pub cooldown: Duration,
}

impl GateSettings {
    pub fn from_config(config: &config::GateConfig) -> Self {
        Self {
            cache_ttl: Duration::from_secs(config.cache_ttl_seconds),
            cooldown: Duration::from_secs(config.cooldown_seconds),
        }
    }
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(90),
            cooldown: Duration::from_secs(10),
        }
    }
}

/// Results handed back for an admitted request
#[derive(Debug, Clone)]
pub struct ScanOutput {
    pub results: Arc<[VolatilityResult]>,
    /// Served from the cache rather than a scan made for this request
    pub cached: bool,
}

/// Cache key for a threshold: four decimal places
pub fn threshold_key(threshold_pct: f64) -> String {
    // Adding zero folds -0.0 into 0.0.
    format!("{:.4}", threshold_pct + 0.0)
}

/// Whole seconds to tell a rate-limited client, never less than one
pub fn wait_secs(remaining: Duration) -> u64 {
    (remaining.as_secs_f64().ceil() as u64).max(1)
}

#[derive(Clone)]
pub struct ScanGate {
    pipeline: Arc<ScanPipeline>,
    store: Arc<ScanStore>,
    clock: Arc<dyn Clock>,
    settings: GateSettings,
    metrics: ScanMetrics,
}

impl ScanGate {
    pub fn new(pipeline: ScanPipeline, settings: GateSettings) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            store: Arc::new(ScanStore::new()),
            clock: Arc::new(SystemClock),
            settings,
            metrics: ScanMetrics::new(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_store(mut self, store: Arc<ScanStore>) -> Self {
        self.store = store;
        self
    }

    pub fn settings(&self) -> GateSettings {
        self.settings
    }

    pub fn store(&self) -> &ScanStore {
        &self.store
    }

    /// Admit, serve from cache, or scan.
    ///
    /// A fresh scan runs on its own task. Dropping the returned future stops
    /// the wait, not the scan: the results still land in the cache.
    ///
    /// # Errors
    ///
    /// - [`GateError::InvalidThreshold`] before any state is touched
    /// - [`GateError::RateLimited`] inside the client's cooldown
    /// - [`GateError::Upstream`] when the ticker listing fails; nothing is cached
    /// - [`GateError::ScanInterrupted`] when the runtime cancels the scan task
    pub async fn handle(&self, request: &ScanRequest) -> Result<ScanOutput, GateError> {
        let threshold = request.threshold_pct;
        if !(0.0..=100.0).contains(&threshold) {
            return Err(GateError::InvalidThreshold(threshold));
        }

        let now = self.clock.now();
        if let Err(remaining) = self
            .store
            .try_admit(&request.client_identity, now, self.settings.cooldown)
        {
            let wait_secs = wait_secs(remaining);
            self.metrics.record_outcome(ScanOutcome::RateLimited);
            debug!(client = %request.client_identity, wait_secs, "Request inside cooldown");
            return Err(GateError::RateLimited { wait_secs });
        }

        let key = threshold_key(threshold);
        if let Some(results) = self.store.cached(&key, now, self.settings.cache_ttl) {
            return Ok(self.cache_hit(&key, results));
        }

        let gate = self.clone();
        let scan = tokio::spawn(async move { gate.scan_once(key, now, threshold).await });

        match scan.await {
            Ok(output) => output,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(_) => Err(GateError::ScanInterrupted),
        }
    }

    /// Scan for `key` unless a concurrent request already filled it.
    async fn scan_once(
        &self,
        key: String,
        started: Instant,
        threshold: f64,
    ) -> Result<ScanOutput, GateError> {
        let lock = ScanLockGuard::acquire(Arc::clone(&self.store), &key);
        let _held = Arc::clone(&lock.lock).lock_owned().await;

        // Another request may have filled the entry while this one waited.
        match self.store.cached(&key, self.clock.now(), self.settings.cache_ttl) {
            Some(results) => Ok(self.cache_hit(&key, results)),
            None => self.scan_and_store(&key, started, threshold).await,
        }
    }

    fn cache_hit(&self, key: &str, results: Arc<[VolatilityResult]>) -> ScanOutput {
        self.metrics.record_outcome(ScanOutcome::CacheHit);
        debug!(key, results = results.len(), "Serving cached scan");
        ScanOutput {
            results,
            cached: true,
        }
    }

    async fn scan_and_store(
        &self,
        key: &str,
        started: Instant,
        threshold: f64,
    ) -> Result<ScanOutput, GateError> {
        match self.pipeline.scan(threshold).await {
            Ok(results) => {
                let results: Arc<[VolatilityResult]> = results.into();
                self.store
                    .insert(key, started, Arc::clone(&results), self.settings.cache_ttl);
                self.metrics.record_outcome(ScanOutcome::CacheMiss);
                info!(key, results = results.len(), "Cached fresh scan");
                Ok(ScanOutput {
                    results,
                    cached: false,
                })
            }
            Err(e) => {
                self.metrics.record_outcome(ScanOutcome::UpstreamError);
                Err(GateError::Upstream(e))
            }
        }
    }
}

/// Per-key scan lock, released back to the store on drop
struct ScanLockGuard {
    store: Arc<ScanStore>,
    key: String,
    lock: Arc<tokio::sync::Mutex<()>>,
}

impl ScanLockGuard {
    fn acquire(store: Arc<ScanStore>, key: &str) -> Self {
        let lock = store.scan_lock(key);
        Self {
            store,
            key: key.to_string(),
            lock,
        }
    }
}

impl Drop for ScanLockGuard {
    fn drop(&mut self) {
        self.store.release_scan_lock(&self.key, &self.lock);
    }
}
