//! In-memory state behind the request gate
//!
//! Two maps: last admitted request per client identity, and scan results
//! per threshold key. Nothing survives a restart.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::types::VolatilityResult;

/// Map sizes above which stale entries are swept on write
const SWEEP_THRESHOLD: usize = 1024;

#[derive(Debug, Clone)]
struct CacheEntry {
    stored_at: Instant,
    results: Arc<[VolatilityResult]>,
}

#[derive(Default)]
pub struct ScanStore {
    last_admitted: Mutex<HashMap<String, Instant>>,
    cache: Mutex<HashMap<String, CacheEntry>>,
    scan_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl ScanStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit `identity` at `now` unless it was admitted less than `cooldown` ago.
    ///
    /// Check and update happen under one lock, so two simultaneous requests
    /// from the same identity cannot both pass. A rejected request does not
    /// move the window. Returns the time left on rejection.
    pub fn try_admit(
        &self,
        identity: &str,
        now: Instant,
        cooldown: Duration,
    ) -> Result<(), Duration> {
        let mut last_admitted = self.last_admitted.lock();

        if let Some(last) = last_admitted.get(identity) {
            let elapsed = now.saturating_duration_since(*last);
            if elapsed < cooldown {
                return Err(cooldown - elapsed);
            }
        }

        if last_admitted.len() >= SWEEP_THRESHOLD {
            last_admitted.retain(|_, last| now.saturating_duration_since(*last) < cooldown);
        }
        last_admitted.insert(identity.to_string(), now);
        Ok(())
    }

    /// Cached results for `key` if stored no more than `ttl` before `now`.
    pub fn cached(
        &self,
        key: &str,
        now: Instant,
        ttl: Duration,
    ) -> Option<Arc<[VolatilityResult]>> {
        let cache = self.cache.lock();
        let entry = cache.get(key)?;

        (now.saturating_duration_since(entry.stored_at) <= ttl).then(|| Arc::clone(&entry.results))
    }

    /// Store results for `key`, replacing any previous entry.
    pub fn insert(
        &self,
        key: impl Into<String>,
        stored_at: Instant,
        results: Arc<[VolatilityResult]>,
        ttl: Duration,
    ) {
        let mut cache = self.cache.lock();

        if cache.len() >= SWEEP_THRESHOLD {
            cache.retain(|_, entry| stored_at.saturating_duration_since(entry.stored_at) <= ttl);
        }
        cache.insert(key.into(), CacheEntry { stored_at, results });
    }

    /// Lock serializing fresh scans for one key
    pub fn scan_lock(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.scan_locks.lock();
        Arc::clone(locks.entry(key.to_string()).or_default())
    }

    /// Drop the scan lock for `key` once no other request holds or awaits it.
    pub fn release_scan_lock(&self, key: &str, lock: &Arc<tokio::sync::Mutex<()>>) {
        let mut locks = self.scan_locks.lock();

        // One reference in the map, one held by the caller.
        if Arc::strong_count(lock) <= 2 {
            if let Some(existing) = locks.get(key) {
                if Arc::ptr_eq(existing, lock) {
                    locks.remove(key);
                }
            }
        }
    }

    pub fn tracked_clients(&self) -> usize {
        self.last_admitted.lock().len()
    }

    pub fn cached_keys(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn pending_scans(&self) -> usize {
        self.scan_locks.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CandleLabel;

    fn results(symbol: &str) -> Arc<[VolatilityResult]> {
        vec![VolatilityResult {
            symbol: symbol.to_string(),
            candle: CandleLabel::Current,
            price: 1.0,
            high: 1.1,
            low: 1.0,
            volatility_pct: 10.0,
            change_pct: 0.0,
        }]
        .into()
    }

    #[test]
    fn test_cooldown_window() {
        let store = ScanStore::new();
        let cooldown = Duration::from_secs(10);
        let t0 = Instant::now();

        assert!(store.try_admit("1.2.3.4", t0, cooldown).is_ok());

        let remaining = store
            .try_admit("1.2.3.4", t0 + Duration::from_secs(3), cooldown)
            .unwrap_err();
        assert_eq!(remaining, Duration::from_secs(7));

        // Rejections do not extend the window.
        assert!(store.try_admit("1.2.3.4", t0 + Duration::from_secs(10), cooldown).is_ok());
    }

    #[test]
    fn test_cooldown_is_per_identity() {
        let store = ScanStore::new();
        let cooldown = Duration::from_secs(10);
        let t0 = Instant::now();

        assert!(store.try_admit("a", t0, cooldown).is_ok());
        assert!(store.try_admit("b", t0, cooldown).is_ok());
        assert!(store.try_admit("a", t0, cooldown).is_err());
        assert_eq!(store.tracked_clients(), 2);
    }

    #[test]
    fn test_cache_ttl_inclusive() {
        let store = ScanStore::new();
        let ttl = Duration::from_secs(90);
        let t0 = Instant::now();

        store.insert("3.0000", t0, results("BTCUSDT"), ttl);

        assert!(store.cached("3.0000", t0 + ttl, ttl).is_some());
        assert!(store.cached("3.0000", t0 + ttl + Duration::from_millis(1), ttl).is_none());
        assert!(store.cached("2.0000", t0, ttl).is_none());
    }

    #[test]
    fn test_insert_replaces_entry() {
        let store = ScanStore::new();
        let ttl = Duration::from_secs(90);
        let t0 = Instant::now();

        store.insert("1.0000", t0, results("OLDUSDT"), ttl);
        store.insert("1.0000", t0 + Duration::from_secs(100), results("NEWUSDT"), ttl);

        let cached = store.cached("1.0000", t0 + Duration::from_secs(100), ttl).unwrap();
        assert_eq!(cached[0].symbol, "NEWUSDT");
        assert_eq!(store.cached_keys(), 1);
    }

    #[test]
    fn test_stale_clients_swept() {
        let store = ScanStore::new();
        let cooldown = Duration::from_secs(10);
        let t0 = Instant::now();

        for i in 0..SWEEP_THRESHOLD {
            store.try_admit(&format!("10.0.0.{}", i), t0, cooldown).unwrap();
        }
        store
            .try_admit("late", t0 + Duration::from_secs(11), cooldown)
            .unwrap();

        assert_eq!(store.tracked_clients(), 1);
    }

    #[tokio::test]
    async fn test_scan_lock_shared_and_released() {
        let store = ScanStore::new();

        let first = store.scan_lock("3.0000");
        let second = store.scan_lock("3.0000");
        assert!(Arc::ptr_eq(&first, &second));

        store.release_scan_lock("3.0000", &first);
        assert_eq!(store.pending_scans(), 1);

        drop(second);
        store.release_scan_lock("3.0000", &first);
        assert_eq!(store.pending_scans(), 0);
    }
}
