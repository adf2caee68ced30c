//! Time-to-live request cache.
//!
//! Wraps an async producer and returns the stored value while it is fresh.
//! Entries are only ever replaced by a successful producer call, so a
//! failed refresh leaves the previous value in place. Expired entries are
//! dropped whenever a new value is stored. Concurrent callers
//! that miss on the same key share a single producer call.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Default freshness window when a caller does not pick one.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// A stored producer result.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub stored_at: Instant,
    pub ttl: Duration,
    generation: u64,
}

impl<V> CacheEntry<V> {
    /// Fresh iff `now < stored_at + ttl`.
    pub fn is_fresh(&self, now: Instant) -> bool {
        match self.stored_at.checked_add(self.ttl) {
            Some(expires_at) => now < expires_at,
            None => true,
        }
    }
}

/// Per-call cache policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallOptions {
    pub ttl: Duration,
    pub force_refresh: bool,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            force_refresh: false,
        }
    }
}

impl CallOptions {
    pub fn ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            force_refresh: false,
        }
    }

    pub fn force_refresh(mut self, force: bool) -> Self {
        self.force_refresh = force;
        self
    }
}

/// Session-scoped key/value cache with TTL expiry.
#[derive(Debug)]
pub struct RequestCache<V = Value> {
    entries: DashMap<String, CacheEntry<V>>,
    in_flight: DashMap<String, Arc<Mutex<()>>>,
    generation: AtomicU64,
}

impl<V> Default for RequestCache<V> {
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
            in_flight: DashMap::new(),
            generation: AtomicU64::new(0),
        }
    }
}

impl<V: Clone> RequestCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored value for `key` if it is still fresh.
    pub fn get(&self, key: &str) -> Option<V> {
        let entry = self.entries.get(key)?;
        entry.is_fresh(Instant::now()).then(|| entry.value.clone())
    }

    /// Store `value` under `key`, replacing any previous entry.
    ///
    /// Expired entries under other keys are dropped at the same time, so
    /// date-scoped keys do not pile up in a long-running process.
    pub fn set(&self, key: &str, value: V, ttl: Duration) {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_fresh(now));
        let pruned = before.saturating_sub(self.entries.len());
        if pruned > 0 {
            debug!(pruned, "Expired cache entries dropped");
        }

        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                stored_at: now,
                ttl,
                generation,
            },
        );
    }

    /// Remove a single entry. Returns whether one was present.
    pub fn invalidate(&self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            debug!(key, "Cache entry invalidated");
        }
        removed
    }

    /// Remove `prefix` and every key of the form `prefix_...`.
    ///
    /// `dashboard_leaves` matches `dashboard_leaves_pending` but not
    /// `dashboard_leavesets`.
    pub fn invalidate_resource(&self, prefix: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !belongs_to(key, prefix));
        let removed = before.saturating_sub(self.entries.len());
        debug!(prefix, removed, "Cache resource invalidated");
        removed
    }

    /// Number of stored entries, fresh or stale.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return the cached value for `key`, or run `producer` and store its
    /// result.
    ///
    /// `producer` is not invoked on a fresh hit. Its error is returned as-is
    /// and never overwrites an existing entry. With `force_refresh` the
    /// freshness check is skipped, but a value produced by a concurrent
    /// caller while this one waited is still shared.
    pub async fn cached_call<F, Fut, E>(
        &self,
        key: &str,
        options: CallOptions,
        producer: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if !options.force_refresh {
            if let Some(value) = self.get(key) {
                debug!(key, "Cache hit");
                return Ok(value);
            }
        }

        let seen = self.generation_of(key);
        let lock = Arc::clone(&self.in_flight.entry(key.to_string()).or_default());
        let guard = lock.lock().await;

        let result = match self.produced_while_waiting(key, seen) {
            Some(value) => {
                debug!(key, "Cache filled by concurrent caller");
                Ok(value)
            }
            None => {
                debug!(key, force = options.force_refresh, "Cache miss");
                match producer().await {
                    Ok(value) => {
                        self.set(key, value.clone(), options.ttl);
                        Ok(value)
                    }
                    Err(e) => Err(e),
                }
            }
        };

        drop(guard);
        drop(lock);
        self.in_flight
            .remove_if(key, |_, lock| Arc::strong_count(lock) == 1);
        result
    }

    fn generation_of(&self, key: &str) -> Option<u64> {
        self.entries.get(key).map(|e| e.generation)
    }

    fn produced_while_waiting(&self, key: &str, seen: Option<u64>) -> Option<V> {
        let entry = self.entries.get(key)?;
        (Some(entry.generation) != seen && entry.is_fresh(Instant::now()))
            .then(|| entry.value.clone())
    }
}

fn belongs_to(key: &str, prefix: &str) -> bool {
    match key.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('_'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    const TTL: Duration = Duration::from_secs(60);

    async fn call(
        cache: &RequestCache<u32>,
        calls: &AtomicUsize,
        key: &str,
        options: CallOptions,
        result: Result<u32, &'static str>,
    ) -> Result<u32, &'static str> {
        cache
            .cached_call(key, options, move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                result
            })
            .await
    }

    #[tokio::test(start_paused = true)]
    async fn second_call_within_ttl_is_served_from_cache() {
        let cache = RequestCache::new();
        let calls = AtomicUsize::new(0);

        let first = call(&cache, &calls, "dashboard_users", CallOptions::ttl(TTL), Ok(1)).await;
        let second = call(&cache, &calls, "dashboard_users", CallOptions::ttl(TTL), Ok(2)).await;

        assert_eq!(first, Ok(1));
        assert_eq!(second, Ok(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entry_is_refetched_and_overwritten() {
        let cache = RequestCache::new();
        let calls = AtomicUsize::new(0);

        call(&cache, &calls, "k", CallOptions::ttl(TTL), Ok(1)).await.unwrap();
        tokio::time::advance(TTL).await;
        let refreshed = call(&cache, &calls, "k", CallOptions::ttl(TTL), Ok(2)).await;

        assert_eq!(refreshed, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.get("k"), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_refresh_keeps_last_good_value() {
        let cache = RequestCache::new();
        let calls = AtomicUsize::new(0);

        call(&cache, &calls, "k", CallOptions::ttl(TTL), Ok(7)).await.unwrap();
        let forced = CallOptions::ttl(TTL).force_refresh(true);
        let failed = call(&cache, &calls, "k", forced, Err("backend down")).await;
        assert_eq!(failed, Err("backend down"));

        let after = call(&cache, &calls, "k", CallOptions::ttl(TTL), Ok(99)).await;
        assert_eq!(after, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_refresh_of_stale_entry_does_not_remove_it() {
        let cache = RequestCache::new();
        let calls = AtomicUsize::new(0);

        call(&cache, &calls, "k", CallOptions::ttl(TTL), Ok(1)).await.unwrap();
        tokio::time::advance(TTL * 2).await;
        assert!(call(&cache, &calls, "k", CallOptions::ttl(TTL), Err("boom")).await.is_err());

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("k"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn force_refresh_bypasses_fresh_entry() {
        let cache = RequestCache::new();
        let calls = AtomicUsize::new(0);

        call(&cache, &calls, "k", CallOptions::ttl(TTL), Ok(1)).await.unwrap();
        let forced = CallOptions::ttl(TTL).force_refresh(true);
        let refreshed = call(&cache, &calls, "k", forced, Ok(2)).await;

        assert_eq!(refreshed, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_ttl_is_never_fresh() {
        let cache = RequestCache::new();
        let calls = AtomicUsize::new(0);

        call(&cache, &calls, "k", CallOptions::ttl(Duration::ZERO), Ok(1)).await.unwrap();
        call(&cache, &calls, "k", CallOptions::ttl(Duration::ZERO), Ok(2)).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_misses_share_one_producer_call() {
        let cache = RequestCache::new();
        let counter = AtomicUsize::new(0);
        let calls = &counter;

        let slow = move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok::<_, &'static str>(5)
        };

        let (a, b) = tokio::join!(
            cache.cached_call("k", CallOptions::ttl(TTL), slow),
            cache.cached_call("k", CallOptions::ttl(TTL), slow),
        );

        assert_eq!(a, Ok(5));
        assert_eq!(b, Ok(5));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn invalidate_resource_matches_parameterized_keys_only() {
        let cache = RequestCache::new();
        for key in [
            "dashboard_leaves",
            "dashboard_leaves_pending",
            "dashboard_leaves_approved",
            "dashboard_leavesets",
            "dashboard_users",
        ] {
            cache.set(key, 0u32, TTL);
        }

        let removed = cache.invalidate_resource("dashboard_leaves");

        assert_eq!(removed, 3);
        assert_eq!(cache.len(), 2);
        assert!(cache.get("dashboard_users").is_some());
        assert!(cache.get("dashboard_leavesets").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn storing_a_value_drops_expired_entries() {
        let cache = RequestCache::new();
        cache.set("dashboard_attendance_2024-05-01", 1u32, TTL);
        cache.set("dashboard_users", 2u32, TTL * 10);

        tokio::time::advance(TTL * 2).await;
        cache.set("dashboard_attendance_2024-05-02", 3u32, TTL);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("dashboard_users"), Some(2));
        assert!(!cache.invalidate("dashboard_attendance_2024-05-01"));
    }

    #[test]
    fn invalidate_missing_key_is_a_no_op() {
        let cache = RequestCache::<u32>::new();
        assert!(!cache.invalidate("dashboard_users"));

        cache.set("dashboard_users", 1, TTL);
        assert!(cache.invalidate("dashboard_users"));
        assert!(cache.is_empty());
    }
}
