//! Cache-aside orchestration

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

use super::client::CacheClient;

/// Hit/miss counters since startup
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Background writes that did not reach the cache
    pub write_failures: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total > 0 {
            self.hits as f64 / total as f64
        } else {
            0.0
        }
    }
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    write_failures: AtomicU64,
}

/// Read-through cache in front of an async computation.
///
/// Concurrent misses on the same key each run their computation; there is
/// no per-key coalescing.
pub struct CacheAside {
    client: Arc<CacheClient>,
    writes: TaskTracker,
    counters: Arc<Counters>,
}

impl CacheAside {
    pub fn new(client: Arc<CacheClient>) -> Self {
        Self {
            client,
            writes: TaskTracker::new(),
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn client(&self) -> &Arc<CacheClient> {
        &self.client
    }

    /// Return the cached value for `key`, or run `compute`, return its
    /// result and store it in the background.
    ///
    /// Errors from `compute` are returned as-is and nothing is cached. The
    /// cache itself can never make this fail.
    pub async fn get_or_compute<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        compute: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(raw) = self.client.get(key).await {
            match serde_json::from_str::<T>(&raw) {
                Ok(value) => {
                    self.counters.hits.fetch_add(1, Ordering::Relaxed);
                    metrics::counter!("storedesk_cache_hits_total").increment(1);
                    debug!("Cache hit: {}", key);
                    return Ok(value);
                }
                Err(e) => warn!("Ignoring unreadable cache entry {}: {}", key, e),
            }
        }

        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("storedesk_cache_misses_total").increment(1);
        debug!("Cache miss: {}", key);

        let value = compute().await?;
        self.store(key, &value, ttl);
        Ok(value)
    }

    /// Queue a background write. Null results and a dead cache are skipped.
    fn store<T: Serialize>(&self, key: &str, value: &T, ttl: Option<Duration>) {
        if !self.client.is_live() {
            return;
        }

        let payload = match serde_json::to_string(value) {
            Ok(payload) if payload == "null" => return,
            Ok(payload) => payload,
            Err(e) => {
                warn!("Failed to serialize value for {}: {}", key, e);
                self.record_write_failure();
                return;
            }
        };

        let client = self.client.clone();
        let counters = self.counters.clone();
        let key = key.to_string();
        self.writes.spawn(async move {
            if !client.set(&key, &payload, ttl).await {
                counters.write_failures.fetch_add(1, Ordering::Relaxed);
                metrics::counter!("storedesk_cache_write_failures_total").increment(1);
                debug!("Background cache write for {} failed", key);
            }
        });
    }

    fn record_write_failure(&self) {
        self.counters.write_failures.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("storedesk_cache_write_failures_total").increment(1);
    }

    /// Wait for queued background writes to finish
    pub async fn flush(&self) {
        self.writes.close();
        self.writes.wait().await;
        self.writes.reopen();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            write_failures: self.counters.write_failures.load(Ordering::Relaxed),
        }
    }
}
