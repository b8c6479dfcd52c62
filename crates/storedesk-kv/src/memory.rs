//! In-process cache backend

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::info;

use crate::backend::{KeyPattern, KvBackend};
use crate::error::KvError;

struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// HashMap-backed store with per-key expiry.
///
/// Expired keys are dropped lazily when touched or scanned. Expiry follows
/// the tokio clock.
#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        info!("Initialized in-memory cache backend");
        Self::default()
    }

    /// Live (unexpired) key count
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .values()
            .filter(|e| !e.is_expired(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl KvBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn connect(&self) -> Result<(), KvError> {
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), KvError> {
        let entry = Entry {
            value: value.to_string(),
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        };
        self.entries.lock().insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<u64, KvError> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        let removed = keys
            .iter()
            .filter_map(|key| entries.remove(key))
            .filter(|entry| !entry.is_expired(now))
            .count();
        Ok(removed as u64)
    }

    async fn scan(&self, pattern: &str) -> Result<Vec<String>, KvError> {
        let now = Instant::now();
        let matcher = KeyPattern::compile(pattern);
        let mut entries = self.entries.lock();
        entries.retain(|_, entry| !entry.is_expired(now));

        let mut keys: Vec<String> = entries
            .keys()
            .filter(|key| matcher.matches(key))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_delete() {
        let backend = MemoryBackend::new();
        backend.set("uom:items", "[]", None).await.unwrap();

        assert_eq!(backend.get("uom:items").await.unwrap().as_deref(), Some("[]"));
        assert_eq!(backend.get("uom:other").await.unwrap(), None);

        let removed = backend
            .delete(&["uom:items".to_string(), "uom:other".to_string()])
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert!(backend.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_follows_tokio_clock() {
        let backend = MemoryBackend::new();
        backend
            .set("po:pending", "{}", Some(Duration::from_secs(180)))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(179)).await;
        assert!(backend.get("po:pending").await.unwrap().is_some());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(backend.get("po:pending").await.unwrap().is_none());
        assert_eq!(backend.len(), 0);
    }

    #[tokio::test]
    async fn test_scan_by_pattern() {
        let backend = MemoryBackend::new();
        for key in ["po:pending", "po:history", "indent:pending"] {
            backend.set(key, "1", None).await.unwrap();
        }

        let keys = backend.scan("po:*").await.unwrap();
        assert_eq!(keys, vec!["po:history", "po:pending"]);
        assert!(backend.scan("gatepass:*").await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_scan_skips_expired() {
        let backend = MemoryBackend::new();
        backend
            .set("gatepass:counts", "1", Some(Duration::from_secs(1)))
            .await
            .unwrap();
        backend.set("gatepass:pending", "1", None).await.unwrap();

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(backend.scan("gatepass:*").await.unwrap(), vec!["gatepass:pending"]);
    }
}
