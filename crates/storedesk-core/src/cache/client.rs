//! Shared cache client that absorbs transport failures

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use storedesk_kv::{KvBackend, KvError, is_pattern};
use tracing::{debug, info, warn};

/// Timeouts and reconnect backoff for the cache client
#[derive(Debug, Clone)]
pub struct CacheClientConfig {
    /// Bound on every get/set/delete
    pub op_timeout: Duration,
    pub reconnect_attempts: u32,
    pub reconnect_base_delay: Duration,
    pub reconnect_max_delay: Duration,
}

impl Default for CacheClientConfig {
    fn default() -> Self {
        Self {
            op_timeout: Duration::from_secs(1),
            reconnect_attempts: 3,
            reconnect_base_delay: Duration::from_millis(100),
            reconnect_max_delay: Duration::from_secs(1),
        }
    }
}

/// Cache handle that never surfaces a transport error.
///
/// Reads degrade to `None`, writes to `false` and deletes to `0`. While the
/// client is not live every operation short-circuits without touching the
/// backend. The first failure of a streak is logged at `warn`, the rest at
/// `debug`; the streak ends on the next success.
pub struct CacheClient {
    backend: Option<Arc<dyn KvBackend>>,
    config: CacheClientConfig,
    live: AtomicBool,
    error_logged: AtomicBool,
}

impl CacheClient {
    pub fn new(backend: Arc<dyn KvBackend>, config: CacheClientConfig) -> Self {
        Self {
            backend: Some(backend),
            config,
            live: AtomicBool::new(false),
            error_logged: AtomicBool::new(false),
        }
    }

    /// A client for deployments without a cache; every call is a miss
    pub fn disabled() -> Self {
        Self {
            backend: None,
            config: CacheClientConfig::default(),
            live: AtomicBool::new(false),
            error_logged: AtomicBool::new(false),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.as_ref().map_or("none", |b| b.name())
    }

    /// Connect with capped exponential backoff. Returns whether the client
    /// is live afterwards; gives up quietly after the last attempt.
    pub async fn connect(&self) -> bool {
        let Some(backend) = self.backend.as_ref() else {
            return false;
        };

        let attempts = self.config.reconnect_attempts.max(1);
        let mut delay = self.config.reconnect_base_delay;

        for attempt in 1..=attempts {
            match backend.connect().await {
                Ok(()) => {
                    self.record_success();
                    return true;
                }
                Err(e) => {
                    self.record_failure("connect", &e);
                    if attempt < attempts {
                        debug!(
                            "Cache connect attempt {}/{} failed, retrying in {:?}",
                            attempt, attempts, delay
                        );
                        tokio::time::sleep(delay).await;
                        delay = (delay * 2).min(self.config.reconnect_max_delay);
                    }
                }
            }
        }

        debug!("Giving up on cache connection after {} attempts", attempts);
        false
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        let backend = self.usable_backend()?;
        match self.bounded(backend.get(key)).await {
            Ok(value) => {
                self.record_success();
                value
            }
            Err(e) => {
                self.record_failure("get", &e);
                None
            }
        }
    }

    /// Store a value; `ttl = None` keeps it until invalidated
    pub async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> bool {
        let Some(backend) = self.usable_backend() else {
            return false;
        };
        match self.bounded(backend.set(key, value, ttl)).await {
            Ok(()) => {
                self.record_success();
                true
            }
            Err(e) => {
                self.record_failure("set", &e);
                false
            }
        }
    }

    /// Delete a key, or every key matching a glob pattern.
    ///
    /// Patterns are resolved with a scan and then deleted; keys written in
    /// between may survive.
    pub async fn delete(&self, key_or_pattern: &str) -> u64 {
        let Some(backend) = self.usable_backend() else {
            return 0;
        };

        let keys = if is_pattern(key_or_pattern) {
            match self.bounded(backend.scan(key_or_pattern)).await {
                Ok(keys) => keys,
                Err(e) => {
                    self.record_failure("scan", &e);
                    return 0;
                }
            }
        } else {
            vec![key_or_pattern.to_string()]
        };

        if keys.is_empty() {
            return 0;
        }

        match self.bounded(backend.delete(&keys)).await {
            Ok(count) => {
                self.record_success();
                count
            }
            Err(e) => {
                self.record_failure("delete", &e);
                0
            }
        }
    }

    fn usable_backend(&self) -> Option<&Arc<dyn KvBackend>> {
        self.backend.as_ref().filter(|_| self.is_live())
    }

    async fn bounded<T>(
        &self,
        op: impl Future<Output = Result<T, KvError>>,
    ) -> Result<T, KvError> {
        tokio::time::timeout(self.config.op_timeout, op)
            .await
            .map_err(|_| KvError::Timeout(self.config.op_timeout))?
    }

    fn record_success(&self) {
        if !self.live.swap(true, Ordering::SeqCst) {
            info!("Cache backend {} is live", self.backend_name());
        }
        self.error_logged.store(false, Ordering::SeqCst);
    }

    fn record_failure(&self, op: &str, err: &KvError) {
        self.live.store(false, Ordering::SeqCst);
        if self.error_logged.swap(true, Ordering::SeqCst) {
            debug!("Cache {} failed: {}", op, err);
        } else {
            warn!(
                "Cache {} failed, continuing without cache: {}",
                op, err
            );
        }
    }
}

/// Spawn a background task that tries to revive a dead cache connection
pub fn spawn_reconnect_task(
    client: Arc<CacheClient>,
    interval_secs: u64,
) -> tokio::task::JoinHandle<()> {
    use tokio::time::{Duration, interval};

    info!(
        "Starting cache reconnect task (interval: {} seconds)",
        interval_secs
    );

    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(interval_secs.max(1)));

        // Skip the first tick (which fires immediately)
        ticker.tick().await;

        loop {
            ticker.tick().await;
            if client.is_enabled() && !client.is_live() {
                debug!("Attempting to revive cache connection");
                if client.connect().await {
                    info!("Cache connection revived");
                }
            }
        }
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicU32;
    use storedesk_kv::MemoryBackend;

    /// Backend whose every call fails, counting connect attempts
    #[derive(Default)]
    pub(crate) struct FailingBackend {
        pub connects: AtomicU32,
    }

    #[async_trait]
    impl KvBackend for FailingBackend {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn connect(&self) -> Result<(), KvError> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            Err(KvError::Unavailable("connection refused".into()))
        }

        async fn get(&self, _key: &str) -> Result<Option<String>, KvError> {
            Err(KvError::Unavailable("connection reset".into()))
        }

        async fn set(&self, _: &str, _: &str, _: Option<Duration>) -> Result<(), KvError> {
            Err(KvError::Unavailable("connection reset".into()))
        }

        async fn delete(&self, _keys: &[String]) -> Result<u64, KvError> {
            Err(KvError::Unavailable("connection reset".into()))
        }

        async fn scan(&self, _pattern: &str) -> Result<Vec<String>, KvError> {
            Err(KvError::Unavailable("connection reset".into()))
        }
    }

    /// Connects fine, then fails or hangs on data operations
    pub(crate) struct BrokenAfterConnect {
        pub hang: bool,
    }

    #[async_trait]
    impl KvBackend for BrokenAfterConnect {
        fn name(&self) -> &'static str {
            "broken"
        }

        async fn connect(&self) -> Result<(), KvError> {
            Ok(())
        }

        async fn get(&self, _key: &str) -> Result<Option<String>, KvError> {
            if self.hang {
                std::future::pending::<()>().await;
            }
            Err(KvError::Unavailable("broken pipe".into()))
        }

        async fn set(&self, _: &str, _: &str, _: Option<Duration>) -> Result<(), KvError> {
            Err(KvError::Unavailable("broken pipe".into()))
        }

        async fn delete(&self, _keys: &[String]) -> Result<u64, KvError> {
            Err(KvError::Unavailable("broken pipe".into()))
        }

        async fn scan(&self, _pattern: &str) -> Result<Vec<String>, KvError> {
            Err(KvError::Unavailable("broken pipe".into()))
        }
    }

    pub(crate) async fn live_memory_client() -> Arc<CacheClient> {
        let client = Arc::new(CacheClient::new(
            Arc::new(MemoryBackend::new()),
            CacheClientConfig::default(),
        ));
        assert!(client.connect().await);
        client
    }

    #[tokio::test]
    async fn test_memory_client_round_trip() {
        let client = live_memory_client().await;
        assert!(client.is_live());
        assert_eq!(client.backend_name(), "memory");

        assert!(client.set("uom:items", "[1]", None).await);
        assert_eq!(client.get("uom:items").await.as_deref(), Some("[1]"));
        assert_eq!(client.delete("uom:items").await, 1);
        assert_eq!(client.get("uom:items").await, None);
    }

    #[tokio::test]
    async fn test_wildcard_delete() {
        let client = live_memory_client().await;
        client.set("domainA:x", "1", None).await;
        client.set("domainA:y", "2", None).await;
        client.set("domainB:x", "3", None).await;

        assert_eq!(client.delete("domainA:*").await, 2);
        assert_eq!(client.get("domainA:x").await, None);
        assert_eq!(client.get("domainB:x").await.as_deref(), Some("3"));
        assert_eq!(client.delete("domainA:*").await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_backs_off_then_gives_up() {
        let backend = Arc::new(FailingBackend::default());
        let client = CacheClient::new(backend.clone(), CacheClientConfig::default());

        let started = tokio::time::Instant::now();
        assert!(!client.connect().await);
        assert_eq!(backend.connects.load(Ordering::SeqCst), 3);
        // 100ms + 200ms between the three attempts
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(300) && elapsed < Duration::from_millis(320));
        assert!(!client.is_live());

        // Dead client short-circuits without reaching the backend
        assert_eq!(client.get("po:pending").await, None);
        assert!(!client.set("po:pending", "[]", None).await);
        assert_eq!(client.delete("po:*").await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_is_capped() {
        let backend = Arc::new(FailingBackend::default());
        let config = CacheClientConfig {
            reconnect_attempts: 6,
            ..Default::default()
        };
        let client = CacheClient::new(backend, config);

        let started = tokio::time::Instant::now();
        client.connect().await;
        // 100 + 200 + 400 + 800 + 1000
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(2500) && elapsed < Duration::from_millis(2550));
    }

    #[tokio::test]
    async fn test_operation_failure_flips_liveness() {
        let client = CacheClient::new(
            Arc::new(BrokenAfterConnect { hang: false }),
            CacheClientConfig::default(),
        );
        assert!(client.connect().await);

        assert_eq!(client.get("po:pending").await, None);
        assert!(!client.is_live());
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_operation_times_out() {
        let client = CacheClient::new(
            Arc::new(BrokenAfterConnect { hang: true }),
            CacheClientConfig::default(),
        );
        assert!(client.connect().await);

        assert_eq!(client.get("po:pending").await, None);
        assert!(!client.is_live());
    }

    #[tokio::test]
    async fn test_disabled_client() {
        let client = CacheClient::disabled();
        assert!(!client.is_enabled());
        assert!(!client.connect().await);
        assert_eq!(client.backend_name(), "none");
        assert_eq!(client.get("uom:items").await, None);
        assert!(!client.set("uom:items", "[]", None).await);
    }
}
