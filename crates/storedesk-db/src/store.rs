//! Backend stores, their pools, and borrowed connections

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use sqlx::any::{AnyPoolOptions, AnyRow};
use sqlx::pool::PoolConnection;
use sqlx::{Any, AnyConnection, AnyPool};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::DbError;

/// Identifies one of the two relational backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreId {
    /// Analytical / legacy reporting store
    Analytics,
    /// Transactional store
    Transactional,
}

impl StoreId {
    pub const ALL: [StoreId; 2] = [StoreId::Analytics, StoreId::Transactional];

    pub fn as_str(&self) -> &'static str {
        match self {
            StoreId::Analytics => "analytics",
            StoreId::Transactional => "transactional",
        }
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection and pool sizing settings for one store
#[derive(Debug, Clone)]
pub struct StoreSettings {
    /// Connection URL; `None` or empty means the store is not configured
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Force TLS on or off; inferred from the host when unset
    pub ssl: Option<bool>,
    pub min_connections: u32,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Option<Duration>,
    pub statement_cache_size: usize,
    /// Acquisitions slower than this are logged
    pub slow_acquire_threshold: Duration,
}

impl StoreSettings {
    /// Defaults for the analytics store
    pub fn analytics() -> Self {
        Self {
            url: None,
            username: None,
            password: None,
            ssl: None,
            min_connections: 2,
            max_connections: 20,
            acquire_timeout: Duration::from_secs(60),
            idle_timeout: Some(Duration::from_secs(60)),
            statement_cache_size: 50,
            slow_acquire_threshold: Duration::from_millis(100),
        }
    }

    /// Defaults for the transactional store
    pub fn transactional() -> Self {
        Self {
            url: None,
            username: None,
            password: None,
            ssl: None,
            min_connections: 0,
            max_connections: 10,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: Some(Duration::from_secs(30)),
            statement_cache_size: 100,
            slow_acquire_threshold: Duration::from_millis(100),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Whether enough is set to attempt a connection
    pub fn is_configured(&self) -> bool {
        self.url.as_deref().is_some_and(|u| !u.trim().is_empty())
    }

    /// Build the final connection URL, splicing in credentials and
    /// driver-specific options
    pub fn connection_url(&self) -> Result<String, DbError> {
        let raw = self
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| DbError::Configuration("missing connection url".to_string()))?;

        let mut url = Url::parse(raw)
            .map_err(|e| DbError::Configuration(format!("invalid connection url: {}", e)))?;

        if let Some(username) = self.username.as_deref() {
            url.set_username(username).map_err(|_| {
                DbError::Configuration("connection url cannot carry a username".to_string())
            })?;
        }
        if let Some(password) = self.password.as_deref() {
            url.set_password(Some(password)).map_err(|_| {
                DbError::Configuration("connection url cannot carry a password".to_string())
            })?;
        }

        if matches!(url.scheme(), "postgres" | "postgresql") {
            let ssl = self.ssl.unwrap_or_else(|| {
                url.host_str()
                    .is_some_and(|host| host.ends_with(".rds.amazonaws.com"))
            });
            let add_sslmode = ssl && !has_query_param(&url, "sslmode");
            let add_cache = !has_query_param(&url, "statement-cache-capacity");

            if add_sslmode || add_cache {
                let mut pairs = url.query_pairs_mut();
                if add_sslmode {
                    pairs.append_pair("sslmode", "require");
                }
                if add_cache {
                    pairs.append_pair(
                        "statement-cache-capacity",
                        &self.statement_cache_size.to_string(),
                    );
                }
            }
        }

        Ok(url.to_string())
    }
}

fn has_query_param(url: &Url, name: &str) -> bool {
    url.query_pairs().any(|(key, _)| key == name)
}

/// Render a connection URL with its password masked
pub(crate) fn redact_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) => {
            if url.password().is_some() && url.set_password(Some("***")).is_err() {
                return "<unredactable url>".to_string();
            }
            url.to_string()
        }
        Err(_) => "<invalid url>".to_string(),
    }
}

/// A pool created at most once, on first use
pub struct LazyPool {
    store: StoreId,
    settings: StoreSettings,
    cell: OnceCell<StorePool>,
}

impl LazyPool {
    pub fn new(store: StoreId, settings: StoreSettings) -> Self {
        Self {
            store,
            settings,
            cell: OnceCell::new(),
        }
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    /// The pool, if it has already been created
    pub fn get(&self) -> Option<&StorePool> {
        self.cell.get()
    }

    /// Return the pool, creating it if needed. Concurrent callers wait on
    /// a single creation; a failed creation leaves the cell empty so a later
    /// call retries.
    pub async fn get_or_init(&self) -> Result<StorePool, DbError> {
        self.cell
            .get_or_try_init(|| self.create())
            .await
            .cloned()
    }

    async fn create(&self) -> Result<StorePool, DbError> {
        let url = self.settings.connection_url()?;
        info!(
            "Creating {} pool (min: {}, max: {}, acquire timeout: {:?}) for {}",
            self.store,
            self.settings.min_connections,
            self.settings.max_connections,
            self.settings.acquire_timeout,
            redact_url(&url)
        );

        let pool = AnyPoolOptions::new()
            .min_connections(self.settings.min_connections)
            .max_connections(self.settings.max_connections)
            .acquire_timeout(self.settings.acquire_timeout)
            .idle_timeout(self.settings.idle_timeout)
            .connect(&url)
            .await
            .map_err(|e| {
                warn!("Failed to create {} pool: {}", self.store, e);
                DbError::acquire(self.store, e)
            })?;

        info!("{} pool started", self.store);
        Ok(StorePool {
            store: self.store,
            pool,
            in_use: Arc::new(AtomicUsize::new(0)),
            slow_acquire: self.settings.slow_acquire_threshold,
        })
    }
}

/// Handle to a live pool for one store
#[derive(Clone)]
pub struct StorePool {
    store: StoreId,
    pool: AnyPool,
    in_use: Arc<AtomicUsize>,
    slow_acquire: Duration,
}

impl StorePool {
    pub fn store(&self) -> StoreId {
        self.store
    }

    /// Borrow a connection; waits up to the configured acquire timeout
    pub async fn acquire(&self) -> Result<StoreConnection, DbError> {
        let start = Instant::now();
        let conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| DbError::acquire(self.store, e))?;

        let elapsed = start.elapsed();
        if elapsed > self.slow_acquire {
            warn!(
                "Acquiring a {} connection took {} ms",
                self.store,
                elapsed.as_millis()
            );
        }

        self.in_use.fetch_add(1, Ordering::SeqCst);
        Ok(StoreConnection {
            store: self.store,
            conn,
            in_use: Arc::clone(&self.in_use),
        })
    }

    /// Connections currently borrowed through this handle
    pub fn in_use(&self) -> usize {
        self.in_use.load(Ordering::SeqCst)
    }

    /// Open connections, idle or not
    pub fn size(&self) -> u32 {
        self.pool.size()
    }

    pub fn idle(&self) -> usize {
        self.pool.num_idle()
    }

    /// True when both handles refer to the same underlying pool
    pub fn ptr_eq(&self, other: &StorePool) -> bool {
        Arc::ptr_eq(&self.in_use, &other.in_use)
    }

    pub async fn close(&self) {
        debug!("Closing {} pool", self.store);
        self.pool.close().await;
    }
}

impl fmt::Debug for StorePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorePool")
            .field("store", &self.store)
            .field("size", &self.size())
            .field("in_use", &self.in_use())
            .finish_non_exhaustive()
    }
}

/// A connection borrowed from a [`StorePool`].
///
/// Dropping it hands the connection back to the pool, on success and
/// error paths alike.
pub struct StoreConnection {
    store: StoreId,
    conn: PoolConnection<Any>,
    in_use: Arc<AtomicUsize>,
}

impl fmt::Debug for StoreConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConnection")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl StoreConnection {
    pub fn store(&self) -> StoreId {
        self.store
    }

    /// Run a statement and map every row into `T`
    pub async fn fetch_all_as<T>(&mut self, sql: &str, binds: &[&str]) -> Result<Vec<T>, DbError>
    where
        T: for<'r> TryFrom<&'r AnyRow, Error = sqlx::Error>,
    {
        let mut query = sqlx::query::<Any>(sql);
        for bind in binds {
            query = query.bind(*bind);
        }

        let rows = query
            .fetch_all(&mut *self.conn)
            .await
            .map_err(|e| DbError::query(self.store, e))?;

        rows.iter()
            .map(T::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DbError::query(self.store, e))
    }

    /// Run a statement expected to yield exactly one row
    pub async fn fetch_one_as<T>(&mut self, sql: &str, binds: &[&str]) -> Result<T, DbError>
    where
        T: for<'r> TryFrom<&'r AnyRow, Error = sqlx::Error>,
    {
        let mut query = sqlx::query::<Any>(sql);
        for bind in binds {
            query = query.bind(*bind);
        }

        let row = query
            .fetch_one(&mut *self.conn)
            .await
            .map_err(|e| DbError::query(self.store, e))?;

        T::try_from(&row).map_err(|e| DbError::query(self.store, e))
    }

    /// Run a statement that returns no rows
    pub async fn execute(&mut self, sql: &str, binds: &[&str]) -> Result<u64, DbError> {
        let mut query = sqlx::query::<Any>(sql);
        for bind in binds {
            query = query.bind(*bind);
        }

        let result = query
            .execute(&mut *self.conn)
            .await
            .map_err(|e| DbError::query(self.store, e))?;
        Ok(result.rows_affected())
    }

    /// Round-trip a trivial statement
    pub async fn ping(&mut self) -> Result<(), DbError> {
        sqlx::query::<Any>("SELECT 1")
            .execute(&mut *self.conn)
            .await
            .map_err(|e| DbError::query(self.store, e))?;
        Ok(())
    }
}

impl Deref for StoreConnection {
    type Target = AnyConnection;

    fn deref(&self) -> &Self::Target {
        &self.conn
    }
}

impl DerefMut for StoreConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.conn
    }
}

impl Drop for StoreConnection {
    fn drop(&mut self) {
        self.in_use.fetch_sub(1, Ordering::SeqCst);
    }
}
