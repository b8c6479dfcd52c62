//! Registry of the backend stores

use std::path::PathBuf;

use serde::Serialize;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::bootstrap::{NativeClientSettings, bootstrap_native_client};
use crate::error::DbError;
use crate::store::{LazyPool, StoreConnection, StoreId, StorePool, StoreSettings};

/// A backend store, decided once from settings
pub enum Store {
    Configured(LazyPool),
    Unconfigured,
}

impl Store {
    fn from_settings(id: StoreId, settings: StoreSettings) -> Self {
        if settings.is_configured() {
            Store::Configured(LazyPool::new(id, settings))
        } else {
            warn!("{} store is not configured; services using it are disabled", id);
            Store::Unconfigured
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, Store::Configured(_))
    }
}

/// Point-in-time view of a store
#[derive(Debug, Clone, Serialize)]
pub struct StoreHealth {
    pub store: StoreId,
    pub configured: bool,
    pub healthy: bool,
    pub pool_size: u32,
    pub idle: usize,
    pub in_use: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Owns both stores and creates their pools on first use
pub struct StoreRegistry {
    analytics: Store,
    transactional: Store,
    native_client: NativeClientSettings,
    bootstrap: OnceCell<Option<PathBuf>>,
}

impl StoreRegistry {
    pub fn new(
        analytics: StoreSettings,
        transactional: StoreSettings,
        native_client: NativeClientSettings,
    ) -> Self {
        sqlx::any::install_default_drivers();

        Self {
            analytics: Store::from_settings(StoreId::Analytics, analytics),
            transactional: Store::from_settings(StoreId::Transactional, transactional),
            native_client,
            bootstrap: OnceCell::new(),
        }
    }

    pub fn store(&self, id: StoreId) -> &Store {
        match id {
            StoreId::Analytics => &self.analytics,
            StoreId::Transactional => &self.transactional,
        }
    }

    pub fn is_configured(&self, id: StoreId) -> bool {
        self.store(id).is_configured()
    }

    /// Native client directory, once the bootstrap has run
    pub fn native_client_dir(&self) -> Option<PathBuf> {
        self.bootstrap.get().cloned().flatten()
    }

    /// Load the native client libraries. Runs at most once; later calls
    /// return the first outcome if it succeeded.
    pub async fn bootstrap(&self) -> Result<Option<PathBuf>, DbError> {
        self.bootstrap
            .get_or_try_init(|| bootstrap_native_client(&self.native_client))
            .await
            .cloned()
    }

    /// Create the store's pool if it does not exist yet.
    ///
    /// Returns `Ok(None)` when the store is not configured. Concurrent
    /// callers share one creation; after a failure the next call retries.
    pub async fn initialize(&self, id: StoreId) -> Result<Option<StorePool>, DbError> {
        let lazy = match self.store(id) {
            Store::Configured(lazy) => lazy,
            Store::Unconfigured => return Ok(None),
        };

        if let Some(pool) = lazy.get() {
            return Ok(Some(pool.clone()));
        }

        if id == StoreId::Analytics {
            self.bootstrap().await?;
        }

        lazy.get_or_init().await.map(Some)
    }

    /// Borrow a connection, creating the pool first if needed
    pub async fn acquire(&self, id: StoreId) -> Result<StoreConnection, DbError> {
        match self.initialize(id).await? {
            Some(pool) => pool.acquire().await,
            None => Err(DbError::NotConfigured(id)),
        }
    }

    /// Probe a store with a trivial statement
    pub async fn health(&self, id: StoreId) -> StoreHealth {
        let mut health = StoreHealth {
            store: id,
            configured: self.is_configured(id),
            healthy: false,
            pool_size: 0,
            idle: 0,
            in_use: 0,
            error: None,
        };
        if !health.configured {
            return health;
        }

        let probe = async {
            let pool = self.initialize(id).await?.ok_or(DbError::NotConfigured(id))?;
            {
                let mut conn = pool.acquire().await?;
                conn.ping().await?;
            }
            Ok::<_, DbError>(pool)
        };

        match probe.await {
            Ok(pool) => {
                health.healthy = true;
                health.pool_size = pool.size();
                health.idle = pool.idle();
                health.in_use = pool.in_use();
            }
            Err(e) => {
                if let Store::Configured(lazy) = self.store(id)
                    && let Some(pool) = lazy.get()
                {
                    health.pool_size = pool.size();
                    health.idle = pool.idle();
                    health.in_use = pool.in_use();
                }
                health.error = Some(e.to_string());
            }
        }
        health
    }

    /// Close every pool that was created
    pub async fn close(&self) {
        for id in StoreId::ALL {
            if let Store::Configured(lazy) = self.store(id)
                && let Some(pool) = lazy.get()
            {
                pool.close().await;
                info!("{} pool closed", id);
            }
        }
    }
}
