//! Redis cache backend

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, IntoConnectionInfo};
use tracing::{debug, info};

use crate::backend::KvBackend;
use crate::error::KvError;

/// Keys fetched per SCAN round trip
const SCAN_BATCH: usize = 100;

/// Redis connection configuration
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
    /// Overrides any password embedded in the URL
    pub password: Option<String>,
    pub connect_timeout: Duration,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            password: None,
            connect_timeout: Duration::from_secs(5),
        }
    }
}

/// Redis-backed store using a multiplexed, self-healing connection
pub struct RedisBackend {
    client: redis::Client,
    connection: RwLock<Option<ConnectionManager>>,
    connect_timeout: Duration,
}

impl RedisBackend {
    /// Validate the configuration. No connection is made until
    /// [`KvBackend::connect`].
    pub fn new(config: RedisConfig) -> Result<Self, KvError> {
        let mut info = config
            .url
            .as_str()
            .into_connection_info()
            .map_err(|e| KvError::Configuration(format!("invalid redis url: {}", e)))?;
        if let Some(password) = config.password.filter(|p| !p.is_empty()) {
            info.redis.password = Some(password);
        }

        info!("Configured Redis cache backend at {}", info.addr);

        Ok(Self {
            client: redis::Client::open(info)?,
            connection: RwLock::new(None),
            connect_timeout: config.connect_timeout,
        })
    }

    fn connection(&self) -> Result<ConnectionManager, KvError> {
        self.connection.read().clone().ok_or(KvError::NotConnected)
    }
}

#[async_trait]
impl KvBackend for RedisBackend {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn connect(&self) -> Result<(), KvError> {
        let manager = tokio::time::timeout(
            self.connect_timeout,
            ConnectionManager::new(self.client.clone()),
        )
        .await
        .map_err(|_| KvError::Timeout(self.connect_timeout))??;

        *self.connection.write() = Some(manager);
        debug!("Redis connection established");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let mut conn = self.connection()?;
        Ok(conn.get(key).await?)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), KvError> {
        let mut conn = self.connection()?;
        match ttl {
            Some(ttl) => {
                let _: () = conn.set_ex(key, value, ttl.as_secs().max(1)).await?;
            }
            None => {
                let _: () = conn.set(key, value).await?;
            }
        }
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<u64, KvError> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut conn = self.connection()?;
        Ok(conn.del(keys.to_vec()).await?)
    }

    async fn scan(&self, pattern: &str) -> Result<Vec<String>, KvError> {
        let mut conn = self.connection()?;
        let mut cursor = 0u64;
        let mut keys = Vec::new();

        loop {
            let (next_cursor, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await?;

            keys.extend(batch);
            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }

        // SCAN may return a key more than once
        keys.sort();
        keys.dedup();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_url() {
        let config = RedisConfig {
            url: "not-a-redis-url".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            RedisBackend::new(config),
            Err(KvError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_operations_fail_before_connect() {
        let backend = RedisBackend::new(RedisConfig::default()).unwrap();
        assert_eq!(backend.name(), "redis");
        assert!(matches!(
            backend.get("po:pending").await,
            Err(KvError::NotConnected)
        ));
        assert_eq!(backend.delete(&[]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_connect_to_closed_port_fails() {
        let config = RedisConfig {
            url: "redis://127.0.0.1:1".to_string(),
            password: Some("secret".to_string()),
            connect_timeout: Duration::from_millis(500),
        };
        let backend = RedisBackend::new(config).unwrap();
        assert!(backend.connect().await.is_err());
        assert!(matches!(backend.scan("*").await, Err(KvError::NotConnected)));
    }
}
