//! Configuration loading
//!
//! A TOML file layered with `STOREDESK_*` environment overrides, nested
//! keys separated by `__` (for example `STOREDESK_CACHE__URL`).

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use storedesk_core::{CacheClientConfig, TtlPolicy};
use storedesk_db::{NativeClientSettings, ReportWindow, StoreSettings};
use storedesk_kv::RedisConfig;
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub analytics: AnalyticsConfig,
    pub transactional: StoreConfig,
    pub cache: CacheConfig,
    pub reporting: ReportingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 3004,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// One relational store. Unset numeric fields take the store's defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub ssl: Option<bool>,
    pub min_connections: Option<u32>,
    pub max_connections: Option<u32>,
    pub acquire_timeout_ms: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
    pub statement_cache_size: Option<usize>,
    pub slow_acquire_warn_ms: Option<u64>,
}

impl StoreConfig {
    /// Apply this section on top of a store's defaults
    pub fn settings(&self, defaults: StoreSettings) -> StoreSettings {
        StoreSettings {
            url: self.url.clone().filter(|u| !u.trim().is_empty()),
            username: self.username.clone(),
            password: self.password.clone(),
            ssl: self.ssl,
            min_connections: self.min_connections.unwrap_or(defaults.min_connections),
            max_connections: self.max_connections.unwrap_or(defaults.max_connections),
            acquire_timeout: self
                .acquire_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.acquire_timeout),
            idle_timeout: match self.idle_timeout_secs {
                Some(0) => None,
                Some(secs) => Some(Duration::from_secs(secs)),
                None => defaults.idle_timeout,
            },
            statement_cache_size: self
                .statement_cache_size
                .unwrap_or(defaults.statement_cache_size),
            slow_acquire_threshold: self
                .slow_acquire_warn_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.slow_acquire_threshold),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    #[serde(flatten)]
    pub store: StoreConfig,
    pub native_client: NativeClientSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackendKind {
    Redis,
    Memory,
    /// Run without a cache; every read goes to the store
    None,
}

/// Key-value cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub backend: CacheBackendKind,
    pub url: String,
    pub password: Option<String>,
    pub connect_timeout_ms: u64,
    pub op_timeout_ms: u64,
    pub reconnect_attempts: u32,
    pub reconnect_base_delay_ms: u64,
    pub reconnect_max_delay_ms: u64,
    /// `0` disables the revival task
    pub reconnect_interval_secs: u64,
    /// TTL overrides in seconds by class name
    pub ttl: HashMap<String, u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackendKind::Redis,
            url: "redis://127.0.0.1:6379".to_string(),
            password: None,
            connect_timeout_ms: 5000,
            op_timeout_ms: 1000,
            reconnect_attempts: 3,
            reconnect_base_delay_ms: 100,
            reconnect_max_delay_ms: 1000,
            reconnect_interval_secs: 30,
            ttl: HashMap::new(),
        }
    }
}

impl CacheConfig {
    pub fn redis(&self) -> RedisConfig {
        RedisConfig {
            url: self.url.clone(),
            password: self.password.clone().filter(|p| !p.is_empty()),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
        }
    }

    pub fn client(&self) -> CacheClientConfig {
        CacheClientConfig {
            op_timeout: Duration::from_millis(self.op_timeout_ms),
            reconnect_attempts: self.reconnect_attempts,
            reconnect_base_delay: Duration::from_millis(self.reconnect_base_delay_ms),
            reconnect_max_delay: Duration::from_millis(self.reconnect_max_delay_ms),
        }
    }

    pub fn ttl_policy(&self) -> Result<TtlPolicy> {
        TtlPolicy::from_table(&self.ttl).context("Invalid [cache.ttl] table")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportingConfig {
    /// Lower bound of every reporting window
    pub from_date: NaiveDate,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            from_date: ReportWindow::default().from_date,
        }
    }
}

impl ReportingConfig {
    pub fn window(&self) -> ReportWindow {
        ReportWindow::new(self.from_date)
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            info!("Loading configuration from {}", path);
        } else {
            info!("Config file not found at {}, using defaults", path);
        }

        let config = ::config::Config::builder()
            .add_source(::config::File::new(path, ::config::FileFormat::Toml).required(false))
            .add_source(
                ::config::Environment::with_prefix("STOREDESK")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read configuration from {}", path))?;

        config
            .try_deserialize()
            .with_context(|| format!("Failed to parse configuration from {}", path))
    }

    pub fn analytics_settings(&self) -> StoreSettings {
        self.analytics.store.settings(StoreSettings::analytics())
    }

    pub fn transactional_settings(&self) -> StoreSettings {
        self.transactional.settings(StoreSettings::transactional())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use storedesk_core::TtlClass;

    fn load_str(toml: &str) -> Config {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(toml.as_bytes()).unwrap();
        Config::load(file.path().to_str().unwrap()).unwrap()
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = Config::load("/nonexistent/storedesk.toml").unwrap();
        assert_eq!(config.server.port, 3004);
        assert_eq!(config.cache.backend, CacheBackendKind::Redis);
        assert!(!config.analytics_settings().is_configured());
        assert_eq!(
            config.reporting.from_date,
            NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()
        );
    }

    #[test]
    fn test_store_sections_override_defaults() {
        let config = load_str(
            r#"
            [analytics]
            url = "postgres://reports.example.com/erp"
            max_connections = 8
            acquire_timeout_ms = 2500

            [analytics.native_client]
            enabled = true
            linux_lib_dir = "/opt/client"

            [transactional]
            url = ""
            "#,
        );

        let analytics = config.analytics_settings();
        assert!(analytics.is_configured());
        assert_eq!(analytics.max_connections, 8);
        assert_eq!(analytics.min_connections, 2);
        assert_eq!(analytics.acquire_timeout, Duration::from_millis(2500));
        assert!(config.analytics.native_client.enabled);
        assert_eq!(
            config.analytics.native_client.linux_lib_dir.to_str(),
            Some("/opt/client")
        );

        assert!(!config.transactional_settings().is_configured());
    }

    #[test]
    fn test_cache_section() {
        let config = load_str(
            r#"
            [cache]
            backend = "memory"
            op_timeout_ms = 250

            [cache.ttl]
            uom = 600
            "#,
        );

        assert_eq!(config.cache.backend, CacheBackendKind::Memory);
        assert_eq!(config.cache.client().op_timeout, Duration::from_millis(250));
        let policy = config.cache.ttl_policy().unwrap();
        assert_eq!(policy.ttl(TtlClass::Uom), Some(Duration::from_secs(600)));
        assert_eq!(policy.ttl(TtlClass::Indent), Some(Duration::from_secs(180)));
    }
}
