//! StoreDesk - reporting backend with a cache-aside data layer

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;

use crate::config::{CacheBackendKind, CacheConfig, Config, LoggingConfig};
use storedesk_api::{AppState, create_router};
use storedesk_core::{CacheAside, CacheClient, QueryContext, spawn_reconnect_task};
use storedesk_db::{DbError, StoreId, StoreRegistry};
use storedesk_kv::{MemoryBackend, RedisBackend};

/// StoreDesk - purchase, indent and gate pass reporting
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "STOREDESK_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "STOREDESK_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load(&args.config)?;

    init_logging(&config.logging);

    info!("Starting StoreDesk v{}", env!("CARGO_PKG_VERSION"));

    let stores = Arc::new(StoreRegistry::new(
        config.analytics_settings(),
        config.transactional_settings(),
        config.analytics.native_client.clone(),
    ));

    // The analytics driver cannot work without its client libraries
    if let Err(e) = stores.bootstrap().await {
        error!("{}", e);
        std::process::exit(1);
    }

    for id in StoreId::ALL {
        match stores.initialize(id).await {
            Ok(Some(_)) => info!("{} store ready", id),
            Ok(None) => warn!("{} store is not configured", id),
            Err(e @ DbError::ClientBootstrapFailed(_)) => {
                error!("{}", e);
                std::process::exit(1);
            }
            // Retried on first use
            Err(e) => warn!("{} store unavailable at startup: {}", id, e),
        }
    }

    let client = Arc::new(build_cache_client(&config.cache)?);
    if client.is_enabled() {
        if client.connect().await {
            info!("Cache backend {} connected", client.backend_name());
        } else {
            warn!(
                "Cache backend {} unreachable, serving from the stores",
                client.backend_name()
            );
        }
        if config.cache.reconnect_interval_secs > 0 {
            spawn_reconnect_task(client.clone(), config.cache.reconnect_interval_secs);
        }
    } else {
        info!("Cache disabled");
    }
    let cache = Arc::new(CacheAside::new(client));

    let metrics_handle = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    let ctx = QueryContext::new(
        stores.clone(),
        cache.clone(),
        config.cache.ttl_policy()?,
        config.reporting.window(),
    );
    let app = create_router(AppState::new(ctx), Some(Arc::new(metrics_handle)));

    let bind_addr = args.bind.unwrap_or(config.server.bind_address);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind_addr, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", bind_addr, port))?;

    info!("Listening on {}", addr);
    info!("Reporting window starts {}", config.reporting.from_date);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cache.flush().await;
    stores.close().await;

    info!("Server stopped");
    Ok(())
}

fn build_cache_client(config: &CacheConfig) -> Result<CacheClient> {
    let client = match config.backend {
        CacheBackendKind::Redis => {
            let backend =
                RedisBackend::new(config.redis()).context("Failed to configure Redis cache")?;
            CacheClient::new(Arc::new(backend), config.client())
        }
        CacheBackendKind::Memory => {
            CacheClient::new(Arc::new(MemoryBackend::new()), config.client())
        }
        CacheBackendKind::None => CacheClient::disabled(),
    };
    Ok(client)
}

/// Initialize logging
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format.eq_ignore_ascii_case("json") {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C handler");
    info!("Shutdown signal received");
}
