//! StoreDesk core
//!
//! The cache-aside data access layer: a fault-tolerant cache client, the
//! orchestrator that serves reads through it, and the reporting query
//! services built on top.

pub mod cache;
pub mod error;
pub mod invalidation;
pub mod services;

pub use cache::{
    CacheAside, CacheClient, CacheClientConfig, CacheStats, TtlClass, TtlPolicy,
    spawn_reconnect_task,
};
pub use error::CoreError;
pub use invalidation::{CacheDomain, CacheInvalidator};
pub use services::{
    CostLocationService, DashboardMetrics, DashboardService, Division, GatePassService,
    IndentService, PurchaseOrderService, QueryContext, RowSet, Services, UomService,
};
