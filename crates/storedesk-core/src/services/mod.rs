//! Reporting query services
//!
//! Every service pairs a cache key and TTL class with a computation that
//! borrows an analytics connection, runs its report and shapes the rows.
//! The shaped result is what gets cached.

mod cost_locations;
mod dashboard;
mod gate_passes;
mod indents;
mod orders;
mod uom;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use storedesk_db::{DbError, ReportWindow, StoreConnection, StoreId, StoreRegistry};

use crate::cache::{CacheAside, TtlClass, TtlPolicy};
use crate::error::CoreError;
use crate::invalidation::CacheInvalidator;

pub use cost_locations::{CostLocationService, Division};
pub use dashboard::{DashboardMetrics, DashboardService};
pub use gate_passes::GatePassService;
pub use indents::IndentService;
pub use orders::PurchaseOrderService;
pub use uom::UomService;

/// A list result with its row count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowSet<T> {
    pub rows: Vec<T>,
    pub total: usize,
}

impl<T> From<Vec<T>> for RowSet<T> {
    fn from(rows: Vec<T>) -> Self {
        let total = rows.len();
        Self { rows, total }
    }
}

/// Everything a query service needs, built once at startup
#[derive(Clone)]
pub struct QueryContext {
    stores: Arc<StoreRegistry>,
    cache: Arc<CacheAside>,
    ttl: TtlPolicy,
    window: ReportWindow,
}

impl QueryContext {
    pub fn new(
        stores: Arc<StoreRegistry>,
        cache: Arc<CacheAside>,
        ttl: TtlPolicy,
        window: ReportWindow,
    ) -> Self {
        Self {
            stores,
            cache,
            ttl,
            window,
        }
    }

    pub fn stores(&self) -> &Arc<StoreRegistry> {
        &self.stores
    }

    pub fn cache(&self) -> &Arc<CacheAside> {
        &self.cache
    }

    pub fn window(&self) -> &ReportWindow {
        &self.window
    }

    /// Borrow an analytics connection
    pub async fn connection(&self) -> Result<StoreConnection, CoreError> {
        Ok(self.stores.acquire(StoreId::Analytics).await?)
    }

    /// Serve `key` from cache or compute it with the class's TTL
    pub async fn cached<T, F, Fut>(
        &self,
        key: &str,
        class: TtlClass,
        compute: F,
    ) -> Result<T, CoreError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        self.cache
            .get_or_compute(key, self.ttl.ttl(class), compute)
            .await
    }

    /// Cached list report: borrow a connection, hand it to `fetch` with
    /// the reporting window, and wrap the rows. The connection is returned
    /// when `fetch` finishes, whether it succeeded or not.
    pub async fn fetch_rows<T, F, Fut>(
        &self,
        key: &str,
        class: TtlClass,
        fetch: F,
    ) -> Result<RowSet<T>, CoreError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(StoreConnection, ReportWindow) -> Fut,
        Fut: Future<Output = Result<Vec<T>, DbError>>,
    {
        self.cached(key, class, || async {
            let conn = self.connection().await?;
            let rows = fetch(conn, self.window).await?;
            Ok::<_, CoreError>(RowSet::from(rows))
        })
        .await
    }
}

/// All query services over one shared context
#[derive(Clone)]
pub struct Services {
    pub orders: PurchaseOrderService,
    pub indents: IndentService,
    pub gate_passes: GatePassService,
    pub uom: UomService,
    pub cost_locations: CostLocationService,
    pub dashboard: DashboardService,
    pub invalidator: CacheInvalidator,
}

impl Services {
    pub fn new(ctx: QueryContext) -> Self {
        Self {
            orders: PurchaseOrderService::new(ctx.clone()),
            indents: IndentService::new(ctx.clone()),
            gate_passes: GatePassService::new(ctx.clone()),
            uom: UomService::new(ctx.clone()),
            cost_locations: CostLocationService::new(ctx.clone()),
            dashboard: DashboardService::new(ctx.clone()),
            invalidator: CacheInvalidator::new(ctx.cache().client().clone()),
        }
    }
}
