//! Indent dashboard aggregation
//!
//! Six independent sub-queries run concurrently, each on its own pooled
//! connection, and are folded into one [`DashboardMetrics`]. The issue and
//! stock figures are best-effort: a failure there is logged and reads as
//! zero, while a failure in any other sub-query fails the whole call.

use chrono::Local;
use serde::{Deserialize, Serialize};
use storedesk_db::{DbError, StoreConnection, TopItem, TopVendor};
use tracing::warn;

use super::QueryContext;
use crate::cache::{TtlClass, keys};
use crate::error::CoreError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub total_indents: i64,
    pub completed_indents: i64,
    pub pending_indents: i64,
    pub upcoming_indents: i64,
    pub overdue_indents: i64,
    pub overall_progress: f64,
    pub completed_percent: f64,
    pub pending_percent: f64,
    pub upcoming_percent: f64,
    pub overdue_percent: f64,
    pub total_indented_quantity: f64,
    pub total_purchase_orders: i64,
    pub total_purchased_quantity: f64,
    pub total_issued_quantity: f64,
    pub out_of_stock_count: i64,
    pub top_purchased_items: Vec<TopItem>,
    pub top_vendors: Vec<TopVendor>,
}

/// `part` as a percentage of `total`, one decimal place
fn percent(part: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    let value = part as f64 / total as f64 * 100.0;
    (value * 10.0).round() / 10.0
}

fn or_zero<T: Default>(what: &str, result: Result<T, CoreError>) -> T {
    result.unwrap_or_else(|e| {
        warn!("Dashboard {} unavailable, reporting zero: {}", what, e);
        T::default()
    })
}

#[derive(Clone)]
pub struct DashboardService {
    ctx: QueryContext,
}

impl DashboardService {
    pub fn new(ctx: QueryContext) -> Self {
        Self { ctx }
    }

    /// Run `query` on a freshly borrowed analytics connection
    async fn on_connection<T, F, Fut>(&self, query: F) -> Result<T, CoreError>
    where
        F: FnOnce(StoreConnection) -> Fut,
        Fut: Future<Output = Result<T, DbError>>,
    {
        let conn = self.ctx.connection().await?;
        Ok(query(conn).await?)
    }

    pub async fn metrics(&self) -> Result<DashboardMetrics, CoreError> {
        self.ctx
            .cached(keys::INDENT_DASHBOARD, TtlClass::Dashboard, || self.aggregate())
            .await
    }

    async fn aggregate(&self) -> Result<DashboardMetrics, CoreError> {
        let window = *self.ctx.window();
        let today = Local::now().date_naive();

        let (status, purchases, issued, out_of_stock, items, vendors) = tokio::join!(
            self.on_connection(|mut conn| async move {
                conn.indent_status_summary(&window, today).await
            }),
            self.on_connection(|mut conn| async move { conn.purchase_summary(&window).await }),
            self.on_connection(|mut conn| async move { conn.issued_total(&window).await }),
            self.on_connection(|mut conn| async move { conn.out_of_stock_count().await }),
            self.on_connection(|mut conn| async move { conn.top_purchased_items(&window).await }),
            self.on_connection(|mut conn| async move { conn.top_vendors(&window).await }),
        );

        let status = status?;
        let purchases = purchases?;
        let top_purchased_items = items?;
        let top_vendors = vendors?;
        let total_issued_quantity = or_zero("issued total", issued);
        let out_of_stock_count = or_zero("out-of-stock count", out_of_stock);

        let total = status.total;
        Ok(DashboardMetrics {
            total_indents: total,
            completed_indents: status.completed,
            pending_indents: status.pending,
            upcoming_indents: status.upcoming,
            overdue_indents: status.overdue,
            overall_progress: percent(status.completed, total),
            completed_percent: percent(status.completed, total),
            pending_percent: percent(status.pending, total),
            upcoming_percent: percent(status.upcoming, total),
            overdue_percent: percent(status.overdue, total),
            total_indented_quantity: status.total_indented_qty,
            total_purchase_orders: purchases.total_purchase_orders,
            total_purchased_quantity: purchases.total_purchased_qty,
            total_issued_quantity,
            out_of_stock_count,
            top_purchased_items,
            top_vendors,
        })
    }
}
