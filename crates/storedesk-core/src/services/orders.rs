//! Purchase order lists

use storedesk_db::PurchaseOrder;

use super::{QueryContext, RowSet};
use crate::cache::{TtlClass, keys};
use crate::error::CoreError;

#[derive(Clone)]
pub struct PurchaseOrderService {
    ctx: QueryContext,
}

impl PurchaseOrderService {
    pub fn new(ctx: QueryContext) -> Self {
        Self { ctx }
    }

    /// Order lines still awaiting delivery
    pub async fn pending(&self) -> Result<RowSet<PurchaseOrder>, CoreError> {
        self.ctx
            .fetch_rows(keys::PO_PENDING, TtlClass::PurchaseOrder, |mut conn, window| async move {
                conn.pending_orders(&window).await
            })
            .await
    }

    /// Order lines fully delivered
    pub async fn history(&self) -> Result<RowSet<PurchaseOrder>, CoreError> {
        self.ctx
            .fetch_rows(keys::PO_HISTORY, TtlClass::PurchaseOrder, |mut conn, window| async move {
                conn.order_history(&window).await
            })
            .await
    }
}
