//! Purchase order reports

use super::ReportWindow;
use crate::error::DbError;
use crate::models::PurchaseOrder;
use crate::store::StoreConnection;

const PENDING_ORDERS: &str = r#"
    SELECT
        CAST(t.duedate AS TEXT) AS duedate,
        a.indent_remark AS indenter,
        a.vrno AS indent_no,
        t.vrno AS vrno,
        CAST(t.vrdate AS TEXT) AS vrdate,
        t.vendor_name AS vendor_name,
        t.item_name AS item_name,
        CAST(t.qtyorder AS DOUBLE PRECISION) AS qtyorder,
        t.um AS um,
        CAST(t.qtyexecute AS DOUBLE PRECISION) AS qtyexecute
    FROM view_order_engine t
    LEFT JOIN (
        SELECT DISTINCT vrno, indent_remark FROM view_indent_engine
    ) a ON a.vrno = t.indent_vrno
    WHERE t.entity_code = 'SR'
      AND t.series = 'U3'
      AND t.qtycancelled IS NULL
      AND (t.qtyorder - t.qtyexecute) > 0
      AND CAST(t.vrdate AS TEXT) >= $1
    ORDER BY t.vrdate DESC, t.vrno DESC
"#;

const ORDER_HISTORY: &str = r#"
    SELECT
        CAST(t.duedate AS TEXT) AS duedate,
        a.indent_remark AS indenter,
        a.vrno AS indent_no,
        t.vrno AS vrno,
        CAST(t.vrdate AS TEXT) AS vrdate,
        t.vendor_name AS vendor_name,
        t.item_name AS item_name,
        CAST(t.qtyorder AS DOUBLE PRECISION) AS qtyorder,
        t.um AS um,
        CAST(t.qtyexecute AS DOUBLE PRECISION) AS qtyexecute
    FROM view_order_engine t
    LEFT JOIN (
        SELECT DISTINCT vrno, indent_remark FROM view_indent_engine
    ) a ON a.vrno = t.indent_vrno
    WHERE t.entity_code = 'SR'
      AND t.series = 'U3'
      AND t.qtycancelled IS NULL
      AND ((t.qtyorder - t.qtyexecute) = 0 OR (t.qtyorder - t.qtyexecute) > t.qtyorder)
      AND CAST(t.vrdate AS TEXT) >= $1
    ORDER BY t.vrdate DESC, t.vrno DESC
"#;

impl StoreConnection {
    /// Open purchase order lines with an outstanding balance
    pub async fn pending_orders(
        &mut self,
        window: &ReportWindow,
    ) -> Result<Vec<PurchaseOrder>, DbError> {
        let from = window.from_bind();
        let rows: Vec<PurchaseOrder> = self.fetch_all_as(PENDING_ORDERS, &[&from]).await?;
        Ok(rows.into_iter().map(PurchaseOrder::with_balance).collect())
    }

    /// Fully executed purchase order lines
    pub async fn order_history(
        &mut self,
        window: &ReportWindow,
    ) -> Result<Vec<PurchaseOrder>, DbError> {
        let from = window.from_bind();
        self.fetch_all_as(ORDER_HISTORY, &[&from]).await
    }
}
