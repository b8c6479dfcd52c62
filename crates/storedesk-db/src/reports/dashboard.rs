//! Sub-queries behind the indent dashboard

use chrono::NaiveDate;

use super::{ReportWindow, days_before, format_date};
use crate::error::DbError;
use crate::models::{IndentStatusSummary, PurchaseSummary, TopItem, TopVendor, Total};
use crate::store::StoreConnection;

/// Rows returned by the top-N rankings
pub const TOP_LIMIT: usize = 10;
/// Pending indents newer than this many days count as upcoming
pub const UPCOMING_WINDOW_DAYS: u64 = 7;
/// Pending indents older than this many days count as overdue
pub const OVERDUE_AFTER_DAYS: u64 = 30;

const INDENT_STATUS_SUMMARY: &str = r#"
    SELECT
        COUNT(*) AS total_indents,
        COUNT(CASE WHEN t.po_no IS NOT NULL THEN 1 END) AS completed_indents,
        COUNT(CASE WHEN t.po_no IS NULL AND t.cancelleddate IS NULL THEN 1 END) AS pending_indents,
        COUNT(CASE WHEN t.po_no IS NULL AND t.cancelleddate IS NULL
                    AND CAST(t.vrdate AS TEXT) >= $2 THEN 1 END) AS upcoming_indents,
        COUNT(CASE WHEN t.po_no IS NULL AND t.cancelleddate IS NULL
                    AND CAST(t.vrdate AS TEXT) < $3 THEN 1 END) AS overdue_indents,
        CAST(COALESCE(SUM(COALESCE(t.qtyindent, 0)), 0) AS DOUBLE PRECISION) AS total_indented_qty
    FROM view_indent_engine t
    WHERE t.entity_code = 'SR'
      AND CAST(t.vrdate AS TEXT) >= $1
"#;

const PURCHASE_SUMMARY: &str = r#"
    SELECT
        COUNT(*) AS total_purchase_orders,
        CAST(COALESCE(SUM(COALESCE(t.qtyorder, 0)), 0) AS DOUBLE PRECISION) AS total_purchased_qty
    FROM view_order_engine t
    WHERE t.entity_code = 'SR'
      AND t.series = 'U3'
      AND t.qtycancelled IS NULL
      AND ((t.qtyorder - t.qtyexecute) = 0 OR (t.qtyorder - t.qtyexecute) > t.qtyorder)
      AND CAST(t.vrdate AS TEXT) >= $1
"#;

const ISSUED_TOTAL: &str = r#"
    SELECT CAST(COALESCE(SUM(COALESCE(t.qtyissue, 0)), 0) AS DOUBLE PRECISION) AS total
    FROM view_issue_engine t
    WHERE t.entity_code = 'SR'
      AND CAST(t.vrdate AS TEXT) >= $1
"#;

const OUT_OF_STOCK_COUNT: &str = r#"
    SELECT COUNT(*) AS total
    FROM view_item_stock_engine t
    WHERE t.entity_code = 'SR'
      AND t.item_nature = 'SI'
      AND COALESCE(t.yrclqty_engine, 0) <= 0
      AND COALESCE(t.yropaqty, 0) > 0
"#;

fn top_items_sql(limit: usize) -> String {
    format!(
        r#"
    SELECT
        UPPER(t.item_name) AS item_name,
        COUNT(*) AS order_count,
        CAST(COALESCE(SUM(COALESCE(t.qtyorder, 0)), 0) AS DOUBLE PRECISION) AS total_order_qty
    FROM view_order_engine t
    WHERE t.entity_code = 'SR'
      AND t.series = 'U3'
      AND t.qtycancelled IS NULL
      AND ((t.qtyorder - t.qtyexecute) = 0 OR (t.qtyorder - t.qtyexecute) > t.qtyorder)
      AND CAST(t.vrdate AS TEXT) >= $1
    GROUP BY UPPER(t.item_name)
    ORDER BY total_order_qty DESC
    LIMIT {limit}
"#
    )
}

fn top_vendors_sql(limit: usize) -> String {
    format!(
        r#"
    SELECT
        t.vendor_name AS vendor_name,
        COUNT(DISTINCT t.vrno) AS unique_po_count,
        CAST(COALESCE(SUM(COALESCE(t.qtyorder, 0)), 0) AS DOUBLE PRECISION) AS total_items
    FROM view_order_engine t
    WHERE t.entity_code = 'SR'
      AND t.series = 'U3'
      AND t.qtycancelled IS NULL
      AND ((t.qtyorder - t.qtyexecute) = 0 OR (t.qtyorder - t.qtyexecute) > t.qtyorder)
      AND CAST(t.vrdate AS TEXT) >= $1
    GROUP BY t.vendor_name
    ORDER BY unique_po_count DESC, total_items DESC
    LIMIT {limit}
"#
    )
}

impl StoreConnection {
    /// Indent totals by state, relative to `today`
    pub async fn indent_status_summary(
        &mut self,
        window: &ReportWindow,
        today: NaiveDate,
    ) -> Result<IndentStatusSummary, DbError> {
        let from = window.from_bind();
        let upcoming = format_date(days_before(today, UPCOMING_WINDOW_DAYS));
        let overdue = format_date(days_before(today, OVERDUE_AFTER_DAYS));
        self.fetch_one_as(INDENT_STATUS_SUMMARY, &[&from, &upcoming, &overdue])
            .await
    }

    pub async fn purchase_summary(
        &mut self,
        window: &ReportWindow,
    ) -> Result<PurchaseSummary, DbError> {
        let from = window.from_bind();
        self.fetch_one_as(PURCHASE_SUMMARY, &[&from]).await
    }

    /// Quantity issued out of stores in the window
    pub async fn issued_total(&mut self, window: &ReportWindow) -> Result<f64, DbError> {
        let from = window.from_bind();
        let Total(total) = self.fetch_one_as(ISSUED_TOTAL, &[&from]).await?;
        Ok(total)
    }

    /// Stock items with an opening balance that have run out
    pub async fn out_of_stock_count(&mut self) -> Result<i64, DbError> {
        let Total(total) = self.fetch_one_as(OUT_OF_STOCK_COUNT, &[]).await?;
        Ok(total as i64)
    }

    pub async fn top_purchased_items(
        &mut self,
        window: &ReportWindow,
    ) -> Result<Vec<TopItem>, DbError> {
        let from = window.from_bind();
        self.fetch_all_as(&top_items_sql(TOP_LIMIT), &[&from]).await
    }

    pub async fn top_vendors(&mut self, window: &ReportWindow) -> Result<Vec<TopVendor>, DbError> {
        let from = window.from_bind();
        self.fetch_all_as(&top_vendors_sql(TOP_LIMIT), &[&from]).await
    }
}
