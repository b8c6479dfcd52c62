//! Report queries against the analytics store.
//!
//! Each query is an inherent method on [`StoreConnection`](crate::StoreConnection),
//! so callers borrow a connection, run one or more reports, and let the
//! guard return it. SQL sticks to the subset both drivers accept: `$n`
//! placeholders, dates compared as `YYYY-MM-DD` text, sums cast to
//! `DOUBLE PRECISION`.

mod catalog;
mod dashboard;
mod gate_passes;
mod indents;
mod orders;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

pub use dashboard::{TOP_LIMIT, UPCOMING_WINDOW_DAYS, OVERDUE_AFTER_DAYS};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Lower bound of every reporting query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportWindow {
    pub from_date: NaiveDate,
}

impl ReportWindow {
    pub fn new(from_date: NaiveDate) -> Self {
        Self { from_date }
    }

    /// The window start as a bindable string
    pub fn from_bind(&self) -> String {
        format_date(self.from_date)
    }
}

impl Default for ReportWindow {
    fn default() -> Self {
        Self {
            from_date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap_or_default(),
        }
    }
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub(crate) fn days_before(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_sub_days(Days::new(days)).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::NativeClientSettings;
    use crate::fixtures;
    use crate::registry::StoreRegistry;
    use crate::store::{StoreConnection, StoreId, StoreSettings};
    use chrono::Local;
    use tempfile::TempDir;

    struct Seeded {
        _temp: TempDir,
        registry: StoreRegistry,
        today: NaiveDate,
    }

    async fn seeded(with_issues: bool) -> Seeded {
        let temp = TempDir::new().unwrap();
        let url = format!("sqlite://{}?mode=rwc", temp.path().join("a.db").display());
        let registry = StoreRegistry::new(
            StoreSettings::analytics().with_url(url),
            StoreSettings::transactional(),
            NativeClientSettings::default(),
        );
        let today = Local::now().date_naive();
        {
            let mut conn = registry.acquire(StoreId::Analytics).await.unwrap();
            fixtures::create_schema(&mut conn, with_issues).await.unwrap();
            fixtures::seed(&mut conn, today, with_issues).await.unwrap();
        }
        Seeded {
            _temp: temp,
            registry,
            today,
        }
    }

    impl Seeded {
        async fn conn(&self) -> StoreConnection {
            self.registry.acquire(StoreId::Analytics).await.unwrap()
        }
    }

    #[test]
    fn test_days_before() {
        let date = NaiveDate::from_ymd_opt(2025, 4, 3).unwrap();
        assert_eq!(format_date(days_before(date, 7)), "2025-03-27");
        assert_eq!(ReportWindow::default().from_bind(), "2025-04-01");
    }

    #[tokio::test]
    async fn test_order_reports() {
        let db = seeded(true).await;
        let window = ReportWindow::default();
        let mut conn = db.conn().await;

        let pending = conn.pending_orders(&window).await.unwrap();
        assert_eq!(pending.len(), 1);
        let order = &pending[0];
        assert_eq!(order.vrno.as_deref(), Some("PO-1"));
        assert_eq!(order.indenter, "Ravi");
        assert_eq!(order.indent_no, "IN-3");
        assert_eq!(order.balance_qty, Some(6.0));
        assert_eq!(
            order.planned_timestamp.as_deref(),
            Some("2025-05-02T06:00:00")
        );

        let history = conn.order_history(&window).await.unwrap();
        assert_eq!(history.len(), 3);
        assert!(history.iter().all(|o| o.balance_qty.is_none()));
        assert!(history.iter().all(|o| o.indenter.is_empty()));
    }

    #[tokio::test]
    async fn test_indent_reports() {
        let db = seeded(true).await;
        let window = ReportWindow::default();
        let mut conn = db.conn().await;

        let pending = conn.pending_indents(&window).await.unwrap();
        let numbers: Vec<_> = pending
            .iter()
            .map(|i| i.indent_number.as_deref().unwrap_or_default())
            .collect();
        assert_eq!(numbers, vec!["IN-2", "IN-1"]);

        let first = &pending[1];
        assert_eq!(first.item_name.as_deref(), Some("BALL BEARING"));
        assert_eq!(first.specification.as_deref(), Some("6205 ZZ"));
        assert_eq!(first.department.as_deref(), Some("STORES"));
        assert_eq!(first.plannedtimestamp.as_deref(), Some("2025-04-04T09:00:00"));
        assert_eq!(pending[0].plannedtimestamp, None);

        let history = conn.indent_history(&window).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].po_no.as_deref(), Some("PO-1"));
        assert_eq!(history[0].indent.department.as_deref(), Some("stores"));
    }

    #[tokio::test]
    async fn test_indent_history_oldest_first() {
        let db = seeded(true).await;
        let window = ReportWindow::default();
        let mut conn = db.conn().await;
        conn.execute(
            "INSERT INTO view_indent_engine VALUES \
             ('SR', 'IN-B', '2025-06-01', NULL, 'Ravi', 'Plant', 'stores', 'gasket', 'NOS', \
              2, NULL, NULL, NULL, 'PO-8', 2, NULL, NULL), \
             ('SR', 'IN-A', '2025-05-01', NULL, 'Ravi', 'Plant', 'stores', 'gasket', 'NOS', \
              1, NULL, NULL, NULL, 'PO-7', 1, NULL, NULL)",
            &[],
        )
        .await
        .unwrap();

        let history = conn.indent_history(&window).await.unwrap();
        let numbers: Vec<_> = history
            .iter()
            .map(|h| h.indent.indent_number.as_deref().unwrap_or_default())
            .collect();
        assert_eq!(numbers, vec!["IN-A", "IN-B", "IN-3"]);
    }

    #[tokio::test]
    async fn test_gate_pass_reports() {
        let db = seeded(true).await;
        let mut conn = db.conn().await;

        let pending = conn.pending_gate_passes().await.unwrap();
        let vrnos: Vec<_> = pending.iter().filter_map(|g| g.vrno.clone()).collect();
        assert_eq!(vrnos, vec!["P3-003", "P3-001"]);

        let received = conn.received_gate_passes().await.unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].repair_gate_pass.as_deref(), Some("P3-002"));
        assert_eq!(received[0].qtyrecd, 1.0);

        assert_eq!(conn.count_pending_gate_passes().await.unwrap(), 2);
        assert_eq!(conn.count_received_gate_passes().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_catalog_reports() {
        let db = seeded(true).await;
        let mut conn = db.conn().await;

        let items = conn.uom_items().await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].item_code.as_deref(), Some("1001"));

        let sm = conn.cost_locations("SM").await.unwrap();
        let names: Vec<_> = sm.iter().filter_map(|c| c.cost_name.clone()).collect();
        assert_eq!(names, vec!["Common Store", "SM Workshop"]);

        let common = conn.cost_locations("CO").await.unwrap();
        assert_eq!(common.len(), 1);
    }

    #[tokio::test]
    async fn test_dashboard_subqueries() {
        let db = seeded(true).await;
        let window = ReportWindow::default();
        let mut conn = db.conn().await;

        let status = conn.indent_status_summary(&window, db.today).await.unwrap();
        assert_eq!(status.total, 4);
        assert_eq!(status.completed, 1);
        assert_eq!(status.pending, 2);
        assert_eq!(status.upcoming, 1);
        assert_eq!(status.overdue, 1);
        assert_eq!(status.total_indented_qty, 23.0);

        let purchases = conn.purchase_summary(&window).await.unwrap();
        assert_eq!(purchases.total_purchase_orders, 3);
        assert_eq!(purchases.total_purchased_qty, 15.0);

        assert_eq!(conn.issued_total(&window).await.unwrap(), 4.0);
        assert_eq!(conn.out_of_stock_count().await.unwrap(), 2);

        let items = conn.top_purchased_items(&window).await.unwrap();
        assert_eq!(items[0].item_name, "HEX BOLT");
        assert_eq!(items[1].item_name, "BALL BEARING");
        assert_eq!(items[1].order_count, 2);
        assert_eq!(items[1].total_order_qty, 7.0);

        let vendors = conn.top_vendors(&window).await.unwrap();
        assert_eq!(vendors[0].vendor_name, "Acme Tools");
        assert_eq!(vendors[0].unique_po_count, 2);
    }

    #[tokio::test]
    async fn test_missing_view_is_query_failure() {
        let db = seeded(false).await;
        let mut conn = db.conn().await;
        let err = conn
            .issued_total(&ReportWindow::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "QUERY_FAILED");
    }
}
