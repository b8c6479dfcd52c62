//! Seed data for exercising the report queries against SQLite.
//!
//! Available to this crate's tests and, through the `fixtures` feature,
//! to downstream crates' tests. Dates are laid out relative to `today` so
//! the dashboard's upcoming/overdue buckets are stable.
//!
//! Seeded totals (window from 2025-04-01):
//! - indents: 4 in window (1 completed, 2 pending, 1 cancelled), 1 upcoming,
//!   1 overdue, 23 units indented
//! - purchase orders: 1 pending line (balance 6), 3 completed lines
//!   totalling 15 units, 1 cancelled line
//! - issues: 4 units; out of stock: 2 items
//! - gate passes: 2 pending, 1 received
//! - item master: 2 active stock items; cost centres: 1 shared, 1 per SM/RP

use chrono::NaiveDate;

use crate::error::DbError;
use crate::reports::{days_before, format_date};
use crate::store::StoreConnection;

const SCHEMA: &[&str] = &[
    r#"CREATE TABLE view_indent_engine (
        entity_code TEXT, vrno TEXT, vrdate TEXT, lastupdate TEXT,
        indent_remark TEXT, division_name TEXT, department_name TEXT,
        item_name TEXT, um TEXT, qtyindent REAL, purpose_remark TEXT,
        remark TEXT, cost_project TEXT, po_no TEXT, po_qty REAL,
        cancelleddate TEXT, cancelled_remark TEXT
    )"#,
    r#"CREATE TABLE view_order_engine (
        entity_code TEXT, series TEXT, vrno TEXT, vrdate TEXT, duedate TEXT,
        indent_vrno TEXT, vendor_name TEXT, item_name TEXT, um TEXT,
        qtyorder REAL, qtyexecute REAL, qtycancelled REAL
    )"#,
    r#"CREATE TABLE view_itemtran_engine (
        entity_code TEXT, series TEXT, vrno TEXT, vrdate TEXT, ref1_vrno TEXT,
        department_name TEXT, party_name TEXT, item_name TEXT, um TEXT,
        qtyissued REAL, qtyrecd REAL, app_remark TEXT, remark TEXT
    )"#,
    r#"CREATE TABLE view_item_stock_engine (
        entity_code TEXT, item_nature TEXT, yrclqty_engine REAL, yropaqty REAL
    )"#,
    r#"CREATE TABLE item_mast (
        item_code TEXT, item_name TEXT, um TEXT, item_nature TEXT, item_status TEXT
    )"#,
    r#"CREATE TABLE view_cost_mast (
        entity_code TEXT, div_code TEXT, cost_name TEXT
    )"#,
];

const ISSUE_SCHEMA: &str = r#"CREATE TABLE view_issue_engine (
    entity_code TEXT, vrdate TEXT, qtyissue REAL
)"#;

/// Create the reporting tables. `with_issues = false` leaves out the
/// issue view so best-effort sub-queries fail.
pub async fn create_schema(conn: &mut StoreConnection, with_issues: bool) -> Result<(), DbError> {
    for statement in SCHEMA {
        conn.execute(statement, &[]).await?;
    }
    if with_issues {
        conn.execute(ISSUE_SCHEMA, &[]).await?;
    }
    Ok(())
}

/// Insert the standard dataset described in the module docs
pub async fn seed(
    conn: &mut StoreConnection,
    today: NaiveDate,
    with_issues: bool,
) -> Result<(), DbError> {
    let day = |n: u64| format_date(days_before(today, n));

    let indents = [
        format!(
            "('SR', 'IN-1', '{}', '2025-04-01 09:00:00', 'Ravi', 'Plant', 'stores', \
             'ball bearing', 'NOS', 4, 'urgent', '6205 zz', 'CP-1', NULL, NULL, NULL, NULL)",
            day(2)
        ),
        format!(
            "('SR', 'IN-2', '{}', NULL, 'Meena', 'Plant', 'maintenance', \
             'hex bolt', 'NOS', 6, NULL, NULL, NULL, NULL, NULL, NULL, NULL)",
            day(40)
        ),
        format!(
            "('SR', 'IN-3', '{}', '{} 08:00:00', 'Ravi', 'Plant', 'stores', \
             'ball bearing', 'NOS', 10, NULL, 'sealed', NULL, 'PO-1', 10, NULL, NULL)",
            day(15),
            day(15)
        ),
        format!(
            "('SR', 'IN-4', '{}', NULL, 'Arun', 'Plant', 'stores', \
             'gasket', 'NOS', 3, NULL, NULL, NULL, NULL, NULL, '{}', 'duplicate')",
            day(20),
            day(18)
        ),
        "('SR', 'IN-0', '2024-12-01', NULL, 'Arun', 'Plant', 'stores', \
         'gasket', 'NOS', 99, NULL, NULL, NULL, NULL, NULL, NULL, NULL)"
            .to_string(),
    ];
    conn.execute(
        &format!("INSERT INTO view_indent_engine VALUES {}", indents.join(", ")),
        &[],
    )
    .await?;

    let orders = [
        format!(
            "('SR', 'U3', 'PO-1', '{}', '2025-05-01 10:00:00', 'IN-3', 'Acme Tools', \
             'Ball Bearing', 'NOS', 10, 4, NULL)",
            day(10)
        ),
        format!(
            "('SR', 'U3', 'PO-2', '{}', NULL, NULL, 'Acme Tools', 'ball bearing', 'NOS', 5, 5, NULL)",
            day(9)
        ),
        format!(
            "('SR', 'U3', 'PO-3', '{}', NULL, NULL, 'Bolt Co', 'Hex Bolt', 'NOS', 8, 8, NULL)",
            day(8)
        ),
        format!(
            "('SR', 'U3', 'PO-5', '{}', NULL, NULL, 'Acme Tools', 'BALL BEARING', 'NOS', 2, 2, NULL)",
            day(7)
        ),
        format!(
            "('SR', 'U3', 'PO-4', '{}', NULL, NULL, 'Bolt Co', 'Hex Bolt', 'NOS', 3, 0, 3)",
            day(6)
        ),
    ];
    conn.execute(
        &format!("INSERT INTO view_order_engine VALUES {}", orders.join(", ")),
        &[],
    )
    .await?;

    let gate_passes = [
        format!(
            "('SR', 'P3', 'P3-001', '{}', NULL, 'maintenance', 'Fixit Works', 'Motor', 'NOS', 1, NULL, 'ok', NULL)",
            day(5)
        ),
        format!(
            "('SR', 'P3', 'P3-002', '{}', NULL, 'maintenance', 'Fixit Works', 'Pump', 'NOS', 1, NULL, 'ok', NULL)",
            day(12)
        ),
        format!(
            "('SR', 'P3', 'P3-003', '{}', NULL, 'stores', 'Rewind Co', 'Coil', 'NOS', 2, NULL, NULL, NULL)",
            day(3)
        ),
        format!(
            "('SR', 'A3', 'A3-001', '{}', 'P3-002', 'maintenance', 'Fixit Works', 'Pump', 'NOS', NULL, 1, 'ok', 'repaired')",
            day(1)
        ),
    ];
    conn.execute(
        &format!("INSERT INTO view_itemtran_engine VALUES {}", gate_passes.join(", ")),
        &[],
    )
    .await?;

    conn.execute(
        "INSERT INTO view_item_stock_engine VALUES \
         ('SR', 'SI', 0, 5), ('SR', 'SI', -1, 2), ('SR', 'SI', 4, 5), ('SR', 'FG', 0, 5)",
        &[],
    )
    .await?;

    conn.execute(
        "INSERT INTO item_mast VALUES \
         ('1001', 'BALL BEARING', 'NOS', 'SI', 'A'), \
         ('1002', 'HEX BOLT', 'NOS', 'SI', 'A'), \
         ('1003', 'OLD VALVE', 'NOS', 'SI', 'C'), \
         ('2001', 'FINISHED PART', 'NOS', 'FG', 'A')",
        &[],
    )
    .await?;

    conn.execute(
        "INSERT INTO view_cost_mast VALUES \
         ('SR', NULL, 'Common Store'), ('SR', 'SM', 'SM Workshop'), ('SR', 'RP', 'RP Yard')",
        &[],
    )
    .await?;

    if with_issues {
        let issues = format!(
            "INSERT INTO view_issue_engine VALUES ('SR', '{}', 2.5), ('SR', '{}', 1.5), ('SR', '2024-01-01', 50)",
            day(4),
            day(3)
        );
        conn.execute(&issues, &[]).await?;
    }

    Ok(())
}

/// Drop the stock view so the out-of-stock count can no longer be read
pub async fn drop_stock_view(conn: &mut StoreConnection) -> Result<(), DbError> {
    conn.execute("DROP TABLE view_item_stock_engine", &[]).await?;
    Ok(())
}
