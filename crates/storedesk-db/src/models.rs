//! Report row models
//!
//! List rows serialize with upper-case keys, the shape the UI consumes.
//! Dashboard pieces use camelCase.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use sqlx::any::AnyRow;

use crate::utils::{count, number, shift_timestamp, text, text_or_empty, upper};

/// Hours added to a purchase order's due date to get its planned time
pub const ORDER_PLANNED_OFFSET_HOURS: i64 = 20;
/// Days added to an indent's last update to get its planned time
pub const INDENT_PLANNED_OFFSET_DAYS: i64 = 3;

/// A purchase order line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct PurchaseOrder {
    pub planned_timestamp: Option<String>,
    pub indenter: String,
    pub indent_no: String,
    pub vrno: Option<String>,
    pub vrdate: Option<String>,
    pub vendor_name: Option<String>,
    pub item_name: Option<String>,
    pub qtyorder: f64,
    pub um: Option<String>,
    pub qtyexecute: f64,
    /// Only present on pending lines
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance_qty: Option<f64>,
}

impl PurchaseOrder {
    /// Attach the outstanding quantity
    pub fn with_balance(mut self) -> Self {
        self.balance_qty = Some(self.qtyorder - self.qtyexecute);
        self
    }
}

/// An indent line awaiting or past procurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Indent {
    pub plannedtimestamp: Option<String>,
    pub indent_number: Option<String>,
    pub indent_date: Option<String>,
    pub indenter_name: Option<String>,
    pub division: Option<String>,
    pub department: Option<String>,
    pub item_name: Option<String>,
    pub um: Option<String>,
    pub required_qty: f64,
    pub remark: Option<String>,
    pub specification: Option<String>,
    pub cost_project: Option<String>,
}

/// An indent that has been ordered or cancelled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct IndentHistory {
    #[serde(flatten)]
    pub indent: Indent,
    pub po_no: Option<String>,
    pub po_qty: f64,
    pub cancelleddate: Option<String>,
    pub cancelled_remark: Option<String>,
}

/// A repair gate pass that has gone out and not come back
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct GatePass {
    pub vrno: Option<String>,
    pub vrdate: Option<String>,
    pub department: Option<String>,
    pub partyname: Option<String>,
    pub item_name: Option<String>,
    pub qtyissued: f64,
    pub um: Option<String>,
    pub app_remark: Option<String>,
    pub remark: Option<String>,
}

/// A repaired item received back against a gate pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ReceivedGatePass {
    pub repair_gate_pass: Option<String>,
    pub receive_gate_pass: Option<String>,
    pub received_date: Option<String>,
    pub department: Option<String>,
    pub partyname: Option<String>,
    pub item_name: Option<String>,
    pub qtyrecd: f64,
    pub um: Option<String>,
    pub app_remark: Option<String>,
    pub remark: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatePassCounts {
    pub pending: i64,
    pub history: i64,
}

/// A stock item unit of measure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct UomItem {
    pub item_code: Option<String>,
    pub item_name: Option<String>,
    pub um: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct CostLocation {
    pub cost_name: Option<String>,
}

/// Indent counts for the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IndentStatusSummary {
    pub total: i64,
    pub completed: i64,
    pub pending: i64,
    pub upcoming: i64,
    pub overdue: i64,
    pub total_indented_qty: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PurchaseSummary {
    pub total_purchase_orders: i64,
    pub total_purchased_qty: f64,
}

/// Single aggregated value, read from a `total` column
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Total(pub f64);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopItem {
    pub item_name: String,
    pub order_count: i64,
    pub total_order_qty: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopVendor {
    pub vendor_name: String,
    pub unique_po_count: i64,
    pub total_items: f64,
}

// ==================== TryFrom Implementations ====================

impl TryFrom<&AnyRow> for PurchaseOrder {
    type Error = sqlx::Error;

    fn try_from(row: &AnyRow) -> Result<Self, Self::Error> {
        Ok(PurchaseOrder {
            planned_timestamp: shift_timestamp(
                text(row, "duedate")?.as_deref(),
                Duration::hours(ORDER_PLANNED_OFFSET_HOURS),
            ),
            indenter: text_or_empty(row, "indenter")?,
            indent_no: text_or_empty(row, "indent_no")?,
            vrno: text(row, "vrno")?,
            vrdate: text(row, "vrdate")?,
            vendor_name: text(row, "vendor_name")?,
            item_name: text(row, "item_name")?,
            qtyorder: number(row, "qtyorder")?,
            um: text(row, "um")?,
            qtyexecute: number(row, "qtyexecute")?,
            balance_qty: None,
        })
    }
}

impl TryFrom<&AnyRow> for Indent {
    type Error = sqlx::Error;

    fn try_from(row: &AnyRow) -> Result<Self, Self::Error> {
        Ok(Indent {
            plannedtimestamp: shift_timestamp(
                text(row, "lastupdate")?.as_deref(),
                Duration::days(INDENT_PLANNED_OFFSET_DAYS),
            ),
            indent_number: text(row, "indent_number")?,
            indent_date: text(row, "indent_date")?,
            indenter_name: text(row, "indenter_name")?,
            division: text(row, "division")?,
            department: text(row, "department")?,
            item_name: upper(text(row, "item_name")?),
            um: text(row, "um")?,
            required_qty: number(row, "required_qty")?,
            remark: text(row, "remark")?,
            specification: upper(text(row, "specification")?),
            cost_project: text(row, "cost_project")?,
        })
    }
}

impl TryFrom<&AnyRow> for IndentHistory {
    type Error = sqlx::Error;

    fn try_from(row: &AnyRow) -> Result<Self, Self::Error> {
        Ok(IndentHistory {
            indent: Indent::try_from(row)?,
            po_no: text(row, "po_no")?,
            po_qty: number(row, "po_qty")?,
            cancelleddate: text(row, "cancelleddate")?,
            cancelled_remark: text(row, "cancelled_remark")?,
        })
    }
}

impl TryFrom<&AnyRow> for GatePass {
    type Error = sqlx::Error;

    fn try_from(row: &AnyRow) -> Result<Self, Self::Error> {
        Ok(GatePass {
            vrno: text(row, "vrno")?,
            vrdate: text(row, "vrdate")?,
            department: text(row, "department")?,
            partyname: text(row, "partyname")?,
            item_name: text(row, "item_name")?,
            qtyissued: number(row, "qtyissued")?,
            um: text(row, "um")?,
            app_remark: text(row, "app_remark")?,
            remark: text(row, "remark")?,
        })
    }
}

impl TryFrom<&AnyRow> for ReceivedGatePass {
    type Error = sqlx::Error;

    fn try_from(row: &AnyRow) -> Result<Self, Self::Error> {
        Ok(ReceivedGatePass {
            repair_gate_pass: text(row, "repair_gate_pass")?,
            receive_gate_pass: text(row, "receive_gate_pass")?,
            received_date: text(row, "received_date")?,
            department: text(row, "department")?,
            partyname: text(row, "partyname")?,
            item_name: text(row, "item_name")?,
            qtyrecd: number(row, "qtyrecd")?,
            um: text(row, "um")?,
            app_remark: text(row, "app_remark")?,
            remark: text(row, "remark")?,
        })
    }
}

impl TryFrom<&AnyRow> for UomItem {
    type Error = sqlx::Error;

    fn try_from(row: &AnyRow) -> Result<Self, Self::Error> {
        Ok(UomItem {
            item_code: text(row, "item_code")?,
            item_name: text(row, "item_name")?,
            um: text(row, "um")?,
        })
    }
}

impl TryFrom<&AnyRow> for CostLocation {
    type Error = sqlx::Error;

    fn try_from(row: &AnyRow) -> Result<Self, Self::Error> {
        Ok(CostLocation {
            cost_name: text(row, "cost_name")?,
        })
    }
}

impl TryFrom<&AnyRow> for IndentStatusSummary {
    type Error = sqlx::Error;

    fn try_from(row: &AnyRow) -> Result<Self, Self::Error> {
        Ok(IndentStatusSummary {
            total: count(row, "total_indents")?,
            completed: count(row, "completed_indents")?,
            pending: count(row, "pending_indents")?,
            upcoming: count(row, "upcoming_indents")?,
            overdue: count(row, "overdue_indents")?,
            total_indented_qty: number(row, "total_indented_qty")?,
        })
    }
}

impl TryFrom<&AnyRow> for PurchaseSummary {
    type Error = sqlx::Error;

    fn try_from(row: &AnyRow) -> Result<Self, Self::Error> {
        Ok(PurchaseSummary {
            total_purchase_orders: count(row, "total_purchase_orders")?,
            total_purchased_qty: number(row, "total_purchased_qty")?,
        })
    }
}

impl TryFrom<&AnyRow> for Total {
    type Error = sqlx::Error;

    fn try_from(row: &AnyRow) -> Result<Self, Self::Error> {
        Ok(Total(number(row, "total")?))
    }
}

impl TryFrom<&AnyRow> for TopItem {
    type Error = sqlx::Error;

    fn try_from(row: &AnyRow) -> Result<Self, Self::Error> {
        Ok(TopItem {
            item_name: text_or_empty(row, "item_name")?,
            order_count: count(row, "order_count")?,
            total_order_qty: number(row, "total_order_qty")?,
        })
    }
}

impl TryFrom<&AnyRow> for TopVendor {
    type Error = sqlx::Error;

    fn try_from(row: &AnyRow) -> Result<Self, Self::Error> {
        Ok(TopVendor {
            vendor_name: text_or_empty(row, "vendor_name")?,
            unique_po_count: count(row, "unique_po_count")?,
            total_items: number(row, "total_items")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_indent() -> Indent {
        Indent {
            plannedtimestamp: Some("2025-04-04T09:00:00".into()),
            indent_number: Some("IN-1".into()),
            indent_date: Some("2025-04-01".into()),
            indenter_name: Some("Ravi".into()),
            division: Some("Plant".into()),
            department: Some("MAINTENANCE".into()),
            item_name: Some("BEARING".into()),
            um: Some("NOS".into()),
            required_qty: 4.0,
            remark: None,
            specification: Some("6205 ZZ".into()),
            cost_project: None,
        }
    }

    #[test]
    fn test_purchase_order_keys() {
        let order = PurchaseOrder {
            planned_timestamp: None,
            indenter: String::new(),
            indent_no: "IN-1".into(),
            vrno: Some("PO-9".into()),
            vrdate: Some("2025-04-02".into()),
            vendor_name: None,
            item_name: None,
            qtyorder: 10.0,
            um: None,
            qtyexecute: 4.0,
            balance_qty: None,
        };

        let json = serde_json::to_value(&order).unwrap();
        assert!(json.get("PLANNED_TIMESTAMP").is_some());
        assert!(json.get("QTYORDER").is_some());
        assert!(json.get("BALANCE_QTY").is_none());

        let json = serde_json::to_value(order.with_balance()).unwrap();
        assert_eq!(json["BALANCE_QTY"], 6.0);
    }

    #[test]
    fn test_indent_history_flattens() {
        let history = IndentHistory {
            indent: sample_indent(),
            po_no: Some("PO-1".into()),
            po_qty: 4.0,
            cancelleddate: None,
            cancelled_remark: None,
        };

        let json = serde_json::to_value(&history).unwrap();
        assert_eq!(json["INDENT_NUMBER"], "IN-1");
        assert_eq!(json["PO_NO"], "PO-1");
        assert!(json.get("CANCELLEDDATE").unwrap().is_null());

        let back: IndentHistory = serde_json::from_value(json).unwrap();
        assert_eq!(back, history);
    }

    #[test]
    fn test_top_item_is_camel_case() {
        let item = TopItem {
            item_name: "BEARING".into(),
            order_count: 3,
            total_order_qty: 12.0,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["itemName"], "BEARING");
        assert_eq!(json["orderCount"], 3);
        assert_eq!(json["totalOrderQty"], 12.0);
    }
}
