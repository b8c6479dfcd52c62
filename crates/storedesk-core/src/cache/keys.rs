//! Cache key builders

pub const PO_PENDING: &str = "po:pending";
pub const PO_HISTORY: &str = "po:history";
pub const INDENT_PENDING: &str = "indent:pending";
pub const INDENT_HISTORY: &str = "indent:history";
pub const INDENT_DASHBOARD: &str = "indent:dashboard";
pub const GATE_PASS_PENDING: &str = "gatepass:pending";
pub const GATE_PASS_RECEIVED: &str = "gatepass:received";
pub const GATE_PASS_COUNTS: &str = "gatepass:counts";
pub const UOM_ITEMS: &str = "uom:items";

pub fn cost_locations(division: &str) -> String {
    format!("costlocation:{}", division)
}

/// Pattern covering every key of a domain prefix
pub fn domain_pattern(prefix: &str) -> String {
    format!("{}:*", prefix)
}
