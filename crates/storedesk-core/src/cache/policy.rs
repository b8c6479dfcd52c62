//! Cache TTL classes

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Error type for parsing a TTL class name
#[derive(Debug, Clone)]
pub struct ParseTtlClassError(String);

impl fmt::Display for ParseTtlClassError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid TTL class: {}", self.0)
    }
}

impl std::error::Error for ParseTtlClassError {}

/// Expiry class shared by every key in a reporting domain
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TtlClass {
    PurchaseOrder,
    Indent,
    Dashboard,
    GatePass,
    /// Slow-changing item master data
    Uom,
    /// Slow-changing cost centre data
    CostLocation,
}

impl TtlClass {
    pub const ALL: [TtlClass; 6] = [
        TtlClass::PurchaseOrder,
        TtlClass::Indent,
        TtlClass::Dashboard,
        TtlClass::GatePass,
        TtlClass::Uom,
        TtlClass::CostLocation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TtlClass::PurchaseOrder => "purchase_order",
            TtlClass::Indent => "indent",
            TtlClass::Dashboard => "dashboard",
            TtlClass::GatePass => "gate_pass",
            TtlClass::Uom => "uom",
            TtlClass::CostLocation => "cost_location",
        }
    }

    /// Built-in expiry in seconds
    pub fn default_secs(&self) -> u64 {
        match self {
            TtlClass::PurchaseOrder => 180,
            TtlClass::Indent => 180,
            TtlClass::Dashboard => 120,
            TtlClass::GatePass => 180,
            TtlClass::Uom => 3600,
            TtlClass::CostLocation => 1800,
        }
    }
}

impl FromStr for TtlClass {
    type Err = ParseTtlClassError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "purchase_order" | "po" => Ok(TtlClass::PurchaseOrder),
            "indent" => Ok(TtlClass::Indent),
            "dashboard" => Ok(TtlClass::Dashboard),
            "gate_pass" | "gatepass" => Ok(TtlClass::GatePass),
            "uom" => Ok(TtlClass::Uom),
            "cost_location" | "costlocation" => Ok(TtlClass::CostLocation),
            _ => Err(ParseTtlClassError(s.to_string())),
        }
    }
}

/// TTL per class, with configured overrides
#[derive(Debug, Clone, Default)]
pub struct TtlPolicy {
    overrides: HashMap<TtlClass, u64>,
}

impl TtlPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a `class name -> seconds` table
    pub fn from_table(table: &HashMap<String, u64>) -> Result<Self, ParseTtlClassError> {
        let mut policy = Self::new();
        for (name, secs) in table {
            policy = policy.with_override(name.parse()?, *secs);
        }
        Ok(policy)
    }

    /// Override a class; `0` disables expiry
    pub fn with_override(mut self, class: TtlClass, secs: u64) -> Self {
        self.overrides.insert(class, secs);
        self
    }

    /// Expiry for a class; `None` means keep until invalidated
    pub fn ttl(&self, class: TtlClass) -> Option<Duration> {
        let secs = self
            .overrides
            .get(&class)
            .copied()
            .unwrap_or_else(|| class.default_secs());
        (secs > 0).then(|| Duration::from_secs(secs))
    }
}
