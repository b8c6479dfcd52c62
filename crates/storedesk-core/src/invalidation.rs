//! Cache invalidation hooks
//!
//! Called after writes to a reporting domain, or on demand from the admin
//! endpoint, so the next read recomputes instead of serving stale rows.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cache::{CacheClient, keys};
use crate::error::CoreError;

/// Key prefix shared by every entry of one reporting domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheDomain {
    Po,
    Indent,
    GatePass,
    Uom,
    CostLocation,
}

impl CacheDomain {
    pub const ALL: [CacheDomain; 5] = [
        CacheDomain::Po,
        CacheDomain::Indent,
        CacheDomain::GatePass,
        CacheDomain::Uom,
        CacheDomain::CostLocation,
    ];

    pub fn prefix(&self) -> &'static str {
        match self {
            CacheDomain::Po => "po",
            CacheDomain::Indent => "indent",
            CacheDomain::GatePass => "gatepass",
            CacheDomain::Uom => "uom",
            CacheDomain::CostLocation => "costlocation",
        }
    }
}

impl fmt::Display for CacheDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

impl FromStr for CacheDomain {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "po" => Ok(CacheDomain::Po),
            "indent" | "storeindent" => Ok(CacheDomain::Indent),
            "gatepass" | "repairgatepass" => Ok(CacheDomain::GatePass),
            "uom" => Ok(CacheDomain::Uom),
            "costlocation" => Ok(CacheDomain::CostLocation),
            _ => Err(CoreError::InvalidParameter(format!(
                "Unknown cache domain: {}",
                s
            ))),
        }
    }
}

#[derive(Clone)]
pub struct CacheInvalidator {
    client: Arc<CacheClient>,
}

impl CacheInvalidator {
    pub fn new(client: Arc<CacheClient>) -> Self {
        Self { client }
    }

    /// Drop every cached entry of `domain`, returning how many went
    pub async fn invalidate_domain(&self, domain: CacheDomain) -> u64 {
        let removed = self
            .client
            .delete(&keys::domain_pattern(domain.prefix()))
            .await;
        info!("Invalidated {} cached entries for {}", removed, domain);
        removed
    }

    /// Drop the indent lists and the dashboard built from them
    pub async fn invalidate_indents(&self) -> u64 {
        let (pending, history, dashboard) = tokio::join!(
            self.client.delete(keys::INDENT_PENDING),
            self.client.delete(keys::INDENT_HISTORY),
            self.client.delete(keys::INDENT_DASHBOARD),
        );
        pending + history + dashboard
    }
}
