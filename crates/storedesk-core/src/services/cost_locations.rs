//! Cost centre lookups per division

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use storedesk_db::CostLocation;

use super::{QueryContext, RowSet};
use crate::cache::{TtlClass, keys};
use crate::error::CoreError;

/// Company division a cost centre can belong to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Division {
    #[default]
    Sm,
    Rp,
    Pm,
    Co,
}

impl Division {
    pub const ALL: [Division; 4] = [Division::Sm, Division::Rp, Division::Pm, Division::Co];

    pub fn as_str(&self) -> &'static str {
        match self {
            Division::Sm => "SM",
            Division::Rp => "RP",
            Division::Pm => "PM",
            Division::Co => "CO",
        }
    }
}

impl fmt::Display for Division {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Division {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "SM" => Ok(Division::Sm),
            "RP" => Ok(Division::Rp),
            "PM" => Ok(Division::Pm),
            "CO" => Ok(Division::Co),
            _ => Err(CoreError::InvalidParameter(format!(
                "Unknown division code: {}",
                s
            ))),
        }
    }
}

#[derive(Clone)]
pub struct CostLocationService {
    ctx: QueryContext,
}

impl CostLocationService {
    pub fn new(ctx: QueryContext) -> Self {
        Self { ctx }
    }

    /// Shared cost centres plus those owned by `division`
    pub async fn locations(&self, division: Division) -> Result<RowSet<CostLocation>, CoreError> {
        let key = keys::cost_locations(division.as_str());
        self.ctx
            .fetch_rows(&key, TtlClass::CostLocation, |mut conn, _| async move {
                conn.cost_locations(division.as_str()).await
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::harness;

    #[test]
    fn test_division_parsing() {
        for division in Division::ALL {
            assert_eq!(division.as_str().parse::<Division>().unwrap(), division);
        }
        assert_eq!("rp".parse::<Division>().unwrap(), Division::Rp);
        assert_eq!(Division::default(), Division::Sm);

        let err = "XX".parse::<Division>().unwrap_err();
        assert_eq!(err.code(), "INVALID_PARAMETER");
    }

    #[tokio::test]
    async fn test_each_division_has_its_own_key() {
        let h = harness(true).await;
        let service = CostLocationService::new(h.ctx.clone());

        let sm = service.locations(Division::Sm).await.unwrap();
        let names: Vec<_> = sm.rows.iter().filter_map(|r| r.cost_name.as_deref()).collect();
        assert_eq!(names, vec!["Common Store", "SM Workshop"]);

        let co = service.locations(Division::Co).await.unwrap();
        assert_eq!(co.total, 1);

        h.ctx.cache().flush().await;
        let client = h.ctx.cache().client();
        assert!(client.get("costlocation:SM").await.is_some());
        assert!(client.get("costlocation:CO").await.is_some());
        assert!(client.get("costlocation:RP").await.is_none());
    }
}
