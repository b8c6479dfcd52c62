//! Item master and cost centre lookups

use crate::error::DbError;
use crate::models::{CostLocation, UomItem};
use crate::store::StoreConnection;

const UOM_ITEMS: &str = r#"
    SELECT
        t.item_code AS item_code,
        t.item_name AS item_name,
        t.um AS um
    FROM item_mast t
    WHERE t.item_nature = 'SI'
      AND t.item_status <> 'C'
    ORDER BY t.item_name
"#;

const DIVISION_COST_LOCATIONS: &str = r#"
    SELECT DISTINCT t.cost_name AS cost_name
    FROM view_cost_mast t
    WHERE t.entity_code = 'SR'
      AND (t.div_code IS NULL OR t.div_code = $1)
    ORDER BY cost_name
"#;

impl StoreConnection {
    /// Stock items with their unit of measure
    pub async fn uom_items(&mut self) -> Result<Vec<UomItem>, DbError> {
        self.fetch_all_as(UOM_ITEMS, &[]).await
    }

    /// Cost centres shared by all divisions plus those of `division`
    pub async fn cost_locations(&mut self, division: &str) -> Result<Vec<CostLocation>, DbError> {
        self.fetch_all_as(DIVISION_COST_LOCATIONS, &[division]).await
    }
}
