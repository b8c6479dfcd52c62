//! Unit of measure lookup

use storedesk_db::UomItem;

use super::{QueryContext, RowSet};
use crate::cache::{TtlClass, keys};
use crate::error::CoreError;

#[derive(Clone)]
pub struct UomService {
    ctx: QueryContext,
}

impl UomService {
    pub fn new(ctx: QueryContext) -> Self {
        Self { ctx }
    }

    pub async fn items(&self) -> Result<RowSet<UomItem>, CoreError> {
        self.ctx
            .fetch_rows(keys::UOM_ITEMS, TtlClass::Uom, |mut conn, _| async move {
                conn.uom_items().await
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::harness;

    #[tokio::test]
    async fn test_items() {
        let h = harness(true).await;
        let items = UomService::new(h.ctx.clone()).items().await.unwrap();
        assert_eq!(items.total, 2);
        assert_eq!(items.rows[1].item_name.as_deref(), Some("HEX BOLT"));
    }
}
