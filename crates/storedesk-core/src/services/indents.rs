//! Store indent lists

use storedesk_db::{Indent, IndentHistory};

use super::{QueryContext, RowSet};
use crate::cache::{TtlClass, keys};
use crate::error::CoreError;

#[derive(Clone)]
pub struct IndentService {
    ctx: QueryContext,
}

impl IndentService {
    pub fn new(ctx: QueryContext) -> Self {
        Self { ctx }
    }

    pub async fn pending(&self) -> Result<RowSet<Indent>, CoreError> {
        self.ctx
            .fetch_rows(keys::INDENT_PENDING, TtlClass::Indent, |mut conn, window| async move {
                conn.pending_indents(&window).await
            })
            .await
    }

    pub async fn history(&self) -> Result<RowSet<IndentHistory>, CoreError> {
        self.ctx
            .fetch_rows(keys::INDENT_HISTORY, TtlClass::Indent, |mut conn, window| async move {
                conn.indent_history(&window).await
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::harness;

    #[tokio::test]
    async fn test_pending_and_history() {
        let h = harness(true).await;
        let service = IndentService::new(h.ctx.clone());

        let pending = service.pending().await.unwrap();
        assert_eq!(pending.total, 2);
        assert!(pending
            .rows
            .iter()
            .all(|i| i.department.as_deref().is_some_and(|d| d == d.to_uppercase())));

        let history = service.history().await.unwrap();
        assert_eq!(history.total, 1);
        assert_eq!(history.rows[0].indent.item_name.as_deref(), Some("BALL BEARING"));
    }
}
