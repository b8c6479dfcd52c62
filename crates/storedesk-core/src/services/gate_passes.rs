//! Repair gate pass lists and counts

use storedesk_db::{GatePass, GatePassCounts, ReceivedGatePass};

use super::{QueryContext, RowSet};
use crate::cache::{TtlClass, keys};
use crate::error::CoreError;

#[derive(Clone)]
pub struct GatePassService {
    ctx: QueryContext,
}

impl GatePassService {
    pub fn new(ctx: QueryContext) -> Self {
        Self { ctx }
    }

    /// Items sent out for repair and not yet back
    pub async fn pending(&self) -> Result<RowSet<GatePass>, CoreError> {
        self.ctx
            .fetch_rows(keys::GATE_PASS_PENDING, TtlClass::GatePass, |mut conn, _| async move {
                conn.pending_gate_passes().await
            })
            .await
    }

    /// Items received back from repair
    pub async fn received(&self) -> Result<RowSet<ReceivedGatePass>, CoreError> {
        self.ctx
            .fetch_rows(keys::GATE_PASS_RECEIVED, TtlClass::GatePass, |mut conn, _| async move {
                conn.received_gate_passes().await
            })
            .await
    }

    /// Both counts, each on its own connection
    pub async fn counts(&self) -> Result<GatePassCounts, CoreError> {
        self.ctx
            .cached(keys::GATE_PASS_COUNTS, TtlClass::GatePass, || async {
                let (pending, history) = tokio::try_join!(
                    async {
                        let mut conn = self.ctx.connection().await?;
                        Ok::<_, CoreError>(conn.count_pending_gate_passes().await?)
                    },
                    async {
                        let mut conn = self.ctx.connection().await?;
                        Ok::<_, CoreError>(conn.count_received_gate_passes().await?)
                    },
                )?;
                Ok::<_, CoreError>(GatePassCounts { pending, history })
            })
            .await
    }
}
