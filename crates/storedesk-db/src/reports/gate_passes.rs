//! Repair gate pass reports

use crate::error::DbError;
use crate::models::{GatePass, ReceivedGatePass, Total};
use crate::store::StoreConnection;

// Outgoing repair passes carry a P3 prefix; the receipt against one is an
// A3 voucher pointing back through ref1_vrno.
const PENDING_GATE_PASSES: &str = r#"
    SELECT
        t.vrno AS vrno,
        CAST(t.vrdate AS TEXT) AS vrdate,
        t.department_name AS department,
        t.party_name AS partyname,
        t.item_name AS item_name,
        CAST(t.qtyissued AS DOUBLE PRECISION) AS qtyissued,
        t.um AS um,
        t.app_remark AS app_remark,
        t.remark AS remark
    FROM view_itemtran_engine t
    WHERE t.entity_code = 'SR'
      AND SUBSTR(t.vrno, 1, 2) = 'P3'
      AND t.vrno NOT IN (
          SELECT r.ref1_vrno
          FROM view_itemtran_engine r
          WHERE r.entity_code = 'SR'
            AND SUBSTR(r.vrno, 1, 2) = 'A3'
            AND r.ref1_vrno IS NOT NULL
      )
    ORDER BY t.vrdate DESC, t.vrno DESC
"#;

const RECEIVED_GATE_PASSES: &str = r#"
    SELECT
        t.ref1_vrno AS repair_gate_pass,
        t.vrno AS receive_gate_pass,
        CAST(t.vrdate AS TEXT) AS received_date,
        t.department_name AS department,
        t.party_name AS partyname,
        t.item_name AS item_name,
        CAST(t.qtyrecd AS DOUBLE PRECISION) AS qtyrecd,
        t.um AS um,
        t.app_remark AS app_remark,
        t.remark AS remark
    FROM view_itemtran_engine t
    WHERE t.entity_code = 'SR'
      AND t.series = 'A3'
    ORDER BY t.vrdate DESC, t.vrno DESC
"#;

const PENDING_GATE_PASS_COUNT: &str = r#"
    SELECT COUNT(*) AS total
    FROM view_itemtran_engine t
    WHERE t.entity_code = 'SR'
      AND SUBSTR(t.vrno, 1, 2) = 'P3'
      AND t.vrno NOT IN (
          SELECT r.ref1_vrno
          FROM view_itemtran_engine r
          WHERE r.entity_code = 'SR'
            AND SUBSTR(r.vrno, 1, 2) = 'A3'
            AND r.ref1_vrno IS NOT NULL
      )
"#;

const RECEIVED_GATE_PASS_COUNT: &str = r#"
    SELECT COUNT(*) AS total
    FROM view_itemtran_engine t
    WHERE t.entity_code = 'SR'
      AND t.series = 'A3'
"#;

impl StoreConnection {
    pub async fn pending_gate_passes(&mut self) -> Result<Vec<GatePass>, DbError> {
        self.fetch_all_as(PENDING_GATE_PASSES, &[]).await
    }

    pub async fn received_gate_passes(&mut self) -> Result<Vec<ReceivedGatePass>, DbError> {
        self.fetch_all_as(RECEIVED_GATE_PASSES, &[]).await
    }

    pub async fn count_pending_gate_passes(&mut self) -> Result<i64, DbError> {
        let Total(total) = self.fetch_one_as(PENDING_GATE_PASS_COUNT, &[]).await?;
        Ok(total as i64)
    }

    pub async fn count_received_gate_passes(&mut self) -> Result<i64, DbError> {
        let Total(total) = self.fetch_one_as(RECEIVED_GATE_PASS_COUNT, &[]).await?;
        Ok(total as i64)
    }
}
