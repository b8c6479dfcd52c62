//! Store indent reports

use super::ReportWindow;
use crate::error::DbError;
use crate::models::{Indent, IndentHistory};
use crate::store::StoreConnection;
use crate::utils::upper;

const PENDING_INDENTS: &str = r#"
    SELECT
        CAST(t.lastupdate AS TEXT) AS lastupdate,
        t.vrno AS indent_number,
        CAST(t.vrdate AS TEXT) AS indent_date,
        t.indent_remark AS indenter_name,
        t.division_name AS division,
        t.department_name AS department,
        t.item_name AS item_name,
        t.um AS um,
        CAST(t.qtyindent AS DOUBLE PRECISION) AS required_qty,
        t.purpose_remark AS remark,
        t.remark AS specification,
        t.cost_project AS cost_project
    FROM view_indent_engine t
    WHERE t.entity_code = 'SR'
      AND t.po_no IS NULL
      AND t.cancelleddate IS NULL
      AND CAST(t.vrdate AS TEXT) >= $1
    ORDER BY t.vrdate ASC, t.vrno ASC
"#;

const INDENT_HISTORY: &str = r#"
    SELECT
        CAST(t.lastupdate AS TEXT) AS lastupdate,
        t.vrno AS indent_number,
        CAST(t.vrdate AS TEXT) AS indent_date,
        t.indent_remark AS indenter_name,
        t.division_name AS division,
        t.department_name AS department,
        t.item_name AS item_name,
        t.um AS um,
        CAST(t.qtyindent AS DOUBLE PRECISION) AS required_qty,
        t.purpose_remark AS remark,
        t.remark AS specification,
        t.cost_project AS cost_project,
        t.po_no AS po_no,
        CAST(t.po_qty AS DOUBLE PRECISION) AS po_qty,
        CAST(t.cancelleddate AS TEXT) AS cancelleddate,
        t.cancelled_remark AS cancelled_remark
    FROM view_indent_engine t
    WHERE t.entity_code = 'SR'
      AND t.po_no IS NOT NULL
      AND CAST(t.vrdate AS TEXT) >= $1
    ORDER BY t.vrdate ASC, t.vrno ASC
"#;

impl StoreConnection {
    /// Indents with no purchase order and not cancelled
    pub async fn pending_indents(
        &mut self,
        window: &ReportWindow,
    ) -> Result<Vec<Indent>, DbError> {
        let from = window.from_bind();
        let rows: Vec<Indent> = self.fetch_all_as(PENDING_INDENTS, &[&from]).await?;
        Ok(rows
            .into_iter()
            .map(|mut indent| {
                indent.department = upper(indent.department.take());
                indent
            })
            .collect())
    }

    /// Indents that have been turned into purchase orders
    pub async fn indent_history(
        &mut self,
        window: &ReportWindow,
    ) -> Result<Vec<IndentHistory>, DbError> {
        let from = window.from_bind();
        self.fetch_all_as(INDENT_HISTORY, &[&from]).await
    }
}
