//! Purchase order routes

use axum::{Json, Router, extract::State, routing::get};
use storedesk_db::PurchaseOrder;

use super::ApiResponse;
use crate::error::ApiError;
use crate::state::AppState;

type Rows = Json<ApiResponse<Vec<PurchaseOrder>>>;

/// GET /api/po/pending
async fn pending(State(state): State<AppState>) -> Result<Rows, ApiError> {
    Ok(ApiResponse::rows(state.services.orders.pending().await?))
}

/// GET /api/po/history
async fn history(State(state): State<AppState>) -> Result<Rows, ApiError> {
    Ok(ApiResponse::rows(state.services.orders.history().await?))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/po/pending", get(pending))
        .route("/api/po/history", get(history))
}

#[cfg(test)]
mod tests {
    use crate::routes::testing::{seeded_app, unconfigured_app};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_pending_envelope() {
        let app = seeded_app().await;
        let (status, body) = app.get("/api/po/pending").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["total"], 1);
        assert_eq!(body["data"][0]["VRNO"], "PO-1");
        assert_eq!(body["data"][0]["BALANCE_QTY"], 6.0);
    }

    #[tokio::test]
    async fn test_history_has_no_balance() {
        let app = seeded_app().await;
        let (status, body) = app.get("/api/po/history").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 3);
        assert!(body["data"][0].get("BALANCE_QTY").is_none());
    }

    #[tokio::test]
    async fn test_unconfigured_store_is_503() {
        let app = unconfigured_app().await;
        let (status, body) = app.get("/api/po/pending").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "NOT_CONFIGURED");
    }
}
