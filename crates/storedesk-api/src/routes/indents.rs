//! Store indent routes

use axum::{Json, Router, extract::State, routing::get};
use storedesk_core::DashboardMetrics;
use storedesk_db::{Indent, IndentHistory};

use super::ApiResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/store-indent/pending
async fn pending(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Indent>>>, ApiError> {
    Ok(ApiResponse::rows(state.services.indents.pending().await?))
}

/// GET /api/store-indent/history
async fn history(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<IndentHistory>>>, ApiError> {
    Ok(ApiResponse::rows(state.services.indents.history().await?))
}

/// GET /api/store-indent/dashboard
async fn dashboard(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<DashboardMetrics>>, ApiError> {
    Ok(ApiResponse::ok(state.services.dashboard.metrics().await?))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/store-indent/pending", get(pending))
        .route("/api/store-indent/history", get(history))
        .route("/api/store-indent/dashboard", get(dashboard))
}
