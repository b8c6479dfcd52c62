//! Repair gate pass routes

use axum::{Json, Router, extract::State, routing::get};
use storedesk_db::{GatePass, GatePassCounts, ReceivedGatePass};

use super::ApiResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/repair-gate-pass/pending
async fn pending(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<GatePass>>>, ApiError> {
    Ok(ApiResponse::rows(state.services.gate_passes.pending().await?))
}

/// GET /api/repair-gate-pass/received (also served as /history)
async fn received(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ReceivedGatePass>>>, ApiError> {
    Ok(ApiResponse::rows(state.services.gate_passes.received().await?))
}

/// GET /api/repair-gate-pass/counts
async fn counts(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<GatePassCounts>>, ApiError> {
    Ok(ApiResponse::ok(state.services.gate_passes.counts().await?))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/repair-gate-pass/pending", get(pending))
        .route("/api/repair-gate-pass/received", get(received))
        .route("/api/repair-gate-pass/history", get(received))
        .route("/api/repair-gate-pass/counts", get(counts))
}
