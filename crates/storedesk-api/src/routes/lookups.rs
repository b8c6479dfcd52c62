//! Master data lookups

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;
use storedesk_core::Division;
use storedesk_db::{CostLocation, UomItem};

use super::ApiResponse;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct CostLocationQuery {
    #[serde(rename = "divCode")]
    div_code: Option<String>,
}

/// GET /api/uom
async fn uom(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<UomItem>>>, ApiError> {
    Ok(ApiResponse::rows(state.services.uom.items().await?))
}

/// GET /api/cost-location?divCode=SM
async fn cost_locations(
    State(state): State<AppState>,
    Query(query): Query<CostLocationQuery>,
) -> Result<Json<ApiResponse<Vec<CostLocation>>>, ApiError> {
    let division = match query.div_code.as_deref().map(str::trim) {
        None | Some("") => Division::default(),
        Some(code) => code.parse()?,
    };
    Ok(ApiResponse::rows(
        state.services.cost_locations.locations(division).await?,
    ))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/uom", get(uom))
        .route("/api/cost-location", get(cost_locations))
}
