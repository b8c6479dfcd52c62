//! Cache administration routes

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get},
};
use serde::Serialize;
use storedesk_core::CacheDomain;
use tracing::info;

use super::ApiResponse;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatsResponse {
    pub backend: &'static str,
    pub enabled: bool,
    pub live: bool,
    pub hits: u64,
    pub misses: u64,
    pub write_failures: u64,
    pub hit_rate: f64,
}

#[derive(Debug, Serialize)]
pub struct InvalidateResponse {
    pub domain: CacheDomain,
    pub removed: u64,
}

/// GET /api/cache/stats
async fn cache_stats(State(state): State<AppState>) -> Json<ApiResponse<CacheStatsResponse>> {
    let client = state.cache.client();
    let stats = state.cache.stats();

    ApiResponse::ok(CacheStatsResponse {
        backend: client.backend_name(),
        enabled: client.is_enabled(),
        live: client.is_live(),
        hits: stats.hits,
        misses: stats.misses,
        write_failures: stats.write_failures,
        hit_rate: stats.hit_rate(),
    })
}

/// DELETE /api/cache/{domain}
async fn invalidate(
    State(state): State<AppState>,
    Path(domain): Path<String>,
) -> Result<Json<ApiResponse<InvalidateResponse>>, ApiError> {
    let domain: CacheDomain = domain.parse()?;
    info!("Invalidating cache domain {}", domain);

    let removed = state.services.invalidator.invalidate_domain(domain).await;
    Ok(ApiResponse::ok(InvalidateResponse { domain, removed }))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/cache/stats", get(cache_stats))
        .route("/api/cache/{domain}", delete(invalidate))
}

#[cfg(test)]
mod tests {
    use crate::routes::testing::seeded_app;
    use axum::http::{Method, StatusCode};

    #[tokio::test]
    async fn test_stats_track_hits() {
        let app = seeded_app().await;
        app.get("/api/uom").await;
        app.state.cache.flush().await;
        app.get("/api/uom").await;

        let (status, body) = app.get("/api/cache/stats").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["backend"], "memory");
        assert_eq!(body["data"]["live"], true);
        assert_eq!(body["data"]["hits"], 1);
        assert_eq!(body["data"]["misses"], 1);
        assert_eq!(body["data"]["hitRate"], 0.5);
    }

    #[tokio::test]
    async fn test_invalidate_domain() {
        let app = seeded_app().await;
        app.get("/api/po/pending").await;
        app.get("/api/po/history").await;
        app.get("/api/uom").await;
        app.state.cache.flush().await;

        let (status, body) = app.call(Method::DELETE, "/api/cache/po").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["domain"], "po");
        assert_eq!(body["data"]["removed"], 2);

        let client = app.state.cache.client();
        assert!(client.get("po:pending").await.is_none());
        assert!(client.get("uom:items").await.is_some());
    }

    #[tokio::test]
    async fn test_unknown_domain_is_400() {
        let app = seeded_app().await;
        let (status, body) = app.call(Method::DELETE, "/api/cache/stock").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "INVALID_PARAMETER");
    }
}
