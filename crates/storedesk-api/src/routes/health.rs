//! Health check endpoints

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;
use storedesk_db::{StoreHealth, StoreId};

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CacheHealth {
    pub backend: &'static str,
    pub enabled: bool,
    pub live: bool,
}

/// Health status response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub stores: Vec<StoreHealth>,
    pub cache: CacheHealth,
}

/// Health check handler.
///
/// Unhealthy (503) only when the analytics store is configured and cannot
/// be reached. A dead cache leaves the service degraded but serving.
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    metrics::counter!("storedesk_health_checks_total").increment(1);

    let (analytics, transactional) = tokio::join!(
        state.stores.health(StoreId::Analytics),
        state.stores.health(StoreId::Transactional),
    );

    let client = state.cache.client();
    let cache = CacheHealth {
        backend: client.backend_name(),
        enabled: client.is_enabled(),
        live: client.is_live(),
    };

    let (status, code) = if analytics.configured && !analytics.healthy {
        ("unhealthy", StatusCode::SERVICE_UNAVAILABLE)
    } else if cache.enabled && !cache.live {
        ("degraded", StatusCode::OK)
    } else {
        ("healthy", StatusCode::OK)
    };

    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            stores: vec![analytics, transactional],
            cache,
        }),
    )
}

/// Create health routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
}

#[cfg(test)]
mod tests {
    use crate::routes::testing::{seeded_app, unconfigured_app};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_healthy_store() {
        let app = seeded_app().await;
        let (status, body) = app.get("/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["stores"][0]["store"], "analytics");
        assert_eq!(body["stores"][0]["healthy"], true);
        assert_eq!(body["stores"][1]["configured"], false);
        assert_eq!(body["cache"]["live"], true);
    }

    #[tokio::test]
    async fn test_unconfigured_store_is_not_unhealthy() {
        let app = unconfigured_app().await;
        let (status, body) = app.get("/healthz").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }
}
