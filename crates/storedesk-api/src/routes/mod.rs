//! API routes

mod cache;
mod gate_passes;
mod health;
mod indents;
mod lookups;
pub mod metrics;
mod orders;

use std::sync::Arc;

use axum::{Json, Router, http::Uri};
use serde::Serialize;
use storedesk_core::RowSet;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::ApiError;
use crate::state::{AppState, MetricsHandle};

/// Success envelope shared by every data endpoint
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
            total: None,
        })
    }
}

impl<T> ApiResponse<Vec<T>> {
    pub fn rows(set: RowSet<T>) -> Json<Self> {
        Json(Self {
            success: true,
            data: set.rows,
            total: Some(set.total),
        })
    }
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(uri.path().to_string())
}

/// Create the main router
pub fn create_router(state: AppState, metrics_handle: Option<Arc<MetricsHandle>>) -> Router {
    let mut router = Router::new()
        .merge(health::routes())
        .merge(orders::routes())
        .merge(indents::routes())
        .merge(gate_passes::routes())
        .merge(lookups::routes())
        .merge(cache::routes())
        .with_state(state);

    if let Some(handle) = metrics_handle {
        router = router.merge(metrics::routes(handle));
    }

    router
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
pub(crate) mod testing {
    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, StatusCode};
    use chrono::Local;
    use serde_json::Value;
    use storedesk_core::{CacheAside, CacheClient, CacheClientConfig, QueryContext, TtlPolicy};
    use storedesk_db::{
        NativeClientSettings, ReportWindow, StoreId, StoreRegistry, StoreSettings, fixtures,
    };
    use storedesk_kv::MemoryBackend;
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;

    pub(crate) struct TestApp {
        _temp: Option<TempDir>,
        pub state: AppState,
        pub router: Router,
    }

    impl TestApp {
        pub async fn call(&self, method: Method, uri: &str) -> (StatusCode, Value) {
            let request = Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap();
            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            (status, body)
        }

        pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
            self.call(Method::GET, uri).await
        }
    }

    async fn live_cache() -> Arc<CacheAside> {
        let client = Arc::new(CacheClient::new(
            Arc::new(MemoryBackend::new()),
            CacheClientConfig::default(),
        ));
        client.connect().await;
        Arc::new(CacheAside::new(client))
    }

    fn build(temp: Option<TempDir>, stores: StoreRegistry, cache: Arc<CacheAside>) -> TestApp {
        let ctx = QueryContext::new(
            Arc::new(stores),
            cache,
            TtlPolicy::new(),
            ReportWindow::default(),
        );
        let state = AppState::new(ctx);
        TestApp {
            _temp: temp,
            router: create_router(state.clone(), None),
            state,
        }
    }

    /// App over a seeded SQLite analytics store and an in-memory cache
    pub(crate) async fn seeded_app() -> TestApp {
        let temp = TempDir::new().unwrap();
        let url = format!(
            "sqlite://{}?mode=rwc",
            temp.path().join("analytics.db").display()
        );
        let stores = StoreRegistry::new(
            StoreSettings::analytics().with_url(url),
            StoreSettings::transactional(),
            NativeClientSettings::default(),
        );
        {
            let today = Local::now().date_naive();
            let mut conn = stores.acquire(StoreId::Analytics).await.unwrap();
            fixtures::create_schema(&mut conn, true).await.unwrap();
            fixtures::seed(&mut conn, today, true).await.unwrap();
        }
        build(Some(temp), stores, live_cache().await)
    }

    /// App with no stores configured
    pub(crate) async fn unconfigured_app() -> TestApp {
        let stores = StoreRegistry::new(
            StoreSettings::analytics(),
            StoreSettings::transactional(),
            NativeClientSettings::default(),
        );
        build(None, stores, live_cache().await)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::seeded_app;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let app = seeded_app().await;
        let (status, body) = app.get("/api/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "NOT_FOUND");
    }
}
