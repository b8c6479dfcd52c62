//! Application state

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use storedesk_core::{CacheAside, QueryContext, Services};
use storedesk_db::StoreRegistry;

/// Handle used to render the Prometheus scrape output
pub type MetricsHandle = PrometheusHandle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub stores: Arc<StoreRegistry>,
    pub cache: Arc<CacheAside>,
    pub services: Services,
}

impl AppState {
    pub fn new(ctx: QueryContext) -> Self {
        Self {
            stores: ctx.stores().clone(),
            cache: ctx.cache().clone(),
            services: Services::new(ctx),
        }
    }
}
