//! StoreDesk REST API
//!
//! Thin axum layer over the reporting services: one route per report,
//! health and cache administration, and the Prometheus scrape endpoint.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{AppState, MetricsHandle};
