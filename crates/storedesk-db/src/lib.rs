//! Storedesk Database Layer
//!
//! Lazily created connection pools for the analytics and transactional
//! stores, the borrowed-connection guard, and the report queries that run
//! on it. Both stores are reached through sqlx's `Any` driver so the
//! backend is picked by URL.

pub mod bootstrap;
pub mod error;
#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;
pub mod models;
pub mod registry;
pub mod reports;
pub mod store;
pub mod utils;

pub use bootstrap::NativeClientSettings;
pub use error::DbError;
pub use models::*;
pub use registry::{Store, StoreHealth, StoreRegistry};
pub use reports::ReportWindow;
pub use store::{StoreConnection, StoreId, StorePool, StoreSettings};
