//! Cache client, orchestration and key/TTL conventions

mod aside;
pub(crate) mod client;
pub mod keys;
mod policy;

pub use aside::{CacheAside, CacheStats};
pub use client::{CacheClient, CacheClientConfig, spawn_reconnect_task};
pub use policy::{ParseTtlClassError, TtlClass, TtlPolicy};
