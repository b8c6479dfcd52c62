//! Storedesk Cache Transport
//!
//! Key-value backends behind one async trait: Redis for deployments and an
//! in-process map for single-node runs and tests.

pub mod backend;
pub mod error;
pub mod memory;
pub mod redis_backend;

pub use backend::{KeyPattern, KvBackend, is_pattern};
pub use error::KvError;
pub use memory::MemoryBackend;
pub use redis_backend::{RedisBackend, RedisConfig};
