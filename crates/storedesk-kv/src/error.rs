//! Cache transport error types

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KvError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Cache backend is not connected")]
    NotConnected,

    #[error("Cache operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Cache backend unavailable: {0}")]
    Unavailable(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}
