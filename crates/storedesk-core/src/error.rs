//! Core error types

use storedesk_db::DbError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Database(#[from] DbError),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl CoreError {
    /// Short machine-readable code, used by the HTTP layer
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::Database(e) => e.code(),
            CoreError::InvalidParameter(_) => "INVALID_PARAMETER",
        }
    }
}
