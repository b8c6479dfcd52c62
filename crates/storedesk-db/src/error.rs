//! Database error types

use thiserror::Error;

use crate::store::StoreId;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("{0} store is not configured")]
    NotConfigured(StoreId),

    #[error("No connection available for {store} store: {reason}")]
    ConnectionUnavailable { store: StoreId, reason: String },

    #[error("Query failed on {store} store: {source}")]
    QueryFailed {
        store: StoreId,
        #[source]
        source: sqlx::Error,
    },

    #[error("Native client bootstrap failed: {0}")]
    ClientBootstrapFailed(String),

    #[error("Invalid store configuration: {0}")]
    Configuration(String),
}

impl DbError {
    /// Classify an error raised while borrowing a connection from a pool
    pub(crate) fn acquire(store: StoreId, err: sqlx::Error) -> Self {
        DbError::ConnectionUnavailable {
            store,
            reason: err.to_string(),
        }
    }

    /// Classify an error raised by a statement on a borrowed connection
    pub(crate) fn query(store: StoreId, err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                DbError::ConnectionUnavailable {
                    store,
                    reason: err.to_string(),
                }
            }
            other => DbError::QueryFailed {
                store,
                source: other,
            },
        }
    }

    /// Short machine-readable code, used by the HTTP layer
    pub fn code(&self) -> &'static str {
        match self {
            DbError::NotConfigured(_) => "NOT_CONFIGURED",
            DbError::ConnectionUnavailable { .. } => "CONNECTION_UNAVAILABLE",
            DbError::QueryFailed { .. } => "QUERY_FAILED",
            DbError::ClientBootstrapFailed(_) => "CLIENT_BOOTSTRAP_FAILED",
            DbError::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }
}
