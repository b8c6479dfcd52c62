//! API error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use storedesk_core::CoreError;
use storedesk_db::DbError;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Core(e) => {
                let status = match e {
                    CoreError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
                    CoreError::Database(
                        DbError::NotConfigured(_) | DbError::ConnectionUnavailable { .. },
                    ) => StatusCode::SERVICE_UNAVAILABLE,
                    CoreError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, e.code())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.parts();
        if status.is_server_error() {
            error!("Request failed ({}): {}", code, self);
        }

        let body = axum::Json(json!({
            "success": false,
            "error": code,
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storedesk_db::StoreId;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                ApiError::from(CoreError::InvalidParameter("divCode".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::from(CoreError::from(DbError::NotConfigured(StoreId::Analytics))),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                ApiError::from(CoreError::from(DbError::ConnectionUnavailable {
                    store: StoreId::Analytics,
                    reason: "pool timed out".into(),
                })),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                ApiError::from(CoreError::from(DbError::ClientBootstrapFailed(
                    "missing".into(),
                ))),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (ApiError::NotFound("/nope".into()), StatusCode::NOT_FOUND),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_error_code_passes_through() {
        let err = ApiError::from(CoreError::from(DbError::NotConfigured(StoreId::Analytics)));
        assert_eq!(err.parts().1, "NOT_CONFIGURED");
    }
}
