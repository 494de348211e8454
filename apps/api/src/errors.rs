use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::entries::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Route not found")]
    RouteNotFound,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A store failure tagged with the operation that was being attempted.
    #[error("{action}: {source}")]
    Failed {
        action: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::RouteNotFound => (StatusCode::NOT_FOUND, "Route not found".to_string()),
            AppError::Store(e) => {
                tracing::error!("Store error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            AppError::Failed { action, source } => {
                tracing::error!("{action}: {source}");
                (StatusCode::INTERNAL_SERVER_ERROR, action.to_string())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong!".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Attaches an operation-specific message to store failures, leaving client errors as they are.
pub trait OrFail<T> {
    fn or_fail(self, action: &'static str) -> Result<T, AppError>;
}

impl<T> OrFail<T> for Result<T, AppError> {
    fn or_fail(self, action: &'static str) -> Result<T, AppError> {
        self.map_err(|err| match err {
            AppError::Store(source) => AppError::Failed { action, source },
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_or_fail_tags_store_errors_only() {
        let store: Result<(), AppError> =
            Err(AppError::Store(StoreError::Unavailable("down".to_string())));
        match store.or_fail("Failed to fetch entries") {
            Err(AppError::Failed { action, .. }) => assert_eq!(action, "Failed to fetch entries"),
            other => panic!("unexpected: {other:?}"),
        }

        let missing: Result<(), AppError> = Err(AppError::NotFound("Entry not found".into()));
        assert!(matches!(
            missing.or_fail("Failed to fetch entry"),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::Validation("x".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::RouteNotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Store(StoreError::Unavailable("x".into()))
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
