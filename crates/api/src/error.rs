use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use illustra_core::error::CoreError;
use illustra_db::error::{CatalogError, StoreError};
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors, the store and catalog errors from
/// `illustra_db`, and adds HTTP-specific variants. Implements
/// [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `illustra_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A failure reported by the catalog store.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A failed reconciliation or aggregation pass.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Request payload failed field validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    internal()
                }
            },

            // --- Store and catalog errors ---
            AppError::Store(err) => classify_store_error(err),
            AppError::Catalog(err) => {
                tracing::warn!(error = %err, "Catalog operation failed");
                classify_store_error(err.store_error())
            }

            // --- HTTP-specific errors ---
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                errors.to_string(),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Classify a store error into an HTTP status, error code, and message.
///
/// - Foreign key violations map to 400 (a referenced entity does not exist).
/// - Unique violations on `uq_` constraints map to 409.
/// - `RowNotFound` maps to 404.
/// - Everything else maps to 500 with a sanitized message.
fn classify_store_error(err: &StoreError) -> (StatusCode, &'static str, String) {
    match err {
        StoreError::ForeignKey(constraint) => (
            StatusCode::BAD_REQUEST,
            "FOREIGN_KEY_VIOLATION",
            format!("Referenced entity does not exist: {constraint}"),
        ),
        StoreError::Unique(constraint) if constraint.starts_with("uq_") => (
            StatusCode::CONFLICT,
            "CONFLICT",
            format!("Duplicate value violates unique constraint: {constraint}"),
        ),
        StoreError::Database(sqlx::Error::RowNotFound) => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        other => {
            tracing::error!(error = %other, "Store error");
            internal()
        }
    }
}
