use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::{DbErr, SqlErr};
use serde_json::{json, Value};
use thiserror::Error;

use crate::shared::validation::FieldErrors;

const GENERIC_ERROR: &str = "Something went wrong. Please try again later.";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DbError(#[from] DbErr),

    #[error("Customer not found.")]
    CustomerNotFound,

    #[error("{0}")]
    NotFound(String),

    #[error("Invalid data provided: {0}")]
    InvalidData(FieldErrors),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Not raised by any current operation.
    #[error("You do not have permission to perform this action.")]
    PermissionDenied,

    #[error("Too many requests. Please try again later.")]
    Throttled { retry_after: u64 },

    /// Rendered with its detail; only the composite create raises it.
    #[error("Internal server error: {0}")]
    InternalServerError(String),

    /// Rendered with the generic message, detail goes to the log only.
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn not_found() -> Self {
        AppError::NotFound("Resource not found.".to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::DbError(err) => classify_db_error(err).0,
            AppError::CustomerNotFound | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidData(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::PermissionDenied => StatusCode::FORBIDDEN,
            AppError::Throttled { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::InternalServerError(_) | AppError::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Maps storage failures that were not handled by an operation onto the
/// public taxonomy without exposing driver text.
fn classify_db_error(err: &DbErr) -> (StatusCode, &'static str) {
    match err {
        DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated => {
            (StatusCode::NOT_FOUND, "Requested resource not found.")
        }
        DbErr::Type(_) | DbErr::AttrNotSet(_) => {
            (StatusCode::BAD_REQUEST, "Invalid data provided.")
        }
        _ => match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_))
            | Some(SqlErr::ForeignKeyConstraintViolation(_)) => (
                StatusCode::CONFLICT,
                "Conflict occurred with the current state of the resource.",
            ),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_ERROR),
        },
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut retry_after = None;

        let message: Value = match self {
            AppError::DbError(err) => {
                let (status, message) = classify_db_error(&err);
                if status.is_server_error() {
                    tracing::error!("Database error: {:?}", err);
                } else {
                    tracing::warn!(%status, "Database error: {}", err);
                }
                Value::from(message)
            }
            AppError::CustomerNotFound => {
                tracing::warn!("Customer not found");
                Value::from("Customer not found.")
            }
            AppError::NotFound(msg) => {
                tracing::warn!("Not found: {}", msg);
                Value::from(msg)
            }
            AppError::InvalidData(errors) => {
                tracing::warn!("Invalid data: {}", errors);
                json!(errors)
            }
            AppError::BadRequest(msg) | AppError::Conflict(msg) | AppError::Unauthorized(msg) => {
                tracing::warn!(%status, "{}", msg);
                Value::from(msg)
            }
            AppError::PermissionDenied => {
                tracing::warn!("Permission denied");
                Value::from("You do not have permission to perform this action.")
            }
            AppError::Throttled { retry_after: wait } => {
                tracing::warn!(retry_after = wait, "Request throttled");
                retry_after = Some(wait);
                Value::from("Too many requests. Please try again later.")
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal server error: {}", msg);
                Value::from(msg)
            }
            AppError::Unexpected(msg) => {
                tracing::error!("Unhandled error: {}", msg);
                Value::from(GENERIC_ERROR)
            }
        };

        let mut response = (status, Json(json!({ "error": message }))).into_response();
        if let Some(wait) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(wait));
        }
        response
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn customer_not_found_renders_default_message() {
        let response = AppError::CustomerNotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "Customer not found." })
        );
    }

    #[tokio::test]
    async fn invalid_data_renders_field_map() {
        let mut errors = FieldErrors::default();
        errors.add("email", "Enter a valid email address.");
        let response = AppError::InvalidData(errors).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({ "error": { "email": ["Enter a valid email address."] } })
        );
    }

    #[tokio::test]
    async fn throttled_sets_retry_after() {
        let response = AppError::Throttled { retry_after: 42 }.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers().get(header::RETRY_AFTER),
            Some(&HeaderValue::from(42u64))
        );
    }

    #[tokio::test]
    async fn unexpected_errors_hide_detail() {
        let response = AppError::Unexpected("pool exhausted".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await, json!({ "error": GENERIC_ERROR }));
    }

    #[tokio::test]
    async fn composite_failures_surface_detail() {
        let response =
            AppError::InternalServerError("insert failed".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await, json!({ "error": "insert failed" }));
    }

    #[test]
    fn storage_not_found_maps_to_404() {
        let err = AppError::DbError(DbErr::RecordNotFound("customers".to_string()));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn storage_type_errors_map_to_400() {
        let err = AppError::DbError(DbErr::Type("bad column".to_string()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn other_storage_errors_map_to_500() {
        let err = AppError::DbError(DbErr::Custom("boom".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
