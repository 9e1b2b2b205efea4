use axum::response::{IntoResponse, Response};

use crate::shared::error::AppError;

/// Fallback for unknown routes.
pub async fn handler_404() -> impl IntoResponse {
    AppError::not_found()
}

/// Handler for panics caught by `CatchPanicLayer`.
pub fn handler_500(err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    AppError::Unexpected(format!("Handler panicked: {}", detail)).into_response()
}
