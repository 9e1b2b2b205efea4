use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

use crate::shared::error::AppError;

/// Integer id from the `:id` path segment. Anything that is not an integer
/// cannot name a row, so it is a 404 rather than a 400.
#[derive(Debug, Clone, Copy)]
pub struct ResourceId(pub i32);

#[async_trait]
impl<S> FromRequestParts<S> for ResourceId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i32>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                tracing::debug!("Rejected path id: {}", rejection);
                AppError::not_found()
            })?;
        Ok(ResourceId(id))
    }
}
