use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use std::sync::Arc;

use crate::modules::auth::service::{AuthService, Claims};
use crate::shared::config::Config;
use crate::shared::error::AppError;

/// Requires a valid bearer token; used by every write endpoint.
#[async_trait]
impl<S> FromRequestParts<S> for Claims
where
    Arc<Config>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = Arc::<Config>::from_ref(state);
        AuthService::claims_from_headers(&parts.headers, &config.jwt_secret)
    }
}
