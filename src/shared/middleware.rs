use axum::{
    extract::{ConnectInfo, Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;

use crate::modules::auth::service::AuthService;
use crate::shared::{error::AppResult, state::AppState};

/// Applies the per-caller rate limit to reads (`GET`, and the `HEAD` that
/// every `GET` route also answers). Writes pass straight through.
pub async fn throttle_reads(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> AppResult<Response> {
    if matches!(*request.method(), Method::GET | Method::HEAD) {
        let key = caller_key(&state, &request);
        state.rate_limiter.check(&key)?;
    }

    Ok(next.run(request).await)
}

/// `user:<sub>` for a valid bearer token, otherwise the peer address.
fn caller_key(state: &AppState, request: &Request) -> String {
    let secret = &state.config.jwt_secret;
    if let Ok(claims) = AuthService::claims_from_headers(request.headers(), secret) {
        return format!("user:{}", claims.sub);
    }

    match request.extensions().get::<ConnectInfo<SocketAddr>>() {
        Some(ConnectInfo(addr)) => format!("anon:{}", addr.ip()),
        None => "anon".to_string(),
    }
}
