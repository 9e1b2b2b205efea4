use axum::{middleware, routing::get, Router};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::modules::{addresses, customers};
use crate::shared::{
    handlers::{handler_404, handler_500},
    middleware::throttle_reads,
    state::AppState,
};

pub fn init_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .merge(customers::router::router())
        .merge(addresses::router::router())
        .fallback(handler_404)
        .layer(middleware::from_fn_with_state(state.clone(), throttle_reads))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handler_500))
        .with_state(state)
}
