use axum::{routing::get, Router};

use super::handlers;
use crate::shared::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/customer-addresses/",
            get(handlers::list_addresses).post(handlers::create_address),
        )
        .route(
            "/customer-addresses/:id/",
            get(handlers::get_address)
                .put(handlers::replace_address)
                .patch(handlers::patch_address)
                .delete(handlers::delete_address),
        )
}
