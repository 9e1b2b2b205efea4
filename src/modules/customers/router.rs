use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;
use crate::shared::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/customers/",
            get(handlers::list_customers).post(handlers::create_customer),
        )
        .route(
            "/customers/:id/",
            get(handlers::get_customer)
                .put(handlers::replace_customer)
                .patch(handlers::patch_customer)
                .delete(handlers::delete_customer),
        )
        .route(
            "/customers-with-address/",
            post(handlers::create_customer_with_addresses),
        )
}
