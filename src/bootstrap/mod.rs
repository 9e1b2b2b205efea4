pub mod database;
pub mod repositories;

use sea_orm::{DatabaseConnection, DbErr};
use std::sync::Arc;

use crate::shared::{config::Config, state::AppState, throttle::RateLimiter};

pub async fn create_app_state(config: &Config) -> Result<AppState, DbErr> {
    let db = database::connect(config).await?;
    Ok(app_state_with_db(config, db))
}

/// Builds the state around an already open (and migrated) connection.
pub fn app_state_with_db(config: &Config, db: DatabaseConnection) -> AppState {
    let repo_manager = repositories::init_repo_manager(db);

    AppState {
        config: Arc::new(config.clone()),
        repo_manager,
        rate_limiter: Arc::new(RateLimiter::new(config.throttle_rate)),
    }
}
