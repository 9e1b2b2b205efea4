use axum::extract::FromRef;
use std::sync::Arc;

use crate::shared::config::Config;
use crate::shared::repository::RepositoryManager;
use crate::shared::throttle::RateLimiter;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub repo_manager: Arc<dyn RepositoryManager>,
    pub rate_limiter: Arc<RateLimiter>,
}

impl FromRef<AppState> for Arc<Config> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
