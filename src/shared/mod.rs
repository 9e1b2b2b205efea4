pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod infra;
pub mod middleware;
pub mod repository;
pub mod state;
pub mod throttle;
pub mod validation;
