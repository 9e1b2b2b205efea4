use dotenvy::dotenv;
use std::env;
use thiserror::Error;

use crate::shared::throttle::{DEFAULT_THROTTLE_RATE, ThrottleRate, ThrottleRateError};

const DEV_JWT_SECRET: &str = "dev_secret_change_me";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} must be a valid number, got `{value}`")]
    InvalidNumber { name: &'static str, value: String },
    #[error("THROTTLE_RATE is invalid: {0}")]
    ThrottleRate(#[from] ThrottleRateError),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub database_min_connections: u32,
    pub database_connect_timeout: u64,
    pub database_idle_timeout: u64,
    pub run_migrations: bool,
    pub server_host: String,
    pub server_port: u16,
    pub rust_log: String,
    pub app_env: String,
    pub jwt_secret: String,
    pub throttle_rate: ThrottleRate,
}

impl Config {
    pub fn init() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any variable source; `init` feeds it the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or =
            |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let app_env = var_or("APP_ENV", "dev");
        let is_dev = app_env == "dev";

        // Dev runs against an in-memory SQLite store.
        let database_url = match lookup("DATABASE_URL") {
            Some(url) => url,
            None if is_dev => "sqlite::memory:".to_string(),
            None => return Err(ConfigError::Missing("DATABASE_URL")),
        };

        let jwt_secret = match lookup("JWT_SECRET") {
            Some(secret) => secret,
            None if is_dev => DEV_JWT_SECRET.to_string(),
            None => return Err(ConfigError::Missing("JWT_SECRET")),
        };

        let run_migrations = is_dev
            || matches!(
                lookup("RUN_MIGRATIONS").as_deref(),
                Some("1") | Some("true") | Some("yes")
            );

        Ok(Self {
            database_url,
            database_max_connections: parse_number(&lookup, "DATABASE_MAX_CONNECTIONS", "100")?,
            database_min_connections: parse_number(&lookup, "DATABASE_MIN_CONNECTIONS", "5")?,
            database_connect_timeout: parse_number(&lookup, "DATABASE_CONNECT_TIMEOUT", "8")?,
            database_idle_timeout: parse_number(&lookup, "DATABASE_IDLE_TIMEOUT", "8")?,
            run_migrations,
            server_host: var_or("SERVER_HOST", "127.0.0.1"),
            server_port: parse_number(&lookup, "SERVER_PORT", "3000")?,
            rust_log: var_or("RUST_LOG", "info"),
            app_env,
            jwt_secret,
            throttle_rate: var_or("THROTTLE_RATE", DEFAULT_THROTTLE_RATE).parse()?,
        })
    }

    pub fn is_dev(&self) -> bool {
        self.app_env == "dev"
    }
}

fn parse_number<F, T>(lookup: &F, name: &'static str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let value = lookup(name).unwrap_or_else(|| default.to_string());
    value
        .parse::<T>()
        .map_err(|_| ConfigError::InvalidNumber { name, value })
}
