use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use std::time::Duration;

use crate::shared::config::Config;

// An in-memory SQLite database lives and dies with its connection.
const SQLITE_MEMORY_LIFETIME: Duration = Duration::from_secs(60 * 60 * 24 * 365);

pub async fn connect(config: &Config) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(config.database_url.clone());

    if config.database_url.starts_with("sqlite:") {
        opt.max_connections(1)
            .min_connections(1)
            .idle_timeout(SQLITE_MEMORY_LIFETIME)
            .max_lifetime(SQLITE_MEMORY_LIFETIME);
    } else {
        opt.max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .idle_timeout(Duration::from_secs(config.database_idle_timeout));
    }
    opt.connect_timeout(Duration::from_secs(config.database_connect_timeout))
        .sqlx_logging(false);

    let db = Database::connect(opt).await?;
    tracing::info!(backend = ?db.get_database_backend(), "Connected to database");

    if config.run_migrations {
        Migrator::up(&db, None).await?;
        tracing::info!("Migrations applied");
    }

    Ok(db)
}
