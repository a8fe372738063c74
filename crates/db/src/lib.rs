//! Database layer for lessonspark-rs.
//!
//! Organizations, member profiles, invites, shared focus entries and
//! transfer requests live in Postgres. Repositories wrap a shared
//! connection pool; multi-row changes to the hierarchy and transfer
//! decisions run in their own transactions.

pub mod entities;
pub mod migrations;
pub mod repositories;
pub mod test_utils;

use lessonspark_common::{AppError, Config};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::log::LevelFilter;

/// Open the connection pool described by the `database` config section.
/// Idle connections are recycled after five minutes.
pub async fn init(config: &Config) -> Result<DatabaseConnection, AppError> {
    let database = &config.database;
    let timeout = Duration::from_secs(database.connect_timeout_secs);

    let mut opt = ConnectOptions::new(&database.url);
    opt.max_connections(database.max_connections)
        .min_connections(database.min_connections)
        .connect_timeout(timeout)
        .acquire_timeout(timeout)
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(true)
        .sqlx_logging_level(LevelFilter::Debug);

    tracing::debug!(
        max_connections = database.max_connections,
        min_connections = database.min_connections,
        connect_timeout_secs = database.connect_timeout_secs,
        "Opening database pool"
    );

    Database::connect(opt)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
}

/// Apply pending schema migrations.
pub async fn migrate(db: &DatabaseConnection) -> Result<(), AppError> {
    use sea_orm_migration::MigratorTrait;

    let pending = migrations::Migrator::get_pending_migrations(db)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    tracing::info!(pending = pending.len(), "Applying migrations");

    migrations::Migrator::up(db, None)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
}
