//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! dt-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Admin migrations: `crates/admin/migrations/`

use dreamtrade_admin::config::{AdminConfig, ConfigError, StoreConfig};
use dreamtrade_admin::db;
use thiserror::Error;

/// Errors that can occur while running migrations.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Migrations need a PostgreSQL settings store (SETTINGS_STORE=postgres)")]
    NoDatabase,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run admin database migrations.
///
/// # Errors
///
/// Returns `MigrationError` if configuration is missing, the database is
/// unreachable, or a migration fails.
pub async fn admin() -> Result<(), MigrationError> {
    let config = AdminConfig::from_env()?;
    let StoreConfig::Postgres { database_url } = &config.store else {
        return Err(MigrationError::NoDatabase);
    };

    tracing::info!("Connecting to admin database...");
    let pool = db::create_pool(database_url).await?;

    tracing::info!("Running admin migrations...");
    sqlx::migrate!("../admin/migrations").run(&pool).await?;

    tracing::info!("Admin migrations complete!");
    Ok(())
}
