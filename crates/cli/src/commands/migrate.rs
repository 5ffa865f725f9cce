//! Database migration command.
//!
//! Applies the embedded `users` migrations and creates the session store
//! table, the same steps the server performs on startup.

use thiserror::Error;

use recipe_finder_web::{app, config, db};

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run all migrations against the configured database.
///
/// # Errors
///
/// Returns `MigrationError` if the database is unreachable or a migration
/// fails to apply.
pub async fn run() -> Result<(), MigrationError> {
    let database_url = config::database_url_from_env();

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Running migrations...");
    db::run_migrations(&pool).await?;
    app::session_store(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
