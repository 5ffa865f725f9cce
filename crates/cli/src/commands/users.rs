//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! echo 's3cret-pasta' | rf-cli users create -u julia -e julia@example.com
//! rf-cli users count
//! ```
//!
//! Users created here go through the same validation as the registration
//! form, so every rule (length, uniqueness, format) applies.

use std::io::BufRead;

use sqlx::SqlitePool;
use thiserror::Error;

use recipe_finder_web::config;
use recipe_finder_web::db::{self, RepositoryError, UserRepository};
use recipe_finder_web::services::auth::{AuthError, AuthService, Registration};

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UsersError {
    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema could not be applied.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Password could not be read from stdin.
    #[error("Failed to read password from stdin: {0}")]
    Stdin(#[from] std::io::Error),

    /// Registration was rejected.
    #[error("{}", .0.user_message().unwrap_or("Registration failed"))]
    Rejected(AuthError),

    /// Lookup failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

async fn connect() -> Result<SqlitePool, UsersError> {
    let database_url = config::database_url_from_env();
    let pool = db::create_pool(&database_url).await?;
    db::run_migrations(&pool).await?;
    Ok(pool)
}

/// Read one line from `reader`, dropping only the line terminator.
fn read_password(mut reader: impl BufRead) -> Result<String, std::io::Error> {
    let mut line = String::new();
    reader.read_line(&mut line)?;
    let trimmed = line.trim_end_matches(['\n', '\r']).len();
    line.truncate(trimmed);
    Ok(line)
}

/// Create a new user, reading the password from stdin.
///
/// # Errors
///
/// Returns `UsersError::Rejected` with the registration message if the
/// input is invalid or already taken.
pub async fn create(username: &str, email: &str) -> Result<(), UsersError> {
    let password = read_password(std::io::stdin().lock())?;
    let pool = connect().await?;

    let registration = Registration {
        username,
        email,
        password: &password,
        confirm_password: &password,
    };

    let user = AuthService::new(&pool)
        .register(registration)
        .await
        .map_err(|e| match e {
            AuthError::Repository(inner) => UsersError::Repository(inner),
            other => UsersError::Rejected(other),
        })?;

    tracing::info!(
        "User created successfully! ID: {}, Username: {}, Email: {}",
        user.id,
        user.username,
        user.email
    );
    Ok(())
}

/// Print the number of registered users.
///
/// # Errors
///
/// Returns `UsersError` if the database cannot be queried.
pub async fn count() -> Result<(), UsersError> {
    let pool = connect().await?;
    let count = UserRepository::new(&pool).count().await?;
    tracing::info!("{count} registered user(s)");
    Ok(())
}
