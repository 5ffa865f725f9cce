//! User repository for database operations.
//!
//! Queries are checked at runtime against the `users` table created by the
//! embedded migrations.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use recipe_finder_core::{Email, UserId, Username};

use super::RepositoryError;
use crate::models::user::User;

/// Columns selected for every user lookup.
const USER_COLUMNS: &str = "id, username, email, created_at";

/// Raw `users` row before validation into a [`User`].
#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let username = Username::parse(&row.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username in database: {e}"))
        })?;
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            username,
            email,
            created_at: row.created_at,
        })
    }
}

/// Row for the login lookup, which also needs the stored hash.
#[derive(Debug, FromRow)]
struct UserWithHashRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

/// Unique column named in a constraint violation.
///
/// `SQLite` reports `UNIQUE constraint failed: users.<column>`.
fn violated_column(message: &str) -> &'static str {
    if message.contains("users.username") {
        "username"
    } else if message.contains("users.email") {
        "email"
    } else {
        "unknown"
    }
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
                .bind(id.as_i64())
                .fetch_optional(self.pool)
                .await?;

        row.map(User::try_from).transpose()
    }

    /// Check whether a username is taken.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn username_exists(&self, username: &Username) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = ?)")
                .bind(username.as_str())
                .fetch_one(self.pool)
                .await?;
        Ok(exists)
    }

    /// Check whether an email is already registered.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn email_exists(&self, email: &Email) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = ?)")
            .bind(email.as_str())
            .fetch_one(self.pool)
            .await?;
        Ok(exists)
    }

    /// Create a new user with an already-hashed password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` naming the column (`username` or
    /// `email`) if either is already taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        username: &Username,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let row: UserRow = sqlx::query_as(&format!(
            "INSERT INTO users (username, email, password_hash, created_at) \
             VALUES (?, ?, ?, ?) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(username.as_str())
        .bind(email.as_str())
        .bind(password_hash)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict(violated_column(db_err.message()).to_owned());
            }
            RepositoryError::Database(e)
        })?;

        User::try_from(row)
    }

    /// Get a user and their password hash by email.
    ///
    /// Returns `None` if no user has this email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row: Option<UserWithHashRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = ?"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        let Some(r) = row else {
            return Ok(None);
        };

        let user = User::try_from(r.user)?;
        Ok(Some((user, r.password_hash)))
    }

    /// Count registered users.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::{create_memory_pool, run_migrations};

    async fn pool() -> SqlitePool {
        let pool = create_memory_pool().await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    fn username(s: &str) -> Username {
        Username::parse(s).unwrap()
    }

    fn email(s: &str) -> Email {
        Email::parse(s).unwrap()
    }

    #[test]
    fn test_violated_column() {
        assert_eq!(
            violated_column("UNIQUE constraint failed: users.username"),
            "username"
        );
        assert_eq!(
            violated_column("UNIQUE constraint failed: users.email"),
            "email"
        );
        assert_eq!(violated_column("something else"), "unknown");
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let pool = pool().await;
        let repo = UserRepository::new(&pool);

        let created = repo
            .create(&username("julia"), &email("julia@example.com"), "hash")
            .await
            .unwrap();
        assert_eq!(created.username.as_str(), "julia");

        let by_id = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(by_id.email.as_str(), "julia@example.com");

        let (by_email, _) = repo
            .get_password_hash(&email("julia@example.com"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id, created.id);

        assert!(repo.get_by_id(UserId::new(9999)).await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_exists_checks() {
        let pool = pool().await;
        let repo = UserRepository::new(&pool);
        repo.create(&username("gordon"), &email("gordon@example.com"), "hash")
            .await
            .unwrap();

        assert!(repo.username_exists(&username("gordon")).await.unwrap());
        assert!(!repo.username_exists(&username("Gordon")).await.unwrap());
        assert!(repo.email_exists(&email("GORDON@example.com")).await.unwrap());
        assert!(!repo.email_exists(&email("other@example.com")).await.unwrap());
    }

    #[tokio::test]
    async fn test_create_conflict_names_column() {
        let pool = pool().await;
        let repo = UserRepository::new(&pool);
        repo.create(&username("nigella"), &email("nigella@example.com"), "hash")
            .await
            .unwrap();

        let err = repo
            .create(&username("nigella"), &email("other@example.com"), "hash")
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(ref col) if col == "username"));

        let err = repo
            .create(&username("someone"), &email("nigella@example.com"), "hash")
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(ref col) if col == "email"));
    }

    #[tokio::test]
    async fn test_get_password_hash() {
        let pool = pool().await;
        let repo = UserRepository::new(&pool);
        repo.create(&username("ina"), &email("ina@example.com"), "$argon2id$stub")
            .await
            .unwrap();

        let (user, hash) = repo
            .get_password_hash(&email("ina@example.com"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.username.as_str(), "ina");
        assert_eq!(hash, "$argon2id$stub");

        assert!(
            repo.get_password_hash(&email("nobody@example.com"))
                .await
                .unwrap()
                .is_none()
        );
    }
}
