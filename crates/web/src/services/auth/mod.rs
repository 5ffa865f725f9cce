//! Authentication service.
//!
//! Provides username/password registration and email/password login.

mod error;

pub use error::AuthError;

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::SqlitePool;

use recipe_finder_core::{Email, UserId, Username};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::user::User;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Hash verified against when no account matches the submitted email, so a
/// login for an unknown address costs one Argon2 verification like any
/// other failed login.
static ABSENT_ACCOUNT_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("absent-account-placeholder").ok());

/// Raw registration input, as submitted by the form or the CLI.
#[derive(Debug, Clone, Copy)]
pub struct Registration<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub confirm_password: &'a str,
}

/// Authentication service.
///
/// Handles user registration, login, and resolving session identifiers.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new user.
    ///
    /// Checks run in a fixed order and the first failure wins: required
    /// fields, password confirmation, password length, username and email
    /// format, then username and email uniqueness.
    ///
    /// # Errors
    ///
    /// Returns one of the user-facing [`AuthError`] variants for invalid
    /// input, `AuthError::PasswordHash` if hashing fails, or
    /// `AuthError::Repository` for database failures.
    pub async fn register(&self, form: Registration<'_>) -> Result<User, AuthError> {
        if form.username.trim().is_empty() || form.email.trim().is_empty() || form.password.is_empty()
        {
            return Err(AuthError::MissingFields);
        }

        if form.password != form.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }

        validate_password(form.password)?;

        let username = Username::parse(form.username)?;
        let email = Email::parse(form.email)?;

        if self.users.username_exists(&username).await? {
            return Err(AuthError::UsernameTaken);
        }

        if self.users.email_exists(&email).await? {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = hash_password(form.password)?;

        // A concurrent registration can still win the race between the
        // checks above and the insert; the unique constraint decides.
        let user = self
            .users
            .create(&username, &email, &password_hash)
            .await
            .map_err(registration_conflict)?;

        tracing::info!(user_id = %user.id, username = %user.username, "User registered");

        Ok(user)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingCredentials` if either field is empty.
    /// Returns `AuthError::InvalidCredentials` if the email is unknown or the
    /// password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let stored = match Email::parse(email) {
            Ok(email) => self.users.get_password_hash(&email).await?,
            Err(_) => None,
        };

        let Some((user, password_hash)) = stored else {
            return Err(reject_absent_account(password));
        };

        verify_password(password, &password_hash)?;

        Ok(user)
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn find_user(&self, user_id: UserId) -> Result<User, AuthError> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}

/// Map an insert failure to the registration error it stands for.
///
/// The unique index names the losing column; anything but `username` is
/// reported as a taken email.
fn registration_conflict(err: RepositoryError) -> AuthError {
    match err {
        RepositoryError::Conflict(column) if column == "username" => AuthError::UsernameTaken,
        RepositoryError::Conflict(_) => AuthError::EmailTaken,
        other => AuthError::Repository(other),
    }
}

/// Fail a login whose email matches no account, after the same Argon2 work
/// a wrong password costs.
fn reject_absent_account(password: &str) -> AuthError {
    if let Some(hash) = ABSENT_ACCOUNT_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
    AuthError::InvalidCredentials
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword {
            min: MIN_PASSWORD_LENGTH,
        });
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::db::{create_memory_pool, run_migrations};

    async fn pool() -> SqlitePool {
        let pool = create_memory_pool().await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    fn registration<'a>(username: &'a str, email: &'a str) -> Registration<'a> {
        Registration {
            username,
            email,
            password: "s3cret-pasta",
            confirm_password: "s3cret-pasta",
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong horse", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("123456").is_ok());
        assert!(matches!(
            validate_password("12345"),
            Err(AuthError::WeakPassword { min: 6 })
        ));
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let pool = pool().await;
        let auth = AuthService::new(&pool);

        let user = auth
            .register(registration("julia", "Julia@Example.com"))
            .await
            .unwrap();
        assert_eq!(user.email.as_str(), "julia@example.com");

        let logged_in = auth.login("julia@example.com", "s3cret-pasta").await.unwrap();
        assert_eq!(logged_in.id, user.id);

        let found = auth.find_user(user.id).await.unwrap();
        assert_eq!(found.username.as_str(), "julia");
    }

    #[tokio::test]
    async fn test_password_is_stored_hashed() {
        let pool = pool().await;
        let auth = AuthService::new(&pool);
        auth.register(registration("ina", "ina@example.com"))
            .await
            .unwrap();

        let stored: String =
            sqlx::query_scalar("SELECT password_hash FROM users WHERE username = 'ina'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_ne!(stored, "s3cret-pasta");
        assert!(PasswordHash::new(&stored).is_ok());
    }

    #[tokio::test]
    async fn test_register_validation_order() {
        let pool = pool().await;
        let auth = AuthService::new(&pool);

        let err = auth
            .register(Registration {
                username: "",
                email: "a@b.c",
                password: "short",
                confirm_password: "other",
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::MissingFields));

        let err = auth
            .register(Registration {
                username: "x",
                email: "a@b.c",
                password: "short",
                confirm_password: "other",
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::PasswordMismatch));

        let err = auth
            .register(Registration {
                username: "x",
                email: "a@b.c",
                password: "short",
                confirm_password: "short",
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::WeakPassword { .. }));

        let err = auth
            .register(registration("two words", "a@b.c"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidUsername(_)));

        let err = auth
            .register(registration("x", "not-an-email"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidEmail(_)));
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates() {
        let pool = pool().await;
        let auth = AuthService::new(&pool);
        auth.register(registration("gordon", "gordon@example.com"))
            .await
            .unwrap();

        let err = auth
            .register(registration("gordon", "other@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UsernameTaken));

        let err = auth
            .register(registration("ramsay", "GORDON@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));
    }

    #[tokio::test]
    async fn test_login_failures() {
        let pool = pool().await;
        let auth = AuthService::new(&pool);
        auth.register(registration("nigella", "nigella@example.com"))
            .await
            .unwrap();

        assert!(matches!(
            auth.login("", "whatever").await,
            Err(AuthError::MissingCredentials)
        ));
        assert!(matches!(
            auth.login("nigella@example.com", "").await,
            Err(AuthError::MissingCredentials)
        ));
        assert!(matches!(
            auth.login("nigella@example.com", "wrong-password").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("nobody@example.com", "s3cret-pasta").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("garbage", "s3cret-pasta").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_registration_conflict_mapping() {
        assert!(matches!(
            registration_conflict(RepositoryError::Conflict("username".to_owned())),
            AuthError::UsernameTaken
        ));
        assert!(matches!(
            registration_conflict(RepositoryError::Conflict("email".to_owned())),
            AuthError::EmailTaken
        ));
        assert!(matches!(
            registration_conflict(RepositoryError::Conflict("unknown".to_owned())),
            AuthError::EmailTaken
        ));
        assert!(matches!(
            registration_conflict(RepositoryError::DataCorruption("bad row".to_owned())),
            AuthError::Repository(RepositoryError::DataCorruption(_))
        ));
    }

    #[test]
    fn test_absent_account_still_verifies() {
        let hash = ABSENT_ACCOUNT_HASH.as_deref().unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(PasswordHash::new(hash).is_ok());

        assert!(matches!(
            reject_absent_account("s3cret-pasta"),
            AuthError::InvalidCredentials
        ));
    }

    #[tokio::test]
    async fn test_unknown_email_costs_a_hash_check() {
        let pool = pool().await;
        let auth = AuthService::new(&pool);
        auth.register(registration("ina", "ina@example.com"))
            .await
            .unwrap();

        // Warm the shared hash so its one-off computation is not measured.
        let _ = reject_absent_account("warm-up");

        let started = Instant::now();
        for _ in 0..3 {
            let _ = auth.login("ina@example.com", "wrong-password").await;
        }
        let known = started.elapsed();

        let started = Instant::now();
        for _ in 0..3 {
            let _ = auth.login("nobody@example.com", "wrong-password").await;
            let _ = auth.login("not-an-email", "wrong-password").await;
        }
        let unknown = started.elapsed() / 2;

        assert!(
            unknown * 4 >= known,
            "unknown email took {unknown:?}, known email took {known:?}"
        );
    }

    #[tokio::test]
    async fn test_find_user_missing() {
        let pool = pool().await;
        let auth = AuthService::new(&pool);
        assert!(matches!(
            auth.find_user(UserId::new(42)).await,
            Err(AuthError::UserNotFound)
        ));
    }
}
