//! Authentication error types.

use thiserror::Error;

use recipe_finder_core::{EmailError, UsernameError};

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
///
/// Most variants are caused by user input and carry the message shown to the
/// visitor; see [`AuthError::user_message`].
#[derive(Debug, Error)]
pub enum AuthError {
    /// A registration field was left empty.
    #[error("all fields are required")]
    MissingFields,

    /// Password and confirmation differ.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// Password shorter than the minimum length.
    #[error("password must be at least {min} characters")]
    WeakPassword { min: usize },

    /// Invalid username format.
    #[error("invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Username already taken.
    #[error("username already exists")]
    UsernameTaken,

    /// Email already registered.
    #[error("email already registered")]
    EmailTaken,

    /// Login form submitted without email or password.
    #[error("email and password are required")]
    MissingCredentials,

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User not found.
    #[error("user not found")]
    UserNotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl AuthError {
    /// The flash message shown to the visitor, or `None` for infrastructure
    /// failures that must surface as a server error instead.
    #[must_use]
    pub const fn user_message(&self) -> Option<&'static str> {
        match self {
            Self::MissingFields => Some("All fields are required!"),
            Self::PasswordMismatch => Some("Passwords do not match!"),
            Self::WeakPassword { .. } => Some("Password must be at least 6 characters long!"),
            Self::InvalidUsername(_) => Some("Please enter a valid username!"),
            Self::InvalidEmail(_) => Some("Please enter a valid email address!"),
            Self::UsernameTaken => Some("Username already exists!"),
            Self::EmailTaken => Some("Email already registered!"),
            Self::MissingCredentials => Some("Please provide both email and password!"),
            Self::InvalidCredentials | Self::UserNotFound => Some("Invalid email or password!"),
            Self::Repository(_) | Self::PasswordHash => None,
        }
    }
}
