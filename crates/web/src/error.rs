//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. Route handlers return `Result<T, AppError>`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::recipes::RecipeApiError;
use crate::services::auth::AuthError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Recipe API call failed.
    #[error("Recipe API error: {0}")]
    RecipeApi(#[from] RecipeApiError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Session store operation failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Session(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::RecipeApi(RecipeApiError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::RecipeApi(_) => StatusCode::BAD_GATEWAY,
            Self::Auth(err) => match err {
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                AuthError::InvalidCredentials | AuthError::UserNotFound => {
                    StatusCode::UNAUTHORIZED
                }
                AuthError::UsernameTaken | AuthError::EmailTaken => StatusCode::CONFLICT,
                _ => StatusCode::BAD_REQUEST,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(_) | Self::Session(_) | Self::Internal(_) => {
                "Internal server error".to_owned()
            }
            Self::RecipeApi(RecipeApiError::NotFound(_)) => "Recipe not found".to_owned(),
            Self::RecipeApi(_) => "External service error".to_owned(),
            Self::Auth(err) => err
                .user_message()
                .unwrap_or("Authentication error")
                .to_owned(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, username: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            username: username.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let err = AppError::Database(RepositoryError::DataCorruption("bad email".to_owned()));
        assert_eq!(err.to_string(), "Database error: data corruption: bad email");
        assert_eq!(get_status(err), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::Internal("test".to_owned())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::Conflict("email".to_owned()))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_recipe_api_status_codes() {
        assert_eq!(
            get_status(AppError::RecipeApi(RecipeApiError::NotFound(1))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::RecipeApi(RecipeApiError::Status(
                StatusCode::PAYMENT_REQUIRED
            ))),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_auth_status_codes() {
        assert_eq!(
            get_status(AppError::Auth(AuthError::InvalidCredentials)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::EmailTaken)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::MissingFields)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::PasswordHash)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
