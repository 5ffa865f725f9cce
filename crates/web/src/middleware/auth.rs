//! Authentication middleware and extractors.
//!
//! The session only stores the user's ID. Every request that needs the user
//! resolves it back to a database record, so deleted accounts lose access
//! immediately.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use url::form_urlencoded;

use recipe_finder_core::UserId;

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::models::flash::{Flash, push_flash};
use crate::models::{User, session_keys};
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// Message flashed when a protected page is requested without a login.
pub const LOGIN_REQUIRED_MESSAGE: &str = "Please log in to access this page.";

/// Extractor that requires an authenticated user.
///
/// If nobody is logged in (or the stored user no longer exists), flashes a
/// message and redirects to `/login?next=<requested path>`.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct RequireAuth(pub User);

/// Error returned when authentication is required but the user is not logged in.
pub enum AuthRejection {
    /// Redirect to the login page, remembering where the visitor was going.
    RedirectToLogin { next: String },
    /// The user lookup itself failed.
    Error(AppError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin { next } => Redirect::to(&login_url(&next)).into_response(),
            Self::Error(err) => err.into_response(),
        }
    }
}

/// Build `/login?next=...` for a local path.
#[must_use]
pub fn login_url(next: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(next.as_bytes()).collect();
    format!("/login?next={encoded}")
}

/// Load the logged-in user for this session, if any.
///
/// A session pointing at a user that no longer exists is treated as logged
/// out and the stale ID is removed.
async fn load_user(session: &Session, state: &AppState) -> Result<Option<User>, AppError> {
    let Some(user_id) = session.get::<UserId>(session_keys::USER_ID).await? else {
        return Ok(None);
    };

    match AuthService::new(state.pool()).find_user(user_id).await {
        Ok(user) => Ok(Some(user)),
        Err(AuthError::UserNotFound) => {
            tracing::info!(user_id = %user_id, "Session refers to a missing user");
            session.remove::<UserId>(session_keys::USER_ID).await?;
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts.extensions.get::<Session>().cloned().ok_or_else(|| {
            AuthRejection::Error(AppError::Internal("session layer missing".to_owned()))
        })?;

        match load_user(&session, state).await {
            Ok(Some(user)) => {
                set_sentry_user(&user.id, Some(user.username.as_str()));
                Ok(Self(user))
            }
            Ok(None) => {
                push_flash(&session, Flash::info(LOGIN_REQUIRED_MESSAGE)).await;
                let next = parts
                    .uri
                    .path_and_query()
                    .map_or_else(|| parts.uri.path().to_owned(), ToString::to_string);
                Err(AuthRejection::RedirectToLogin { next })
            }
            Err(e) => Err(AuthRejection::Error(e)),
        }
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this never rejects the request; lookup failures are
/// logged and treated as logged out.
pub struct OptionalAuth(pub Option<User>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(session) = parts.extensions.get::<Session>().cloned() else {
            return Ok(Self(None));
        };

        let user = match load_user(&session, state).await {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load current user");
                None
            }
        };

        Ok(Self(user))
    }
}

/// Log a user in.
///
/// The session ID is cycled first so a session fixed before login cannot be
/// reused after it.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn login_user(session: &Session, user: &User) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::USER_ID, user.id).await?;
    set_sentry_user(&user.id, Some(user.username.as_str()));
    tracing::info!(user_id = %user.id, "User logged in");
    Ok(())
}

/// Log the current user out and discard the whole session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn logout_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<UserId>(session_keys::USER_ID).await?;
    session.flush().await?;
    clear_sentry_user();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_url_encodes_next() {
        assert_eq!(login_url("/"), "/login?next=%2F");
        assert_eq!(
            login_url("/?search_query=pad thai"),
            "/login?next=%2F%3Fsearch_query%3Dpad+thai"
        );
    }
}
