//! Authentication route handlers.
//!
//! Registration, login and logout. Every POST answers with a redirect; the
//! outcome is carried to the next page as a flash message.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use super::Page;
use crate::error::Result;
use crate::middleware::auth::login_url;
use crate::middleware::{OptionalAuth, RequireAuth, login_user, logout_user};
use crate::models::flash::{Flash, push_flash};
use crate::services::auth::{AuthError, AuthService, Registration};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
///
/// Missing fields deserialize as empty so they reach validation instead of
/// being rejected by the extractor.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub next: Option<String>,
}

/// Registration form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Query parameters accepted by the login page.
#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub page: Page,
    /// Validated return path, or empty for none
    pub next: String,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub page: Page,
}

// =============================================================================
// Helpers
// =============================================================================

/// Return `next` if it is a local absolute path, otherwise `None`.
///
/// Rejects protocol-relative (`//host`) and backslash (`/\host`) forms,
/// which browsers resolve to another origin.
#[must_use]
pub fn safe_next(next: Option<&str>) -> Option<&str> {
    let next = next?.trim();
    let is_local = next.starts_with('/')
        && !next.starts_with("//")
        && !next.starts_with("/\\")
        && !next.chars().any(char::is_control);
    is_local.then_some(next)
}

/// Queue the user-facing message for an auth error, or escalate it.
async fn flash_auth_error(session: &Session, err: AuthError) -> Result<()> {
    match err.user_message() {
        Some(message) => {
            push_flash(session, Flash::error(message)).await;
            Ok(())
        }
        None => Err(err.into()),
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(
    OptionalAuth(user): OptionalAuth,
    session: Session,
    Query(query): Query<NextQuery>,
) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }

    LoginTemplate {
        page: Page::new(&session, None).await,
        next: safe_next(query.next.as_deref()).unwrap_or_default().to_owned(),
    }
    .into_response()
}

/// Handle login form submission.
pub async fn login(
    OptionalAuth(current): OptionalAuth,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<NextQuery>,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    if current.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let next = safe_next(form.next.as_deref().or(query.next.as_deref())).map(str::to_owned);

    match AuthService::new(state.pool())
        .login(&form.email, &form.password)
        .await
    {
        Ok(user) => {
            login_user(&session, &user).await?;
            push_flash(
                &session,
                Flash::success(format!("Welcome back, {}!", user.username)),
            )
            .await;
            Ok(Redirect::to(next.as_deref().unwrap_or("/")).into_response())
        }
        Err(e) => {
            tracing::info!(error = %e, "Login failed");
            flash_auth_error(&session, e).await?;
            let target = next.as_deref().map_or_else(|| "/login".to_owned(), login_url);
            Ok(Redirect::to(&target).into_response())
        }
    }
}

/// Handle logout.
///
/// Clears the whole session, then starts a fresh one holding only the
/// goodbye message.
pub async fn logout(RequireAuth(user): RequireAuth, session: Session) -> Result<Response> {
    logout_user(&session).await?;
    push_flash(&session, Flash::success("You have been logged out.")).await;
    tracing::info!(user_id = %user.id, "User logged out");
    Ok(Redirect::to("/login").into_response())
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(OptionalAuth(user): OptionalAuth, session: Session) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }

    RegisterTemplate {
        page: Page::new(&session, None).await,
    }
    .into_response()
}

/// Handle registration form submission.
pub async fn register(
    OptionalAuth(current): OptionalAuth,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    if current.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let registration = Registration {
        username: &form.username,
        email: &form.email,
        password: &form.password,
        confirm_password: &form.confirm_password,
    };

    match AuthService::new(state.pool()).register(registration).await {
        Ok(_) => {
            push_flash(&session, Flash::success("Registration successful! Please login.")).await;
            Ok(Redirect::to("/login").into_response())
        }
        Err(e) => {
            tracing::info!(error = %e, "Registration rejected");
            flash_auth_error(&session, e).await?;
            Ok(Redirect::to("/register").into_response())
        }
    }
}
