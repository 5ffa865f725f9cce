//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! # Auth
//! GET  /register               - Registration form
//! POST /register               - Registration action
//! GET  /login                  - Login form (keeps ?next=)
//! POST /login                  - Login action
//! GET  /logout                 - Logout (requires auth)
//!
//! # Recipes (requires auth)
//! GET  /                       - Search page, ?search_query= runs a search
//! POST /                       - Search form submission
//! GET  /home                   - Empty search page
//! GET  /recipe/{id}            - Recipe detail
//! ```
//!
//! Health checks and static files are mounted by [`crate::app::build_router`].

pub mod auth;
pub mod recipes;

use axum::{Router, routing::get};
use tower_sessions::Session;

use crate::models::User;
use crate::models::flash::{Flash, take_flashes};
use crate::state::AppState;

/// Data every page template needs for the shared layout.
pub struct Page {
    /// Messages queued by earlier requests, shown once
    pub flashes: Vec<Flash>,
    /// Logged-in username, for the navigation bar
    pub username: Option<String>,
}

impl Page {
    /// Build the layout context, consuming queued flash messages.
    pub async fn new(session: &Session, user: Option<&User>) -> Self {
        Self {
            flashes: take_flashes(session).await,
            username: user.map(|u| u.username.to_string()),
        }
    }
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", get(auth::logout))
}

/// Create the recipe routes router.
pub fn recipe_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(recipes::index).post(recipes::search))
        .route("/home", get(recipes::home))
        .route("/recipe/{id}", get(recipes::show))
}

/// Create all page routes.
pub fn routes() -> Router<AppState> {
    Router::new().merge(auth_routes()).merge(recipe_routes())
}
