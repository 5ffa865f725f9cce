//! Session middleware configuration.
//!
//! Sets up `SQLite`-backed sessions using tower-sessions. The session cookie
//! is signed with a key derived from the configured session secret.

use axum::Router;
use secrecy::ExposeSecret;
use sha2::{Digest, Sha512};
use tower_sessions::cookie::{Key, SameSite, time::Duration};
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;

use crate::config::SiteConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "rf_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Derive the 64-byte cookie signing key from the session secret.
fn signing_key(config: &SiteConfig) -> Key {
    let digest = Sha512::digest(config.session_secret.expose_secret().as_bytes());
    Key::from(digest.as_slice())
}

/// Wrap a router in the session layer backed by `store`.
///
/// The store's table must already exist (see `SqliteStore::migrate`).
pub fn with_session_layer<S>(router: Router<S>, store: SqliteStore, config: &SiteConfig) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let layer = SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::seconds(
            SESSION_EXPIRY_SECONDS,
        )))
        .with_secure(config.is_secure())
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(signing_key(config));

    router.layer(layer)
}
