//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers (CSP, frame and MIME protection)
//! 5. Session layer (tower-sessions with `SQLite` store, signed cookie)
//!
//! Authentication is not a layer: handlers opt in with the [`RequireAuth`]
//! and [`OptionalAuth`] extractors.

pub mod auth;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{OptionalAuth, RequireAuth, login_user, logout_user};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::with_session_layer;
