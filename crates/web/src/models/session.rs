//! Session-related types.
//!
//! Only an opaque user ID is kept in the session; the user record is loaded
//! from the database on every authenticated request.

/// Session keys for authentication data.
pub mod keys {
    /// Key for the logged-in user's ID.
    pub const USER_ID: &str = "user_id";

    /// Key for queued flash messages.
    pub const FLASHES: &str = "_flashes";
}
