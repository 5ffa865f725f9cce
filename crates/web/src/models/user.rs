//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};

use recipe_finder_core::{Email, UserId, Username};

/// A registered account (domain type).
///
/// The password hash is deliberately not part of this type; it is only
/// loaded alongside the user by the login lookup.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Unique display name.
    pub username: Username,
    /// Unique, lower-cased email address used to log in.
    pub email: Email,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}
