//! Business logic services.
//!
//! - `auth` - Registration, login, and session user lookup

pub mod auth;
