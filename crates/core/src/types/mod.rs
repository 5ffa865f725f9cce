//! Core types for Recipe Finder.
//!
//! This module provides type-safe wrappers for the user account fields.

pub mod email;
pub mod id;
pub mod username;

pub use email::{Email, EmailError};
pub use id::*;
pub use username::{Username, UsernameError};
