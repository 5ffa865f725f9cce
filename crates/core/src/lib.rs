//! Recipe Finder Core - Shared types library.
//!
//! This crate provides the validated value types used across all Recipe Finder components:
//! - `web` - The recipe search site (registration, login, search)
//! - `cli` - Command-line tools for migrations and user management
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. Validation lives here so the web handlers and the CLI
//! reject exactly the same input.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, usernames, and emails

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
