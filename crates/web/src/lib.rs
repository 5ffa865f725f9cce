//! Recipe Finder web application library.
//!
//! The binary in `main.rs` is a thin wrapper; everything it serves is built
//! here so the CLI and the integration tests can reuse it.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod recipes;
pub mod routes;
pub mod services;
pub mod state;
