//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::SiteConfig;
use crate::recipes::{RecipeApiError, RecipeClient};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    pool: SqlitePool,
    recipes: RecipeClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Site configuration
    /// * `pool` - `SQLite` connection pool
    ///
    /// # Errors
    ///
    /// Returns an error if the recipe API client cannot be built.
    pub fn new(config: SiteConfig, pool: SqlitePool) -> Result<Self, RecipeApiError> {
        let recipes = RecipeClient::new(&config.recipes)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                recipes,
            }),
        })
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    /// Get a reference to the recipe API client.
    #[must_use]
    pub fn recipes(&self) -> &RecipeClient {
        &self.inner.recipes
    }
}
