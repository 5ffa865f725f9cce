//! Spoonacular recipe API client.
//!
//! Two read-only calls are made:
//!
//! - `GET {base}/recipes/complexSearch` for the search page
//! - `GET {base}/recipes/{id}/information` for the detail page
//!
//! The API key travels as the `apiKey` query parameter.

pub mod types;

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use crate::config::RecipeApiConfig;

pub use types::{Ingredient, Instruction, Recipe, SearchResponse, Step};

/// Request timeout for outbound API calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur when calling the recipe API.
#[derive(Debug, Error)]
pub enum RecipeApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("recipe API returned {0}")]
    Status(StatusCode),

    /// The requested recipe does not exist.
    #[error("recipe {0} not found")]
    NotFound(i64),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configured base URL could not be joined with a request path.
    #[error("invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Client for the Spoonacular recipe API.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct RecipeClient {
    inner: Arc<RecipeClientInner>,
}

struct RecipeClientInner {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
    results_per_search: u32,
}

impl RecipeClient {
    /// Create a new recipe API client.
    ///
    /// # Errors
    ///
    /// Returns `RecipeApiError::Http` if the HTTP client cannot be built.
    pub fn new(config: &RecipeApiConfig) -> Result<Self, RecipeApiError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            inner: Arc::new(RecipeClientInner {
                client,
                base_url: config.base_url.trim_end_matches('/').to_owned(),
                api_key: config.api_key.clone(),
                results_per_search: config.results_per_search,
            }),
        })
    }

    /// Search recipes by free text.
    ///
    /// Surrounding whitespace is trimmed. An empty query is still sent; the
    /// API then answers with its default selection.
    ///
    /// # Errors
    ///
    /// Returns `RecipeApiError::Status` for non-success responses, or
    /// `RecipeApiError::Http`/`RecipeApiError::Parse` on transport and
    /// decoding failures.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<Recipe>, RecipeApiError> {
        let url = self.search_url(query.trim())?;
        let response: SearchResponse = self.get_json(url).await?;

        tracing::debug!(
            results = response.results.len(),
            total = ?response.total_results,
            "Recipe search completed"
        );

        Ok(response.results)
    }

    /// Fetch full information for one recipe.
    ///
    /// # Errors
    ///
    /// Returns `RecipeApiError::NotFound` if the API answers 404, otherwise
    /// the same errors as [`RecipeClient::search`].
    #[instrument(skip(self))]
    pub async fn get_recipe(&self, id: i64) -> Result<Recipe, RecipeApiError> {
        let url = self.recipe_url(id)?;
        self.get_json(url).await.map_err(|e| match e {
            RecipeApiError::Status(StatusCode::NOT_FOUND) => RecipeApiError::NotFound(id),
            other => other,
        })
    }

    fn search_url(&self, query: &str) -> Result<Url, RecipeApiError> {
        let number = self.inner.results_per_search.to_string();
        let url = Url::parse_with_params(
            &format!("{}/recipes/complexSearch", self.inner.base_url),
            &[
                ("apiKey", self.inner.api_key.expose_secret()),
                ("query", query),
                ("number", number.as_str()),
                ("instructionsRequired", "true"),
                ("addRecipeInformation", "true"),
                ("fillIngredients", "true"),
            ],
        )?;
        Ok(url)
    }

    fn recipe_url(&self, id: i64) -> Result<Url, RecipeApiError> {
        let url = Url::parse_with_params(
            &format!("{}/recipes/{id}/information", self.inner.base_url),
            &[("apiKey", self.inner.api_key.expose_secret())],
        )?;
        Ok(url)
    }

    /// Perform a GET and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, RecipeApiError> {
        let response = self.inner.client.get(url).send().await?;
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            if status != StatusCode::NOT_FOUND {
                tracing::warn!(
                    status = %status,
                    body = %response_text.chars().take(200).collect::<String>(),
                    "Recipe API returned non-success status"
                );
            }
            return Err(RecipeApiError::Status(status));
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse recipe API response"
            );
            RecipeApiError::Parse(e)
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> RecipeClient {
        RecipeClient::new(&RecipeApiConfig {
            base_url: base_url.to_owned(),
            api_key: SecretString::from("test-key"),
            results_per_search: 10,
        })
        .unwrap()
    }

    #[test]
    fn test_search_url() {
        let url = client("https://api.spoonacular.com/")
            .search_url("pasta & peas")
            .unwrap();

        assert_eq!(url.path(), "/recipes/complexSearch");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            [
                ("apiKey", "test-key"),
                ("query", "pasta & peas"),
                ("number", "10"),
                ("instructionsRequired", "true"),
                ("addRecipeInformation", "true"),
                ("fillIngredients", "true"),
            ]
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
        );
    }

    #[test]
    fn test_recipe_url() {
        let url = client("https://api.spoonacular.com").recipe_url(715_538).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.spoonacular.com/recipes/715538/information?apiKey=test-key"
        );
    }

    #[test]
    fn test_empty_query_is_still_sent() {
        let url = client("https://api.spoonacular.com").search_url("").unwrap();
        assert!(url.query_pairs().any(|(k, v)| k == "query" && v.is_empty()));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            RecipeApiError::NotFound(7).to_string(),
            "recipe 7 not found"
        );
        assert_eq!(
            RecipeApiError::Status(StatusCode::PAYMENT_REQUIRED).to_string(),
            "recipe API returned 402 Payment Required"
        );
    }
}
