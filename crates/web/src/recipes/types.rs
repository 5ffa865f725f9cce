//! Spoonacular response types.
//!
//! Only the fields the templates render are modelled. Every field tolerates
//! being absent or `null`, since search results and detail responses carry
//! different subsets depending on the query flags.

use serde::{Deserialize, Deserializer};
use url::Url;

/// Deserialize `null` as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of `GET /recipes/complexSearch`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<Recipe>,
    #[serde(default)]
    pub total_results: Option<u32>,
}

/// A recipe, as returned by both the search and the information endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub ready_in_minutes: Option<u32>,
    #[serde(default)]
    pub servings: Option<u32>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub extended_ingredients: Vec<Ingredient>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub analyzed_instructions: Vec<Instruction>,
}

impl Recipe {
    /// All instruction steps, flattened across instruction groups.
    #[must_use]
    pub fn steps(&self) -> Vec<&Step> {
        self.analyzed_instructions
            .iter()
            .flat_map(|group| group.steps.iter())
            .collect()
    }

    /// Whether the recipe has any instruction steps.
    #[must_use]
    pub fn has_steps(&self) -> bool {
        self.analyzed_instructions
            .iter()
            .any(|group| !group.steps.is_empty())
    }

    /// `sourceUrl`, but only when it is an absolute `http`/`https` link.
    #[must_use]
    pub fn source_link(&self) -> Option<&str> {
        self.source_url
            .as_deref()
            .filter(|raw| Url::parse(raw).is_ok_and(|u| matches!(u.scheme(), "http" | "https")))
    }
}

/// One ingredient line.
#[derive(Debug, Clone, Deserialize)]
pub struct Ingredient {
    /// Ingredient line as written in the source recipe, e.g. "2 cups flour".
    #[serde(default, deserialize_with = "null_as_default")]
    pub original: String,
}

/// A named group of steps ("" for the main method).
#[derive(Debug, Clone, Deserialize)]
pub struct Instruction {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    #[serde(default)]
    pub number: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub step: String,
}
