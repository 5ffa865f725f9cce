//! Recipe search and detail pages. All of them require a login.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use url::form_urlencoded;

use super::Page;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::User;
use crate::models::flash::{Flash, push_flash};
use crate::recipes::Recipe;
use crate::state::AppState;

/// Flash shown when the recipe API cannot be reached.
pub const SEARCH_UNAVAILABLE_MESSAGE: &str = "Recipe search is unavailable right now.";

/// Search input, from the query string (GET) or the form body (POST).
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    pub search_query: String,
}

impl SearchParams {
    /// The query, form-encoded for use in links back to the results.
    fn encoded(&self) -> String {
        form_urlencoded::byte_serialize(self.search_query.as_bytes()).collect()
    }
}

/// Search page template.
#[derive(Template, WebTemplate)]
#[template(path = "recipes/index.html")]
pub struct IndexTemplate {
    pub page: Page,
    pub recipes: Vec<Recipe>,
    pub search_query: String,
    pub encoded_query: String,
}

/// Recipe detail template.
#[derive(Template, WebTemplate)]
#[template(path = "recipes/show.html")]
pub struct ShowTemplate {
    pub page: Page,
    pub recipe: Recipe,
    pub search_query: String,
    pub encoded_query: String,
}

/// Run a search, degrading to no results plus an error flash when the API
/// fails.
async fn run_search(state: &AppState, session: &Session, query: &str) -> Vec<Recipe> {
    match state.recipes().search(query).await {
        Ok(recipes) => recipes,
        Err(e) => {
            tracing::warn!(error = %e, query, "Recipe search failed");
            push_flash(session, Flash::error(SEARCH_UNAVAILABLE_MESSAGE)).await;
            Vec::new()
        }
    }
}

async fn render_index(
    session: &Session,
    user: &User,
    recipes: Vec<Recipe>,
    params: SearchParams,
) -> Response {
    IndexTemplate {
        page: Page::new(session, Some(user)).await,
        recipes,
        encoded_query: params.encoded(),
        search_query: params.search_query,
    }
    .into_response()
}

/// `GET /` - search page. Always queries the API; without `search_query`
/// the page lists the API's default results.
pub async fn index(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<SearchParams>,
) -> Response {
    let recipes = run_search(&state, &session, &params.search_query).await;
    render_index(&session, &user, recipes, params).await
}

/// `POST /` - search form submission.
pub async fn search(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    session: Session,
    Form(params): Form<SearchParams>,
) -> Response {
    let recipes = run_search(&state, &session, &params.search_query).await;
    render_index(&session, &user, recipes, params).await
}

/// `GET /home` - search page with no results and no API call.
pub async fn home(RequireAuth(user): RequireAuth, session: Session) -> Response {
    render_index(&session, &user, Vec::new(), SearchParams::default()).await
}

/// `GET /recipe/{id}` - recipe detail.
///
/// `search_query` is carried through so the back link returns to the same
/// results.
pub async fn show(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i64>,
    Query(params): Query<SearchParams>,
) -> Result<Response> {
    let recipe = state.recipes().get_recipe(id).await?;

    Ok(ShowTemplate {
        page: Page::new(&session, Some(&user)).await,
        recipe,
        encoded_query: params.encoded(),
        search_query: params.search_query,
    }
    .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoded_query() {
        let params = SearchParams {
            search_query: "mac & cheese".to_owned(),
        };
        assert_eq!(params.encoded(), "mac+%26+cheese");
        assert_eq!(SearchParams::default().encoded(), "");
    }
}
