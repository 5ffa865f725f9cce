//! Test harness for Recipe Finder end-to-end tests.
//!
//! Each test spawns the real router on an ephemeral port, backed by a fresh
//! in-memory `SQLite` database and a stub Spoonacular server, then drives it
//! over HTTP with a cookie-keeping `reqwest` client that does not follow
//! redirects.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p recipe-finder-integration-tests
//! ```
//!
//! No external services or credentials are needed.

#![allow(clippy::missing_panics_doc, clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use reqwest::header::LOCATION;
use secrecy::SecretString;
use serde_json::{Value, json};
use sqlx::SqlitePool;
use tokio::net::TcpListener;

use recipe_finder_web::config::{RecipeApiConfig, SiteConfig};
use recipe_finder_web::state::AppState;
use recipe_finder_web::{app, db};

/// API key the stub recipe server accepts.
pub const STUB_API_KEY: &str = "stub-api-key";

/// Recipe ID the stub server knows about.
pub const KNOWN_RECIPE_ID: i64 = 715_538;

/// Default password used by test accounts.
pub const PASSWORD: &str = "s3cret-pasta";

// =============================================================================
// Stub Spoonacular API
// =============================================================================

/// In-process stand-in for the Spoonacular API.
///
/// An empty query or any query containing "pasta" returns two recipes;
/// every other query returns none. Every received search query is recorded.
pub struct StubRecipeApi {
    pub base_url: String,
    queries: Arc<Mutex<Vec<String>>>,
}

impl StubRecipeApi {
    pub async fn spawn() -> Self {
        let queries = Arc::new(Mutex::new(Vec::new()));

        let router = Router::new()
            .route("/recipes/complexSearch", get(complex_search))
            .route("/recipes/{id}/information", get(information))
            .with_state(Arc::clone(&queries));

        let addr = serve(router).await;

        Self {
            base_url: format!("http://{addr}"),
            queries,
        }
    }

    /// Search queries received so far, in order.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

fn pasta_recipe() -> Value {
    json!({
        "id": KNOWN_RECIPE_ID,
        "title": "Bruschetta Style Pork & Pasta",
        "image": "https://img.spoonacular.com/recipes/715538-556x370.jpg",
        "readyInMinutes": 35,
        "servings": 5,
        "sourceUrl": "https://example.com/bruschetta-pork-pasta",
        "extendedIngredients": [
            {"id": 1, "original": "1 cup grape tomatoes, halved"},
            {"id": 2, "original": "8 oz penne pasta"}
        ],
        "analyzedInstructions": [
            {"name": "", "steps": [
                {"number": 1, "step": "Cook the penne until al dente."},
                {"number": 2, "step": "Toss with pork and tomatoes."}
            ]}
        ]
    })
}

async fn complex_search(
    State(queries): State<Arc<Mutex<Vec<String>>>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if params.get("apiKey").map(String::as_str) != Some(STUB_API_KEY) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"status": "failure", "code": 401})),
        )
            .into_response();
    }

    let query = params.get("query").cloned().unwrap_or_default();
    queries.lock().unwrap().push(query.clone());

    let results = if query.is_empty() || query.contains("pasta") {
        vec![
            pasta_recipe(),
            json!({"id": 654_959, "title": "Pasta With Tuna", "image": null}),
        ]
    } else {
        Vec::new()
    };

    Json(json!({
        "offset": 0,
        "number": results.len(),
        "totalResults": results.len(),
        "results": results,
    }))
    .into_response()
}

async fn information(Path(id): Path<i64>) -> Response {
    if id == KNOWN_RECIPE_ID {
        Json(pasta_recipe()).into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({
                "status": "failure",
                "code": 404,
                "message": format!("A recipe with the id {id} does not exist."),
            })),
        )
            .into_response()
    }
}

// =============================================================================
// Application under test
// =============================================================================

/// A running instance of the site plus a client to talk to it.
pub struct TestApp {
    pub base_url: String,
    pub client: reqwest::Client,
    pub pool: SqlitePool,
    pub recipe_api: Option<StubRecipeApi>,
}

impl TestApp {
    /// Spawn the site against the stub recipe API.
    pub async fn spawn() -> Self {
        let stub = StubRecipeApi::spawn().await;
        let base = stub.base_url.clone();
        Self::spawn_with_recipe_api(base, Some(stub)).await
    }

    /// Spawn the site with a recipe API that refuses every connection.
    pub async fn spawn_with_unreachable_api() -> Self {
        Self::spawn_with_recipe_api("http://127.0.0.1:1".to_owned(), None).await
    }

    async fn spawn_with_recipe_api(api_base_url: String, stub: Option<StubRecipeApi>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let config = SiteConfig {
            database_url: SecretString::from("sqlite::memory:"),
            host: addr.ip(),
            port: addr.port(),
            base_url: format!("http://{addr}"),
            session_secret: SecretString::from("q8Zp3Lm7Vx2Rt9Kc4Wn6Bh1Jd5Fs0Gy8Ue"),
            recipes: RecipeApiConfig {
                base_url: api_base_url,
                api_key: SecretString::from(STUB_API_KEY),
                results_per_search: 10,
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };

        let pool = db::create_memory_pool().await.unwrap();
        db::run_migrations(&pool).await.unwrap();
        let store = app::session_store(&pool).await.unwrap();

        let state = AppState::new(config, pool.clone()).unwrap();
        let router = app::build_router(state, store);

        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            client: new_client(),
            pool,
            recipe_api: stub,
        }
    }

    /// Absolute URL for a path on the site.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// A second client with its own, empty cookie jar.
    pub fn fresh_client(&self) -> reqwest::Client {
        new_client()
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.url(path)).send().await.unwrap()
    }

    /// GET a path and return the body, asserting a 200.
    pub async fn get_html(&self, path: &str) -> String {
        let response = self.get(path).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {path}");
        response.text().await.unwrap()
    }

    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .unwrap()
    }

    /// Submit the registration form with a matching confirmation.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> reqwest::Response {
        self.post_form(
            "/register",
            &[
                ("username", username),
                ("email", email),
                ("password", password),
                ("confirm_password", password),
            ],
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.post_form("/login", &[("email", email), ("password", password)])
            .await
    }

    /// Register an account with [`PASSWORD`] and log in as it.
    pub async fn register_and_login(&self, username: &str, email: &str) {
        let response = self.register(username, email, PASSWORD).await;
        assert_eq!(location(&response), "/login");

        let response = self.login(email, PASSWORD).await;
        assert_eq!(location(&response), "/");
    }
}

/// The `Location` header of a redirect response.
pub fn location(response: &reqwest::Response) -> String {
    assert!(
        response.status().is_redirection(),
        "expected a redirect, got {}",
        response.status()
    );
    response.headers()[LOCATION].to_str().unwrap().to_owned()
}

fn new_client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}
