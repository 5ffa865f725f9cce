//! Recipe search and detail pages against the stub recipe API.

#![allow(clippy::unwrap_used)]

use recipe_finder_integration_tests::{KNOWN_RECIPE_ID, TestApp, location};
use reqwest::StatusCode;

#[tokio::test]
async fn test_search_via_query_string() {
    let app = TestApp::spawn().await;
    app.register_and_login("julia", "julia@example.com").await;

    let body = app.get_html("/?search_query=pasta").await;
    assert!(body.contains("Bruschetta Style Pork &#38; Pasta"));
    assert!(body.contains("Pasta With Tuna"));
    assert!(body.contains(&format!("/recipe/{KNOWN_RECIPE_ID}?search_query=pasta")));
    assert!(body.contains("Ready in 35 minutes"));

    let stub = app.recipe_api.as_ref().unwrap();
    assert_eq!(stub.queries(), vec!["pasta".to_owned()]);
}

#[tokio::test]
async fn test_search_via_form_post() {
    let app = TestApp::spawn().await;
    app.register_and_login("julia", "julia@example.com").await;

    let response = app.post_form("/", &[("search_query", "pasta")]).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("Pasta With Tuna"));
    assert!(body.contains(r#"value="pasta""#));
}

#[tokio::test]
async fn test_landing_page_lists_default_results() {
    let app = TestApp::spawn().await;
    app.register_and_login("julia", "julia@example.com").await;

    let body = app.get_html("/").await;
    assert!(body.contains("Pasta With Tuna"));
    assert!(!body.contains("No recipes found"));

    let stub = app.recipe_api.as_ref().unwrap();
    assert_eq!(stub.queries(), vec![String::new()]);

    let body = app.get_html("/home").await;
    assert!(!body.contains("recipe-card"));
    assert_eq!(stub.queries().len(), 1);
}

#[tokio::test]
async fn test_search_without_results() {
    let app = TestApp::spawn().await;
    app.register_and_login("julia", "julia@example.com").await;

    let body = app.get_html("/?search_query=granite").await;
    assert!(body.contains(r#"No recipes found for "granite"."#));
}

#[tokio::test]
async fn test_recipe_detail() {
    let app = TestApp::spawn().await;
    app.register_and_login("julia", "julia@example.com").await;

    let body = app
        .get_html(&format!("/recipe/{KNOWN_RECIPE_ID}?search_query=pasta"))
        .await;
    assert!(body.contains("<h1>Bruschetta Style Pork &#38; Pasta</h1>"));
    assert!(!body.contains("Pork & Pasta"));
    assert!(body.contains(r#"href="https://example.com/bruschetta-pork-pasta""#));
    assert!(body.contains("1 cup grape tomatoes, halved"));
    assert!(body.contains("Cook the penne until al dente."));
    assert!(body.contains("Serves 5"));
    assert!(body.contains(r#"href="/?search_query=pasta""#));
}

#[tokio::test]
async fn test_unknown_recipe_is_not_found() {
    let app = TestApp::spawn().await;
    app.register_and_login("julia", "julia@example.com").await;

    let response = app.get("/recipe/1").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_recipe_pages_require_login() {
    let app = TestApp::spawn().await;

    let response = app.get(&format!("/recipe/{KNOWN_RECIPE_ID}")).await;
    assert_eq!(
        location(&response),
        format!("/login?next=%2Frecipe%2F{KNOWN_RECIPE_ID}")
    );
}

#[tokio::test]
async fn test_search_degrades_when_api_unreachable() {
    let app = TestApp::spawn_with_unreachable_api().await;
    app.register_and_login("julia", "julia@example.com").await;

    let body = app.get_html("/?search_query=pasta").await;
    assert!(body.contains("Recipe search is unavailable right now."));
    assert!(!body.contains("recipe-card"));
}

#[tokio::test]
async fn test_detail_fails_when_api_unreachable() {
    let app = TestApp::spawn_with_unreachable_api().await;
    app.register_and_login("julia", "julia@example.com").await;

    let response = app.get(&format!("/recipe/{KNOWN_RECIPE_ID}")).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}
