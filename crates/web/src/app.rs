//! Router assembly.
//!
//! Shared by the binary and the integration tests so both exercise the same
//! middleware stack.

use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::from_fn,
    routing::get,
};
use sqlx::SqlitePool;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tower_sessions_sqlx_store::SqliteStore;

use crate::middleware::{request_id_middleware, security_headers_middleware, with_session_layer};
use crate::routes;
use crate::state::AppState;

/// Directory served under `/static`.
pub const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Open the session store, creating its table if needed.
///
/// # Errors
///
/// Returns `sqlx::Error` if the session table cannot be created.
pub async fn session_store(pool: &SqlitePool) -> Result<SqliteStore, sqlx::Error> {
    let store = SqliteStore::new(pool.clone());
    store.migrate().await?;
    Ok(store)
}

/// Build the full application router.
pub fn build_router(state: AppState, store: SqliteStore) -> Router {
    let pages = with_session_layer(routes::routes(), store, state.config());

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(pages)
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
