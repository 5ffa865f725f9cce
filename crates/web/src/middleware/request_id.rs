//! Request ID middleware.
//!
//! Each request carries an ID that ties its log lines, its Sentry events
//! and the `x-request-id` response header together.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest upstream-supplied ID that is accepted as-is.
const MAX_UPSTREAM_ID_LENGTH: usize = 64;

/// Accept an upstream ID only if it is short printable ASCII.
fn sanitize_upstream_id(value: &str) -> Option<&str> {
    let value = value.trim();
    let acceptable = !value.is_empty()
        && value.len() <= MAX_UPSTREAM_ID_LENGTH
        && value.bytes().all(|b| b.is_ascii_graphic());
    acceptable.then_some(value)
}

/// Middleware that ensures every request has a unique request ID.
///
/// An `x-request-id` set by a reverse proxy is reused when it passes
/// [`sanitize_upstream_id`]; otherwise a UUID v4 is generated.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(sanitize_upstream_id)
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    Span::current().record("request_id", &request_id);
    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{Router, body::Body, http::Request, middleware, routing::get};
    use tower::ServiceExt;

    use super::*;

    fn app() -> Router {
        Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(middleware::from_fn(request_id_middleware))
    }

    #[test]
    fn test_sanitize_upstream_id() {
        assert_eq!(sanitize_upstream_id(" abc-123 "), Some("abc-123"));
        assert_eq!(sanitize_upstream_id(""), None);
        assert_eq!(sanitize_upstream_id("has space"), None);
        assert_eq!(sanitize_upstream_id(&"x".repeat(65)), None);
    }

    #[tokio::test]
    async fn test_generates_id() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let id = response.headers()[REQUEST_ID_HEADER].to_str().unwrap();
        assert!(Uuid::parse_str(id).is_ok());
    }

    #[tokio::test]
    async fn test_reuses_upstream_id() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header(REQUEST_ID_HEADER, "edge-42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()[REQUEST_ID_HEADER], "edge-42");
    }
}
