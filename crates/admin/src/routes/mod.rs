//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                       - Health check
//! GET  /                             - Redirect to /admin
//!
//! # Auth
//! GET  /admin/login                  - Login page
//! POST /admin/login                  - Exchange credentials for a token
//! POST /admin/logout                 - Logout
//!
//! # Dashboard
//! GET  /admin                        - Catalog overview
//!
//! # Products (proxied to the product API)
//! GET  /admin/products               - Product listing
//! POST /admin/products               - Create product
//! GET  /admin/products/new           - New product form
//! GET  /admin/products/{id}/edit     - Edit product form
//! POST /admin/products/{id}          - Update product
//! POST /admin/products/{id}/delete   - Delete product
//!
//! # Session
//! GET  /admin/session/status         - Session check (?trigger=poll|focus)
//! ```

pub mod auth;
pub mod dashboard;
pub mod layout;
pub mod products;
pub mod session;

use axum::{
    Router,
    middleware::from_fn,
    response::Redirect,
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::{
    create_session_layer, request_id_middleware, security_headers_middleware,
};
use crate::state::AppState;

/// Create all admin page routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/admin") }))
        .route("/admin/login", get(auth::login_page).post(auth::login))
        .route("/admin/logout", post(auth::logout))
        .route("/admin", get(dashboard::dashboard))
        .route(
            "/admin/products",
            get(products::index).post(products::create),
        )
        .route("/admin/products/new", get(products::new_product))
        .route("/admin/products/{id}/edit", get(products::edit))
        .route("/admin/products/{id}", post(products::update))
        .route("/admin/products/{id}/delete", post(products::delete))
        .route("/admin/session/status", get(session::status))
}

/// Build the complete admin application with all middleware.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .merge(routes())
        .nest_service("/static", ServeDir::new("crates/admin/static"))
        .layer(from_fn(security_headers_middleware))
        .layer(session_layer)
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri().path(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::time::Duration;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;
    use url::Url;

    use super::*;
    use crate::config::AdminConfig;

    fn test_state() -> AppState {
        AppState::new(AdminConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3001,
            base_url: "http://localhost:3001".to_string(),
            // Nothing listens here.
            product_api_url: Url::parse("http://127.0.0.1:9/").unwrap(),
            session_check_interval: Duration::from_secs(60),
            sentry_dsn: None,
            sentry_environment: None,
            json_logs: false,
        })
    }

    async fn send(request: Request<Body>) -> (StatusCode, header::HeaderMap, String) {
        let response = app(test_state()).oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, String::from_utf8(body.to_vec()).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, _, body) = send(get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_root_redirects_to_dashboard() {
        let (status, headers, _) = send(get("/")).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(headers[header::LOCATION], "/admin");
    }

    #[tokio::test]
    async fn test_protected_page_redirects_with_return_path() {
        let (status, headers, _) = send(get("/admin/products?page=2")).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(
            headers[header::LOCATION],
            "/admin/login?next=%2Fadmin%2Fproducts%3Fpage%3D2"
        );
    }

    #[tokio::test]
    async fn test_protected_post_redirects_without_return_path() {
        let request = Request::builder()
            .method("POST")
            .uri("/admin/products/1/delete")
            .body(Body::empty())
            .unwrap();
        let (status, headers, _) = send(request).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(headers[header::LOCATION], "/admin/login");
    }

    #[tokio::test]
    async fn test_session_status_is_json_401_when_anonymous() {
        let request = Request::builder()
            .uri("/admin/session/status?trigger=poll")
            .header(header::ACCEPT, "application/json")
            .body(Body::empty())
            .unwrap();
        let (status, _, body) = send(request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["authenticated"], false);
    }

    #[tokio::test]
    async fn test_login_page_renders() {
        let (status, headers, body) = send(get("/admin/login?next=%2Fadmin%2Fproducts")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("name=\"username\""));
        assert!(body.contains("value=\"/admin/products\""));
        assert_eq!(headers[header::X_FRAME_OPTIONS], "DENY");
        assert!(headers.contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_login_with_blank_fields_rerenders_form() {
        let request = Request::builder()
            .method("POST")
            .uri("/admin/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("username=&password=&next="))
            .unwrap();
        let (status, _, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Please enter your username and password."));
    }

    #[tokio::test]
    async fn test_login_when_api_unreachable_shows_message() {
        let request = Request::builder()
            .method("POST")
            .uri("/admin/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("username=admin&password=secret&next=%2Fadmin"))
            .unwrap();
        let (status, _, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Could not reach the server. Please try again."));
    }
}
