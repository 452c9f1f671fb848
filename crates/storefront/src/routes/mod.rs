//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page (hero, about, product grid, contact)
//! GET  /health                 - Health check
//! GET  /products/{id}          - Product detail
//! GET  /lang/{code}            - Store language choice, redirect home
//! GET  /api/catalog            - Current catalog as JSON
//! GET  /static/*               - Static assets
//! GET  /images/*               - Product images
//! ```

pub mod api;
pub mod home;
pub mod language;
pub mod layout;
pub mod products;

use axum::{Router, middleware::from_fn, response::Response, routing::get};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::{
    CurrentLanguage, create_session_layer, request_id_middleware, security_headers_middleware,
};
use crate::state::AppState;

/// Create all page and API routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/products/{id}", get(products::show))
        .route("/lang/{code}", get(language::switch))
        .route("/api/catalog", get(api::catalog::catalog))
}

/// Build the complete storefront application with all middleware.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .merge(routes())
        .nest_service("/static", ServeDir::new("crates/storefront/static"))
        .nest_service("/images", ServeDir::new("crates/storefront/static/images"))
        .fallback(fallback)
        .layer(from_fn(security_headers_middleware))
        .layer(session_layer)
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
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
///
/// Returns "ok" if the server is running. Does not check the product API;
/// the storefront serves its static catalog without it.
async fn health() -> &'static str {
    "ok"
}

async fn fallback(CurrentLanguage(lang): CurrentLanguage) -> Response {
    products::not_found(lang)
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
    use crate::config::StorefrontConfig;

    fn test_state() -> AppState {
        AppState::new(StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            // Nothing listens here; remote lookups fail fast.
            product_api_url: Url::parse("http://127.0.0.1:9/").unwrap(),
            product_api_token: None,
            catalog_refresh: Duration::from_secs(300),
            sentry_dsn: None,
            sentry_environment: None,
            json_logs: false,
        })
    }

    async fn get(uri: &str, accept_language: Option<&str>) -> (StatusCode, String) {
        let mut request = Request::builder().uri(uri);
        if let Some(lang) = accept_language {
            request = request.header(header::ACCEPT_LANGUAGE, lang);
        }
        let response = app(test_state())
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get("/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_home_renders_static_catalog() {
        let (status, body) = get("/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("lang=\"en\""));
        assert!(body.contains("Merauke"));
        assert!(body.contains("/products/1"));
    }

    #[tokio::test]
    async fn test_home_in_arabic_is_rtl() {
        let (_, body) = get("/?lang=ar", None).await;
        assert!(body.contains("dir=\"rtl\""));

        let (_, body) = get("/", Some("ar-SA,en;q=0.5")).await;
        assert!(body.contains("dir=\"rtl\""));
    }

    #[tokio::test]
    async fn test_static_product_detail() {
        let (status, body) = get("/products/3?lang=id", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("lang=\"id\""));
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_found_page() {
        let (status, body) = get("/products/does-not-exist", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("Product not found"));
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found_page() {
        let (status, _) = get("/nowhere", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_catalog_json_before_first_refresh() {
        let (status, body) = get("/api/catalog", None).await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["usingFallback"], false);
        assert_eq!(json["products"].as_array().unwrap().len(), 4);
        assert!(json.get("refreshedAt").is_none());
    }

    #[tokio::test]
    async fn test_language_switch_sets_cookie() {
        let response = app(test_state())
            .oneshot(Request::builder().uri("/lang/ar").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");
        assert!(response.headers().contains_key(header::SET_COOKIE));
    }

    #[tokio::test]
    async fn test_security_headers_and_request_id() {
        let response = app(test_state())
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let headers = response.headers();
        assert_eq!(headers[header::X_FRAME_OPTIONS], "DENY");
        assert!(headers.contains_key(header::CONTENT_SECURITY_POLICY));
        assert!(headers.contains_key("x-request-id"));
    }
}
