//! End-to-end test support for Bakalah Gaharu.
//!
//! Both binaries are started in-process on ephemeral ports, pointed at a
//! [`FakeProductApi`] that stands in for the remote product API.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bakalah-integration-tests
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use serde_json::{Value, json};
use url::Url;

use bakalah_admin::config::AdminConfig;
use bakalah_admin::session::Clock;
use bakalah_storefront::config::StorefrontConfig;

/// Credentials the fake API accepts.
pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "gaharu-secret";

/// Message the fake API sends with a 401 for a revoked token.
pub const REVOKED_MESSAGE: &str = "Token has been revoked";

// ============================================================================
// Fake product API
// ============================================================================

/// In-process stand-in for the remote product API.
#[derive(Clone)]
pub struct FakeProductApi {
    inner: Arc<Mutex<FakeState>>,
}

struct FakeState {
    products: Vec<Value>,
    next_id: u64,
    token_ttl: chrono::Duration,
    issued: Vec<String>,
    revoked: bool,
    down: bool,
    logouts: Vec<String>,
}

/// Mint a JWT-shaped token expiring `ttl` from now.
#[must_use]
pub fn mint_token(ttl: chrono::Duration) -> String {
    let exp = (Utc::now() + ttl).timestamp();
    let nonce = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let payload = URL_SAFE_NO_PAD.encode(json!({ "exp": exp, "jti": nonce }).to_string());
    format!("eyJhbGciOiJIUzI1NiJ9.{payload}.c2lnbmF0dXJl")
}

impl FakeProductApi {
    /// Start the fake API. Tokens it issues are valid for one hour.
    pub async fn start() -> (Self, Url) {
        let api = Self {
            inner: Arc::new(Mutex::new(FakeState {
                products: Vec::new(),
                next_id: 100,
                token_ttl: chrono::Duration::hours(1),
                issued: Vec::new(),
                revoked: false,
                down: false,
                logouts: Vec::new(),
            })),
        };
        let url = serve(api.router()).await;
        (api, url)
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a product as the API would return it.
    pub fn seed(&self, product: Value) {
        self.state().products.push(product);
    }

    /// Products currently stored.
    #[must_use]
    pub fn products(&self) -> Vec<Value> {
        self.state().products.clone()
    }

    /// Reject every issued token from now on.
    pub fn revoke_all(&self) {
        self.state().revoked = true;
    }

    /// Make the product list fail with a 500.
    pub fn set_down(&self, down: bool) {
        self.state().down = down;
    }

    /// Bearer tokens received on the logout endpoint.
    #[must_use]
    pub fn logouts(&self) -> Vec<String> {
        self.state().logouts.clone()
    }

    fn router(&self) -> Router {
        Router::new()
            .route("/api/auth/login", post(fake_login))
            .route("/api/auth/logout", post(fake_logout))
            .route("/api/products", get(fake_list).post(fake_create))
            .route(
                "/api/products/{id}",
                get(fake_get).put(fake_update).delete(fake_delete),
            )
            .with_state(self.clone())
    }

    /// Check the bearer token. `required` rejects anonymous requests.
    fn authorize(&self, headers: &HeaderMap, required: bool) -> Result<(), Response> {
        let bearer = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));

        let state = self.state();
        match bearer {
            None if !required => Ok(()),
            Some(token) if !state.revoked && state.issued.iter().any(|t| t == token) => Ok(()),
            _ => Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({ "message": REVOKED_MESSAGE })),
            )
                .into_response()),
        }
    }
}

async fn fake_login(State(api): State<FakeProductApi>, Json(body): Json<Value>) -> Response {
    if body["username"] != USERNAME || body["password"] != PASSWORD {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid username or password" })),
        )
            .into_response();
    }

    let mut state = api.state();
    let token = mint_token(state.token_ttl);
    state.issued.push(token.clone());
    Json(json!({ "token": token })).into_response()
}

async fn fake_logout(State(api): State<FakeProductApi>, headers: HeaderMap) -> StatusCode {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or_default()
        .to_string();
    let mut state = api.state();
    state.logouts.push(bearer);
    if state.down {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::NO_CONTENT
    }
}

async fn fake_list(State(api): State<FakeProductApi>, headers: HeaderMap) -> Response {
    if let Err(rejection) = api.authorize(&headers, false) {
        return rejection;
    }
    let state = api.state();
    if state.down {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "database offline" })),
        )
            .into_response();
    }
    Json(Value::Array(state.products.clone())).into_response()
}

async fn fake_get(
    State(api): State<FakeProductApi>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if let Err(rejection) = api.authorize(&headers, false) {
        return rejection;
    }
    api.state()
        .products
        .iter()
        .find(|p| p["id"] == id.as_str())
        .cloned()
        .map_or_else(
            || (StatusCode::NOT_FOUND, Json(json!({ "message": "Product not found" }))).into_response(),
            |product| Json(product).into_response(),
        )
}

async fn fake_create(
    State(api): State<FakeProductApi>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Response {
    if let Err(rejection) = api.authorize(&headers, true) {
        return rejection;
    }
    let mut state = api.state();
    state.next_id += 1;
    body["id"] = json!(state.next_id.to_string());
    state.products.push(body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn fake_update(
    State(api): State<FakeProductApi>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(mut body): Json<Value>,
) -> Response {
    if let Err(rejection) = api.authorize(&headers, true) {
        return rejection;
    }
    let mut state = api.state();
    let Some(slot) = state.products.iter_mut().find(|p| p["id"] == id.as_str()) else {
        return (StatusCode::NOT_FOUND, Json(json!({ "message": "Product not found" })))
            .into_response();
    };
    body["id"] = json!(id);
    *slot = body.clone();
    Json(body).into_response()
}

async fn fake_delete(
    State(api): State<FakeProductApi>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if let Err(rejection) = api.authorize(&headers, true) {
        return rejection;
    }
    let mut state = api.state();
    let before = state.products.len();
    state.products.retain(|p| p["id"] != id.as_str());
    if state.products.len() == before {
        StatusCode::NOT_FOUND.into_response()
    } else {
        StatusCode::NO_CONTENT.into_response()
    }
}

// ============================================================================
// Servers
// ============================================================================

/// Serve `router` on an ephemeral port and return its base URL.
pub async fn serve(router: Router) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Listener has no address");
    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Test server failed");
    });
    Url::parse(&format!("http://{addr}/")).expect("Invalid test server URL")
}

fn admin_config(api_url: Url) -> AdminConfig {
    AdminConfig {
        host: "127.0.0.1".parse().expect("Invalid host"),
        port: 0,
        base_url: "http://127.0.0.1".to_string(),
        product_api_url: api_url,
        session_check_interval: Duration::from_secs(60),
        sentry_dsn: None,
        sentry_environment: None,
        json_logs: false,
    }
}

/// Start the admin panel against `api_url`, reading time from `clock`.
pub async fn spawn_admin(api_url: Url, clock: Arc<dyn Clock>) -> Url {
    let state = bakalah_admin::AppState::with_clock(admin_config(api_url), clock);
    serve(bakalah_admin::app(state)).await
}

/// Start the storefront against `api_url`.
///
/// No background refresher runs; tests call
/// [`CatalogStore::refresh`](bakalah_storefront::services::catalog::CatalogStore::refresh)
/// through the returned state when they need one.
pub async fn spawn_storefront(api_url: Url) -> (Url, bakalah_storefront::AppState) {
    let state = bakalah_storefront::AppState::new(StorefrontConfig {
        host: "127.0.0.1".parse().expect("Invalid host"),
        port: 0,
        base_url: "http://127.0.0.1".to_string(),
        product_api_url: api_url,
        product_api_token: None,
        catalog_refresh: Duration::from_secs(300),
        sentry_dsn: None,
        sentry_environment: None,
        json_logs: false,
    });
    let url = serve(bakalah_storefront::app(state.clone())).await;
    (url, state)
}

// ============================================================================
// Browser
// ============================================================================

/// A cookie-keeping client that does not follow redirects.
#[must_use]
pub fn browser() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// The `Location` header of a redirect.
#[must_use]
pub fn location(response: &reqwest::Response) -> String {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Submit the admin login form.
pub async fn login(client: &reqwest::Client, admin: &Url, next: &str) -> reqwest::Response {
    client
        .post(admin.join("admin/login").expect("Invalid URL"))
        .form(&[("username", USERNAME), ("password", PASSWORD), ("next", next)])
        .send()
        .await
        .expect("Login request failed")
}

/// GET a page and return its status and body.
pub async fn get_page(client: &reqwest::Client, url: Url) -> (reqwest::StatusCode, String) {
    let response = client.get(url).send().await.expect("Request failed");
    let status = response.status();
    let body = response.text().await.expect("Failed to read response");
    (status, body)
}

/// Wait up to two seconds for `condition` to hold.
pub async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..40 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    condition()
}
