//! End-to-end tests for the admin session lifecycle.
//!
//! Login, logout, token expiry and API-side revocation, all observed through
//! the HTTP surface with a cookie-keeping client.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use bakalah_admin::session::{Clock, ManualClock, SystemClock};
use bakalah_integration_tests::{
    FakeProductApi, REVOKED_MESSAGE, browser, eventually, get_page, location, login,
    spawn_admin,
};
use chrono::Utc;
use reqwest::StatusCode;
use serde_json::Value;

const EXPIRED: &str = "Your session has expired. Please log in again.";

// ============================================================================
// Login & Logout
// ============================================================================

#[tokio::test]
async fn test_protected_page_round_trips_through_login() {
    let (_api, api_url) = FakeProductApi::start().await;
    let admin = spawn_admin(api_url, Arc::new(SystemClock)).await;
    let client = browser();

    let resp = client
        .get(admin.join("admin/products").unwrap())
        .send()
        .await
        .expect("Failed to get products page");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/admin/login?next=%2Fadmin%2Fproducts");

    let resp = login(&client, &admin, "/admin/products").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/admin/products");

    let (status, body) = get_page(&client, admin.join("admin/products").unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("No products yet."));
    assert!(body.contains("data-session-check-ms=\"60000\""));
}

#[tokio::test]
async fn test_login_ignores_foreign_next() {
    let (_api, api_url) = FakeProductApi::start().await;
    let admin = spawn_admin(api_url, Arc::new(SystemClock)).await;
    let client = browser();

    let resp = login(&client, &admin, "https://evil.example/admin").await;
    assert_eq!(location(&resp), "/admin");
}

#[tokio::test]
async fn test_wrong_password_shows_server_message() {
    let (_api, api_url) = FakeProductApi::start().await;
    let admin = spawn_admin(api_url, Arc::new(SystemClock)).await;
    let client = browser();

    let resp = client
        .post(admin.join("admin/login").unwrap())
        .form(&[("username", "admin"), ("password", "wrong"), ("next", "")])
        .send()
        .await
        .expect("Login request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("Failed to read response");
    assert!(body.contains("Invalid username or password"));

    let (status, _) = get_page(&client, admin.join("admin").unwrap()).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_logout_shows_reason_once_and_notifies_api() {
    let (api, api_url) = FakeProductApi::start().await;
    let admin = spawn_admin(api_url, Arc::new(SystemClock)).await;
    let client = browser();
    login(&client, &admin, "").await;

    let resp = client
        .post(admin.join("admin/logout").unwrap())
        .send()
        .await
        .expect("Logout request failed");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/admin/login");

    let (_, body) = get_page(&client, admin.join("admin/login").unwrap()).await;
    assert!(body.contains("You have been logged out."));
    let (_, body) = get_page(&client, admin.join("admin/login").unwrap()).await;
    assert!(!body.contains("You have been logged out."));

    assert!(eventually(|| api.logouts().len() == 1).await);

    let (status, _) = get_page(&client, admin.join("admin").unwrap()).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_logout_completes_when_api_logout_fails() {
    let (api, api_url) = FakeProductApi::start().await;
    let admin = spawn_admin(api_url, Arc::new(SystemClock)).await;
    let client = browser();
    login(&client, &admin, "").await;
    api.set_down(true);

    let resp = client
        .post(admin.join("admin/logout").unwrap())
        .send()
        .await
        .expect("Logout request failed");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/admin/login");
    assert!(eventually(|| api.logouts().len() == 1).await);

    let (_, body) = get_page(&client, admin.join("admin/login").unwrap()).await;
    assert!(body.contains("You have been logged out."));
    let (status, _) = get_page(&client, admin.join("admin/products").unwrap()).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_repeated_logout_is_harmless() {
    let (api, api_url) = FakeProductApi::start().await;
    let admin = spawn_admin(api_url, Arc::new(SystemClock)).await;
    let client = browser();
    login(&client, &admin, "").await;

    for _ in 0..3 {
        let resp = client
            .post(admin.join("admin/logout").unwrap())
            .send()
            .await
            .expect("Logout request failed");
        assert_eq!(location(&resp), "/admin/login");
    }

    assert!(eventually(|| !api.logouts().is_empty()).await);
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    assert_eq!(api.logouts().len(), 1);
}

// ============================================================================
// Expiry & Revocation
// ============================================================================

#[tokio::test]
async fn test_expired_token_redirects_and_explains() {
    let (api, api_url) = FakeProductApi::start().await;
    let clock = ManualClock::new(Utc::now());
    let admin = spawn_admin(api_url, Arc::new(clock.clone()) as Arc<dyn Clock>).await;
    let client = browser();
    login(&client, &admin, "").await;

    let (status, _) = get_page(&client, admin.join("admin").unwrap()).await;
    assert_eq!(status, StatusCode::OK);

    clock.advance(chrono::Duration::hours(2));

    let resp = client
        .get(admin.join("admin/products").unwrap())
        .send()
        .await
        .expect("Failed to get products page");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/admin/login?next=%2Fadmin%2Fproducts");

    let (_, body) = get_page(&client, admin.join("admin/login").unwrap()).await;
    assert!(body.contains(EXPIRED));

    assert!(eventually(|| api.logouts().len() == 1).await);
}

#[tokio::test]
async fn test_api_revocation_ends_session_with_server_reason() {
    let (api, api_url) = FakeProductApi::start().await;
    let admin = spawn_admin(api_url, Arc::new(SystemClock)).await;
    let client = browser();
    login(&client, &admin, "").await;

    api.revoke_all();

    let resp = client
        .get(admin.join("admin/products").unwrap())
        .send()
        .await
        .expect("Failed to get products page");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(location(&resp).starts_with("/admin/login"));

    let (status, body) = get_page(&client, admin.join("admin/login").unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(REVOKED_MESSAGE));

    let (status, _) = get_page(&client, admin.join("admin").unwrap()).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_dashboard_revocation_redirects_to_login() {
    let (api, api_url) = FakeProductApi::start().await;
    let admin = spawn_admin(api_url, Arc::new(SystemClock)).await;
    let client = browser();
    login(&client, &admin, "").await;

    api.revoke_all();

    let (status, _) = get_page(&client, admin.join("admin").unwrap()).await;
    assert_eq!(status, StatusCode::SEE_OTHER);

    let (_, body) = get_page(&client, admin.join("admin/login").unwrap()).await;
    assert!(body.contains(REVOKED_MESSAGE));
}

// ============================================================================
// Status endpoint
// ============================================================================

#[tokio::test]
async fn test_status_reports_expiry_then_401_on_focus() {
    let (_api, api_url) = FakeProductApi::start().await;
    let clock = ManualClock::new(Utc::now());
    let admin = spawn_admin(api_url, Arc::new(clock.clone()) as Arc<dyn Clock>).await;
    let client = browser();
    login(&client, &admin, "").await;

    let resp = client
        .get(admin.join("admin/session/status?trigger=poll").unwrap())
        .send()
        .await
        .expect("Status request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let json: Value = resp.json().await.expect("Invalid JSON");
    assert_eq!(json["authenticated"], true);
    assert!(json["expiresAt"].is_string());

    clock.advance(chrono::Duration::hours(2));

    let resp = client
        .get(admin.join("admin/session/status?trigger=focus").unwrap())
        .send()
        .await
        .expect("Status request failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let json: Value = resp.json().await.expect("Invalid JSON");
    assert_eq!(json["authenticated"], false);
    assert_eq!(json["reason"], EXPIRED);

    let resp = client
        .get(admin.join("admin/session/status").unwrap())
        .send()
        .await
        .expect("Status request failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let json: Value = resp.json().await.expect("Invalid JSON");
    assert!(json.get("reason").is_none());
}
