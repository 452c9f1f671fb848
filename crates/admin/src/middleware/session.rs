//! Session middleware configuration for admin.
//!
//! Sessions live in memory with stricter settings than the storefront
//! (SameSite=Strict, 24hr inactivity expiry). A restart logs everyone out.

use std::time::Duration;

use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::AdminConfig;

/// Session cookie name for admin.
pub const SESSION_COOKIE_NAME: &str = "bakalah_admin_session";

/// How long an idle session survives (24 hours - stricter than storefront).
/// Pending revocations are kept as long.
pub const SESSION_EXPIRY: Duration = Duration::from_secs(24 * 60 * 60);

/// Create the session layer with an in-memory store.
#[must_use]
pub fn create_session_layer(config: &AdminConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::hours(24),
        ))
        .with_secure(config.is_https())
        // SameSite=Strict for admin (stricter than storefront's Lax)
        .with_same_site(tower_sessions::cookie::SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
}
