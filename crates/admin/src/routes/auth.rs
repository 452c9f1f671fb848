//! Authentication route handlers for admin.
//!
//! Username/password login against the product API. The token it returns
//! lives in the server-side session and never reaches the browser.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{instrument, warn};

use super::layout::Layout;
use crate::error::{LOGIN_PATH, Result};
use crate::filters;
use crate::session::{CheckTrigger, SessionStorage};
use crate::state::AppState;

/// Where to land after login when no usable `next` is given.
const DEFAULT_LANDING: &str = "/admin";

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub username: String,
    pub next: String,
    /// Why the previous session ended. Shown once.
    pub notice: Option<String>,
    pub error_message: Option<String>,
}

impl LoginTemplate {
    fn new(next: Option<&str>) -> Self {
        Self {
            layout: Layout::anonymous(),
            username: String::new(),
            next: next.map(String::from).unwrap_or_default(),
            notice: None,
            error_message: None,
        }
    }
}

// =============================================================================
// Request types
// =============================================================================

/// Query parameters for the login page.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

/// Login form body.
#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub next: String,
}

/// Resolve the post-login destination.
///
/// Only local paths under `/admin` are honoured; anything else (other hosts,
/// protocol-relative URLs, the login page itself) lands on the dashboard.
#[must_use]
pub fn safe_next(next: Option<&str>) -> &str {
    next.map(str::trim)
        .filter(|next| {
            (*next == DEFAULT_LANDING || next.starts_with("/admin/") || next.starts_with("/admin?"))
                && !next.starts_with("//")
                && !next.contains('\\')
                && !next.starts_with(LOGIN_PATH)
        })
        .unwrap_or(DEFAULT_LANDING)
}

// =============================================================================
// Handlers
// =============================================================================

/// Render the login page.
///
/// An already-authenticated session goes straight to its destination. A
/// pending logout reason is shown once and then cleared.
#[instrument(skip(state, session))]
pub async fn login_page(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<LoginQuery>,
) -> Result<Response> {
    let guard = state.guard(session);
    let status = guard.check(CheckTrigger::Mount).await?;
    if status.is_authenticated() {
        return Ok(Redirect::to(safe_next(query.next.as_deref())).into_response());
    }

    let mut page = LoginTemplate::new(query.next.as_deref());
    page.notice = guard.storage().take_logout_reason().await?;
    Ok(page.into_response())
}

/// Exchange credentials for a token.
///
/// Failures re-render the form with the server's message; nothing is
/// retried.
#[instrument(skip_all, fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let next = Some(form.next.as_str()).filter(|next| !next.is_empty());
    let username = form.username.trim();

    if username.is_empty() || form.password.is_empty() {
        let mut page = LoginTemplate::new(next);
        page.username = username.to_string();
        page.error_message = Some("Please enter your username and password.".to_string());
        return Ok(page.into_response());
    }

    let guard = state.guard(session);
    let password = SecretString::from(form.password);
    match guard.login(username, &password).await {
        Ok(()) => Ok(Redirect::to(safe_next(next)).into_response()),
        Err(e) => {
            warn!(error = %e, "Admin login failed");
            let mut page = LoginTemplate::new(next);
            page.username = username.to_string();
            page.error_message = Some(e.to_string());
            Ok(page.into_response())
        }
    }
}

/// End the session and return to the login page.
#[instrument(skip(state, session))]
pub async fn logout(State(state): State<AppState>, session: Session) -> Result<Redirect> {
    state.guard(session).logout(None).await?;
    Ok(Redirect::to(LOGIN_PATH))
}
