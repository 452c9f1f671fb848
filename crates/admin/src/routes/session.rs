//! Session status endpoint polled by the admin pages.
//!
//! The browser calls it on an interval and whenever the tab regains focus;
//! a 401 tells the page to navigate to the login screen.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::session::{CheckTrigger, SessionStorage, token};
use crate::state::AppState;

/// Why the page is asking.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusTrigger {
    #[default]
    Poll,
    Focus,
}

impl From<StatusTrigger> for CheckTrigger {
    fn from(trigger: StatusTrigger) -> Self {
        match trigger {
            StatusTrigger::Poll => Self::Tick,
            StatusTrigger::Focus => Self::Focus,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    #[serde(default)]
    pub trigger: StatusTrigger,
}

/// Body of a status response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBody {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Run a session check and report the result.
///
/// 200 with the token expiry while authenticated, otherwise 401 with the
/// reason the session ended (if it just did).
#[instrument(skip(state, session))]
pub async fn status(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<StatusQuery>,
) -> Result<Response> {
    let guard = state.guard(session);
    let status = guard.check(query.trigger.into()).await?;

    if status.is_authenticated() {
        let expires_at = guard
            .storage()
            .token()
            .await?
            .and_then(|token| token::expires_at(&token));
        return Ok(Json(StatusBody {
            authenticated: true,
            expires_at,
            reason: None,
        })
        .into_response());
    }

    Ok((
        StatusCode::UNAUTHORIZED,
        Json(StatusBody {
            authenticated: false,
            expires_at: None,
            reason: status.reason().map(String::from),
        }),
    )
        .into_response())
}
