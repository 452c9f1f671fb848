//! Shared page chrome for admin templates.

use crate::state::AppState;

/// Navigation state for `base.html`.
#[derive(Debug, Clone)]
pub struct Layout {
    /// Request path, used to highlight the active nav entry.
    pub current_path: String,
    /// Whether to show the signed-in navigation and session script.
    pub signed_in: bool,
    /// How often the session script polls, matching the server-side watch.
    pub session_check_ms: u128,
}

impl Layout {
    /// Chrome for a page behind [`RequireAdmin`](crate::middleware::RequireAdmin).
    #[must_use]
    pub fn admin(state: &AppState, current_path: impl Into<String>) -> Self {
        Self {
            current_path: current_path.into(),
            signed_in: true,
            session_check_ms: state.config().session_check_interval.as_millis(),
        }
    }

    /// Chrome for the login page.
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            current_path: crate::error::LOGIN_PATH.to_string(),
            signed_in: false,
            session_check_ms: 0,
        }
    }

    /// Whether `path` is the active section.
    #[must_use]
    pub fn is_active(&self, path: &str) -> bool {
        if path == "/admin" {
            self.current_path == path
        } else {
            self.current_path.starts_with(path)
        }
    }
}
