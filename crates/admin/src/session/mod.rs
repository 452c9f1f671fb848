//! Admin session lifecycle.
//!
//! A session is authenticated while it holds a bearer token that has not
//! expired. Expiry is detected in four places, all converging on
//! [`SessionGuard::logout`]:
//!
//! 1. every protected request (`CheckTrigger::Mount`),
//! 2. the per-session [`ExpiryWatch`] tick,
//! 3. a focus check from the browser (`CheckTrigger::Focus`),
//! 4. a 401 from the product API, reported through [`AuthObserver`].

pub mod clock;
pub mod guard;
pub mod storage;
pub mod token;
pub mod watch;

pub use clock::{Clock, ManualClock, SystemClock};
pub use guard::{AuthBackend, CheckTrigger, LoginError, SessionGuard, SessionStatus};
pub use storage::{MemorySession, SessionStorage, StorageError};
pub use watch::{AuthObserver, ExpiryWatch, WatchRegistry};

/// Reason recorded when a token expires or the API rejects it.
pub const SESSION_EXPIRED: &str = "Your session has expired. Please log in again.";

/// Reason recorded for an explicit logout.
pub const LOGGED_OUT: &str = "You have been logged out.";

/// Session keys for admin authentication data.
pub mod keys {
    /// Bearer token issued by the product API.
    pub const AUTH_TOKEN: &str = "authToken";

    /// Set on login, cleared on logout. A session that has this flag but no
    /// token lost its token without going through logout.
    pub const WAS_AUTHENTICATED: &str = "wasAuthenticated";

    /// Message shown once on the next login page.
    pub const LOGOUT_REASON: &str = "logoutReason";
}

/// Identifies one browser session across requests and background tasks.
///
/// Wraps the session id, so `Debug` never prints it.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionKey(String);

impl SessionKey {
    /// Wrap a session identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionKey([REDACTED])")
    }
}
