//! The session guard: login, logout and expiry checks for one session.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use secrecy::SecretString;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use super::storage::{SessionStorage, StorageError};
use super::watch::WatchRegistry;
use super::{Clock, LOGGED_OUT, SESSION_EXPIRED, token};
use crate::api::{ApiError, AuthContext};
use crate::error::{clear_sentry_user, set_sentry_user};

/// Login failure.
#[derive(Debug, Error)]
pub enum LoginError {
    /// The API refused the credentials. Carries the message to show.
    #[error("{0}")]
    Rejected(String),

    /// The API could not be reached.
    #[error("Could not reach the server. Please try again.")]
    Unreachable,

    /// The session could not be updated.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// The remote authentication endpoints.
pub trait AuthBackend: Clone + Send + Sync + 'static {
    /// Exchange credentials for a bearer token.
    fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> impl Future<Output = Result<String, LoginError>> + Send;

    /// Tell the API a token is no longer in use.
    fn logout(&self, token: &SecretString) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// What prompted a session check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckTrigger {
    /// A protected page or endpoint was requested.
    Mount,
    /// The periodic expiry watch woke up.
    Tick,
    /// The admin returned to the browser tab.
    Focus,
}

/// Result of a session check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// A valid token is present.
    Authenticated,
    /// No token, and none was expected.
    Anonymous,
    /// The token was torn down during this check.
    Expired { reason: String },
    /// The token vanished without a logout.
    Stale,
}

impl SessionStatus {
    /// Whether protected content may be served.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated)
    }

    /// Message explaining why the session ended, if it just did.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Expired { reason } => Some(reason),
            Self::Stale => Some(SESSION_EXPIRED),
            Self::Authenticated | Self::Anonymous => None,
        }
    }
}

/// Authentication state machine for one session.
///
/// Built per request over that request's session. The token is written only
/// here; everything else reads it.
pub struct SessionGuard<S, A> {
    storage: S,
    auth: A,
    watches: WatchRegistry,
    clock: Arc<dyn Clock>,
    loading: AtomicBool,
}

impl<S: SessionStorage, A: AuthBackend> SessionGuard<S, A> {
    /// Create a guard over `storage`.
    pub fn new(storage: S, auth: A, watches: WatchRegistry, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            auth,
            watches,
            clock,
            loading: AtomicBool::new(false),
        }
    }

    /// The underlying storage.
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Whether the session holds an unexpired token right now.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read.
    pub async fn is_authenticated(&self) -> Result<bool, StorageError> {
        let now = self.clock.now();
        Ok(self
            .storage
            .token()
            .await?
            .is_some_and(|token| !token::is_expired(&token, now)))
    }

    /// Credentials for calling the product API on behalf of this session.
    ///
    /// `None` when the session holds no token or has never been persisted.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read.
    pub async fn auth_context(&self) -> Result<Option<AuthContext>, StorageError> {
        let token = self.storage.token().await?;
        Ok(token
            .zip(self.storage.key())
            .map(|(token, session)| AuthContext {
                session,
                token: SecretString::from(token),
            }))
    }

    /// Whether a login call is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Exchange credentials for a token and start watching it.
    ///
    /// On success the session gets a new identifier, any pending logout
    /// message is discarded and the expiry watch starts. On failure nothing
    /// is written.
    ///
    /// # Errors
    ///
    /// Returns [`LoginError::Rejected`] with the API's message,
    /// [`LoginError::Unreachable`] on network failure, or a storage error.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<(), LoginError> {
        let _loading = LoadingFlag::raise(&self.loading);

        let token = self.auth.login(username, password).await?;

        if let Some(previous) = self.storage.key() {
            self.watches.stop(&previous);
        }
        let key = self.storage.renew().await?;
        self.storage.set_token(&token).await?;
        self.storage.set_was_authenticated(true).await?;
        self.storage.take_logout_reason().await?;
        self.watches.start(key, &token);

        set_sentry_user(username);
        info!("Admin logged in");
        Ok(())
    }

    /// End the session locally and, best effort, remotely.
    ///
    /// Safe to call any number of times. `reason` is shown on the next login
    /// page; it defaults to [`LOGGED_OUT`].
    ///
    /// # Errors
    ///
    /// Returns an error only if the session store cannot be written.
    #[instrument(skip(self))]
    pub async fn logout(&self, reason: Option<&str>) -> Result<(), StorageError> {
        let reason = reason.unwrap_or(LOGGED_OUT);

        if let Some(key) = self.storage.key() {
            self.watches.stop(&key);
            self.watches.clear_revocation(&key);
        }

        let token = self.storage.remove_token().await?;
        self.storage.set_was_authenticated(false).await?;
        self.storage.set_logout_reason(reason).await?;
        clear_sentry_user();

        if let Some(token) = token {
            let auth = self.auth.clone();
            let token = SecretString::from(token);
            tokio::spawn(async move {
                if let Err(error) = auth.logout(&token).await {
                    warn!(error = %error, "Remote logout failed");
                }
            });
            info!(reason, "Admin logged out");
        }

        Ok(())
    }

    /// Recompute the session's state, tearing it down if it has ended.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read or written.
    #[instrument(skip(self))]
    pub async fn check(&self, trigger: CheckTrigger) -> Result<SessionStatus, StorageError> {
        let stored = self.storage.token().await?;
        let key = self.storage.key();

        if trigger == CheckTrigger::Focus
            && let Some(key) = &key
        {
            self.watches.focus(key);
        }

        let Some(token) = stored else {
            if self.storage.was_authenticated().await? {
                debug!("Token missing from an authenticated session");
                self.storage.set_was_authenticated(false).await?;
                self.storage.set_logout_reason(SESSION_EXPIRED).await?;
                return Ok(SessionStatus::Stale);
            }
            return Ok(SessionStatus::Anonymous);
        };

        if let Some(reason) = key.as_ref().and_then(|key| self.watches.take_revocation(key)) {
            self.logout(Some(&reason)).await?;
            return Ok(SessionStatus::Expired { reason });
        }

        if token::is_expired(&token, self.clock.now()) {
            self.logout(Some(SESSION_EXPIRED)).await?;
            return Ok(SessionStatus::Expired {
                reason: SESSION_EXPIRED.to_string(),
            });
        }

        if let Some(key) = key
            && !self.watches.is_watching(&key)
        {
            debug!("Restarting expiry watch");
            self.watches.start(key, &token);
        }

        Ok(SessionStatus::Authenticated)
    }
}

/// Holds `is_loading` up for the lifetime of one login call.
struct LoadingFlag<'a>(&'a AtomicBool);

impl<'a> LoadingFlag<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for LoadingFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use chrono::{DateTime, Utc};
    use secrecy::ExposeSecret;
    use tokio::sync::Notify;

    use super::*;
    use crate::session::token::tests::token_expiring_at;
    use crate::session::{ManualClock, MemorySession, SessionKey, WatchRegistry};

    const START: i64 = 1_800_000_000;

    fn start() -> DateTime<Utc> {
        DateTime::from_timestamp(START, 0).unwrap()
    }

    /// Scripted authentication endpoints.
    #[derive(Clone, Default)]
    struct FakeAuth {
        outcome: Arc<Mutex<Option<Result<String, String>>>>,
        logouts: Arc<Mutex<Vec<String>>>,
        gate: Option<Arc<Notify>>,
        remote_logout_fails: bool,
    }

    impl FakeAuth {
        fn accepting(token: String) -> Self {
            let auth = Self::default();
            *auth.outcome.lock().unwrap() = Some(Ok(token));
            auth
        }

        fn rejecting(message: &str) -> Self {
            let auth = Self::default();
            *auth.outcome.lock().unwrap() = Some(Err(message.to_string()));
            auth
        }

        fn logouts(&self) -> Vec<String> {
            self.logouts.lock().unwrap().clone()
        }
    }

    impl AuthBackend for FakeAuth {
        async fn login(&self, _username: &str, _password: &SecretString) -> Result<String, LoginError> {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            let outcome = self.outcome.lock().unwrap().clone();
            match outcome {
                Some(Ok(token)) => Ok(token),
                Some(Err(message)) => Err(LoginError::Rejected(message)),
                None => Err(LoginError::Unreachable),
            }
        }

        async fn logout(&self, token: &SecretString) -> Result<(), ApiError> {
            self.logouts
                .lock()
                .unwrap()
                .push(token.expose_secret().to_string());
            if self.remote_logout_fails {
                return Err(ApiError::Decode("logout endpoint unavailable".to_string()));
            }
            Ok(())
        }
    }

    struct Harness {
        guard: SessionGuard<MemorySession, FakeAuth>,
        session: MemorySession,
        auth: FakeAuth,
        clock: ManualClock,
        watches: WatchRegistry,
    }

    fn harness(auth: FakeAuth) -> Harness {
        let clock = ManualClock::new(start());
        let watches = WatchRegistry::new(
            Arc::new(clock.clone()),
            Duration::from_secs(60),
            Duration::from_secs(3600),
        );
        let session = MemorySession::new();
        let guard = SessionGuard::new(
            session.clone(),
            auth.clone(),
            watches.clone(),
            Arc::new(clock.clone()),
        );
        Harness {
            guard,
            session,
            auth,
            clock,
            watches,
        }
    }

    fn password() -> SecretString {
        SecretString::from("hunter2")
    }

    fn valid_token() -> String {
        token_expiring_at(start() + chrono::Duration::hours(1))
    }

    async fn logged_in() -> Harness {
        let h = harness(FakeAuth::accepting(valid_token()));
        h.guard.login("admin", &password()).await.unwrap();
        h
    }

    #[tokio::test]
    async fn test_login_success_persists_token_and_starts_watch() {
        let h = harness(FakeAuth::accepting(valid_token()));
        h.session.set_logout_reason("stale message").await.unwrap();

        h.guard.login("admin", &password()).await.unwrap();

        assert!(h.guard.is_authenticated().await.unwrap());
        assert!(h.session.was_authenticated().await.unwrap());
        assert!(h.session.pending_logout_reason().is_none());
        assert!(h.watches.is_watching(&h.session.key().unwrap()));
        assert!(!h.guard.is_loading());
    }

    #[tokio::test]
    async fn test_login_rejection_writes_nothing() {
        let h = harness(FakeAuth::rejecting("Invalid credentials"));

        let err = h.guard.login("admin", &password()).await.unwrap_err();

        assert!(matches!(&err, LoginError::Rejected(m) if m == "Invalid credentials"));
        assert!(h.session.token().await.unwrap().is_none());
        assert!(!h.session.was_authenticated().await.unwrap());
        assert!(h.session.key().is_none());
        assert!(!h.guard.is_loading());
    }

    #[tokio::test]
    async fn test_login_network_failure_is_unreachable() {
        let h = harness(FakeAuth::default());
        let err = h.guard.login("admin", &password()).await.unwrap_err();
        assert!(matches!(err, LoginError::Unreachable));
        assert_eq!(
            err.to_string(),
            "Could not reach the server. Please try again."
        );
    }

    #[tokio::test]
    async fn test_is_loading_only_while_login_in_flight() {
        let gate = Arc::new(Notify::new());
        let auth = FakeAuth {
            gate: Some(gate.clone()),
            ..FakeAuth::accepting(valid_token())
        };
        let h = harness(auth);
        assert!(!h.guard.is_loading());

        let pw = password();
        let login = h.guard.login("admin", &pw);
        tokio::pin!(login);

        // Poll once so the flag is raised and the call parks on the gate.
        assert!(poll_once(login.as_mut()).await.is_none());
        assert!(h.guard.is_loading());

        gate.notify_one();
        login.await.unwrap();
        assert!(!h.guard.is_loading());
    }

    async fn poll_once<F: Future + Unpin>(future: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            output = future => Some(output),
            () = std::future::ready(()) => None,
        }
    }

    #[tokio::test]
    async fn test_logout_clears_token_and_records_default_reason() {
        let h = logged_in().await;
        let key = h.session.key().unwrap();
        let token = h.session.token().await.unwrap().unwrap();

        h.guard.logout(None).await.unwrap();

        assert!(!h.guard.is_authenticated().await.unwrap());
        assert_eq!(h.session.pending_logout_reason().as_deref(), Some(LOGGED_OUT));
        assert!(!h.watches.is_watching(&key));

        tokio::task::yield_now().await;
        assert_eq!(h.auth.logouts(), vec![token]);
    }

    #[tokio::test]
    async fn test_logout_succeeds_locally_when_remote_call_fails() {
        let auth = FakeAuth {
            remote_logout_fails: true,
            ..FakeAuth::accepting(valid_token())
        };
        let h = harness(auth);
        h.guard.login("admin", &password()).await.unwrap();
        let key = h.session.key().unwrap();

        h.guard.logout(Some("Signed out elsewhere")).await.unwrap();
        tokio::task::yield_now().await;

        assert_eq!(h.auth.logouts().len(), 1);
        assert!(h.session.token().await.unwrap().is_none());
        assert!(!h.session.was_authenticated().await.unwrap());
        assert_eq!(
            h.session.pending_logout_reason().as_deref(),
            Some("Signed out elsewhere")
        );
        assert!(!h.watches.is_watching(&key));
        assert_eq!(
            h.guard.check(CheckTrigger::Mount).await.unwrap(),
            SessionStatus::Anonymous
        );
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let h = logged_in().await;

        h.guard.logout(Some("first")).await.unwrap();
        h.guard.logout(Some("second")).await.unwrap();
        tokio::task::yield_now().await;

        assert_eq!(h.session.pending_logout_reason().as_deref(), Some("second"));
        assert_eq!(h.auth.logouts().len(), 1);
        assert_eq!(
            h.guard.check(CheckTrigger::Mount).await.unwrap(),
            SessionStatus::Anonymous
        );
    }

    #[tokio::test]
    async fn test_check_valid_token_is_authenticated() {
        let h = logged_in().await;
        for trigger in [CheckTrigger::Mount, CheckTrigger::Tick, CheckTrigger::Focus] {
            assert_eq!(
                h.guard.check(trigger).await.unwrap(),
                SessionStatus::Authenticated
            );
        }
    }

    #[tokio::test]
    async fn test_check_restarts_stopped_watch() {
        let h = logged_in().await;
        let key = h.session.key().unwrap();
        h.watches.stop(&key);

        assert_eq!(
            h.guard.check(CheckTrigger::Tick).await.unwrap(),
            SessionStatus::Authenticated
        );
        assert!(h.watches.is_watching(&key));
    }

    #[tokio::test]
    async fn test_check_expired_token_logs_out_with_expiry_reason() {
        let h = logged_in().await;
        h.clock.advance(chrono::Duration::hours(1));

        let status = h.guard.check(CheckTrigger::Mount).await.unwrap();

        assert_eq!(
            status,
            SessionStatus::Expired {
                reason: SESSION_EXPIRED.to_string()
            }
        );
        assert!(h.session.token().await.unwrap().is_none());
        assert_eq!(
            h.session.pending_logout_reason().as_deref(),
            Some(SESSION_EXPIRED)
        );
    }

    #[tokio::test]
    async fn test_check_undecodable_token_is_expired() {
        let h = harness(FakeAuth::accepting("opaque".to_string()));
        h.guard.login("admin", &password()).await.unwrap();

        assert!(!h.guard.is_authenticated().await.unwrap());
        let status = h.guard.check(CheckTrigger::Focus).await.unwrap();
        assert!(matches!(status, SessionStatus::Expired { .. }));
    }

    #[tokio::test]
    async fn test_check_applies_out_of_band_revocation() {
        let h = logged_in().await;
        let key: SessionKey = h.session.key().unwrap();

        h.watches.revoke(&key, "Token revoked by server");

        let status = h.guard.check(CheckTrigger::Mount).await.unwrap();
        assert_eq!(
            status,
            SessionStatus::Expired {
                reason: "Token revoked by server".to_string()
            }
        );
        assert_eq!(
            h.session.pending_logout_reason().as_deref(),
            Some("Token revoked by server")
        );
    }

    #[tokio::test]
    async fn test_check_lost_token_is_stale_once() {
        let h = logged_in().await;
        h.session.lose_token();

        assert_eq!(
            h.guard.check(CheckTrigger::Mount).await.unwrap(),
            SessionStatus::Stale
        );
        assert_eq!(
            h.session.pending_logout_reason().as_deref(),
            Some(SESSION_EXPIRED)
        );
        assert_eq!(
            h.guard.check(CheckTrigger::Mount).await.unwrap(),
            SessionStatus::Anonymous
        );
    }

    #[tokio::test]
    async fn test_check_without_login_is_anonymous() {
        let h = harness(FakeAuth::default());
        let status = h.guard.check(CheckTrigger::Mount).await.unwrap();
        assert_eq!(status, SessionStatus::Anonymous);
        assert!(status.reason().is_none());
    }

    #[test]
    fn test_status_reason() {
        assert_eq!(SessionStatus::Stale.reason(), Some(SESSION_EXPIRED));
        assert!(!SessionStatus::Stale.is_authenticated());
        assert!(SessionStatus::Authenticated.is_authenticated());
    }
}
