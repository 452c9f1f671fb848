//! Background expiry watches and out-of-band revocations.
//!
//! Each logged-in session gets an [`ExpiryWatch`]: a tokio task that wakes
//! on an interval or when the browser reports focus, and revokes the session
//! once its token has expired. A watch that hears no focus for its idle limit
//! stops on its own; the next guard check restarts it. Revocations are
//! recorded in the [`WatchRegistry`] and applied by the next guard check for
//! that session.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::sync::Cache;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::guard::CheckTrigger;
use super::{Clock, SESSION_EXPIRED, SessionKey, token};

/// Receives authentication failures reported by the API client.
pub trait AuthObserver: Send + Sync {
    /// The API rejected the token for `session`. `reason` is the message to
    /// show on the login page.
    fn on_unauthorized(&self, session: &SessionKey, reason: &str);
}

/// A running expiry check for one token. Aborts its task when dropped.
#[derive(Debug)]
pub struct ExpiryWatch {
    focus: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

impl ExpiryWatch {
    /// Spawn a watch for a token expiring at `expires_at`.
    ///
    /// A token without a known expiry is treated as already expired.
    /// `on_expired` runs once, after which the task exits. The task also
    /// exits, without calling `on_expired`, after `idle_limit` passes with no
    /// focus signal.
    pub fn spawn<F>(
        expires_at: Option<DateTime<Utc>>,
        clock: Arc<dyn Clock>,
        every: Duration,
        idle_limit: Duration,
        on_expired: F,
    ) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let (focus, rx) = mpsc::channel(1);
        let handle = tokio::spawn(run_watch(
            expires_at, clock, every, idle_limit, rx, on_expired,
        ));
        Self { focus, handle }
    }

    /// Ask the watch to check now. Returns false if the watch has stopped.
    pub fn focus(&self) -> bool {
        match self.focus.try_send(()) {
            // A full queue already has a check pending.
            Ok(()) | Err(mpsc::error::TrySendError::Full(())) => !self.handle.is_finished(),
            Err(mpsc::error::TrySendError::Closed(())) => false,
        }
    }

    /// Whether the task has stopped.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ExpiryWatch {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn run_watch<F>(
    expires_at: Option<DateTime<Utc>>,
    clock: Arc<dyn Clock>,
    every: Duration,
    idle_limit: Duration,
    mut focus: mpsc::Receiver<()>,
    on_expired: F,
) where
    F: FnOnce() + Send + 'static,
{
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let idle = tokio::time::sleep(idle_limit);
    tokio::pin!(idle);

    loop {
        let trigger = tokio::select! {
            _ = ticker.tick() => CheckTrigger::Tick,
            received = focus.recv() => match received {
                Some(()) => {
                    idle.as_mut().reset(Instant::now() + idle_limit);
                    CheckTrigger::Focus
                }
                None => break,
            },
            () = &mut idle => {
                debug!("Expiry watch idle, stopping");
                break;
            }
        };

        if expires_at.is_none_or(|exp| clock.now() >= exp) {
            debug!(?trigger, "Session token expired");
            on_expired();
            break;
        }
    }
}

/// All expiry watches, plus revocations waiting for their session's next
/// request.
///
/// Cheaply cloneable. Registered once as the API client's
/// [`AuthObserver`].
#[derive(Clone)]
pub struct WatchRegistry {
    inner: Arc<WatchRegistryInner>,
}

struct WatchRegistryInner {
    clock: Arc<dyn Clock>,
    every: Duration,
    idle_limit: Duration,
    watches: Mutex<HashMap<SessionKey, ExpiryWatch>>,
    revoked: Cache<SessionKey, String>,
}

impl WatchRegistry {
    /// Create a registry whose watches wake every `every`.
    ///
    /// `inactivity` should match the session inactivity expiry: unclaimed
    /// revocations are forgotten after it, and a watch with no focus for that
    /// long stops.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, every: Duration, inactivity: Duration) -> Self {
        let revoked = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(inactivity)
            .build();

        Self {
            inner: Arc::new(WatchRegistryInner {
                clock,
                every,
                idle_limit: inactivity,
                watches: Mutex::new(HashMap::new()),
                revoked,
            }),
        }
    }

    fn watches(&self) -> MutexGuard<'_, HashMap<SessionKey, ExpiryWatch>> {
        self.inner
            .watches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Lock the watches, dropping those whose task has stopped.
    fn live_watches(&self) -> MutexGuard<'_, HashMap<SessionKey, ExpiryWatch>> {
        let mut watches = self.watches();
        watches.retain(|_, watch| !watch.is_finished());
        watches
    }

    /// Start watching `token` for `session`, replacing any existing watch.
    pub fn start(&self, session: SessionKey, token: &str) {
        let revoked = self.inner.revoked.clone();
        let revoked_key = session.clone();
        let watch = ExpiryWatch::spawn(
            token::expires_at(token),
            Arc::clone(&self.inner.clock),
            self.inner.every,
            self.inner.idle_limit,
            move || {
                info!("Session token expired, revoking");
                revoked.insert(revoked_key, SESSION_EXPIRED.to_string());
            },
        );

        self.live_watches().insert(session, watch);
    }

    /// Stop the watch for `session`. Returns true if a live one was
    /// registered.
    pub fn stop(&self, session: &SessionKey) -> bool {
        self.live_watches().remove(session).is_some()
    }

    /// Ask the watch for `session` to check now.
    pub fn focus(&self, session: &SessionKey) -> bool {
        self.watches().get(session).is_some_and(ExpiryWatch::focus)
    }

    /// Whether a live watch exists for `session`.
    #[must_use]
    pub fn is_watching(&self, session: &SessionKey) -> bool {
        self.watches()
            .get(session)
            .is_some_and(|watch| !watch.is_finished())
    }

    /// Number of live watches.
    #[must_use]
    pub fn active(&self) -> usize {
        self.live_watches().len()
    }

    /// Stop watching `session` and record that its token must be torn down.
    pub fn revoke(&self, session: &SessionKey, reason: &str) {
        self.stop(session);
        self.inner
            .revoked
            .insert(session.clone(), reason.to_string());
    }

    /// Remove and return a pending revocation for `session`.
    #[must_use]
    pub fn take_revocation(&self, session: &SessionKey) -> Option<String> {
        self.inner.revoked.remove(session)
    }

    /// Forget any pending revocation for `session`.
    pub fn clear_revocation(&self, session: &SessionKey) {
        self.inner.revoked.invalidate(session);
    }
}

impl AuthObserver for WatchRegistry {
    fn on_unauthorized(&self, session: &SessionKey, reason: &str) {
        warn!(reason, "Product API rejected session token");
        self.revoke(session, reason);
    }
}
