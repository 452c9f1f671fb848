//! Where a session's authentication state lives.
//!
//! In the running server this is the request's `tower_sessions::Session`.
//! [`MemorySession`] keeps the same state in process for tests.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tower_sessions::Session;

use super::{SessionKey, keys};

/// Session storage failure.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The session store rejected a read or write.
    #[error("Session store error: {0}")]
    Store(#[from] tower_sessions::session::Error),

    /// The session was saved but has no identifier.
    #[error("Session has no identifier after save")]
    MissingId,
}

/// Per-session authentication state.
///
/// Only the session guard writes through this trait.
pub trait SessionStorage: Send + Sync {
    /// Identifier of the session, if it has been persisted.
    fn key(&self) -> Option<SessionKey>;

    /// Give the session a fresh identifier and persist it.
    fn renew(&self) -> impl Future<Output = Result<SessionKey, StorageError>> + Send;

    /// The stored bearer token.
    fn token(&self) -> impl Future<Output = Result<Option<String>, StorageError>> + Send;

    /// Store a bearer token.
    fn set_token(&self, token: &str) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Remove the bearer token, returning it if one was stored.
    fn remove_token(&self) -> impl Future<Output = Result<Option<String>, StorageError>> + Send;

    /// Whether the session has logged in since its last logout.
    fn was_authenticated(&self) -> impl Future<Output = Result<bool, StorageError>> + Send;

    /// Set or clear the `wasAuthenticated` flag.
    fn set_was_authenticated(
        &self,
        value: bool,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Record the message for the next login page.
    fn set_logout_reason(&self, reason: &str)
    -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Remove and return the pending logout message.
    fn take_logout_reason(
        &self,
    ) -> impl Future<Output = Result<Option<String>, StorageError>> + Send;
}

impl SessionStorage for Session {
    fn key(&self) -> Option<SessionKey> {
        self.id().map(|id| SessionKey::new(id.to_string()))
    }

    async fn renew(&self) -> Result<SessionKey, StorageError> {
        self.cycle_id().await?;
        self.save().await?;
        SessionStorage::key(self).ok_or(StorageError::MissingId)
    }

    async fn token(&self) -> Result<Option<String>, StorageError> {
        Ok(self.get::<String>(keys::AUTH_TOKEN).await?)
    }

    async fn set_token(&self, token: &str) -> Result<(), StorageError> {
        Ok(self.insert(keys::AUTH_TOKEN, token).await?)
    }

    async fn remove_token(&self) -> Result<Option<String>, StorageError> {
        Ok(self.remove::<String>(keys::AUTH_TOKEN).await?)
    }

    async fn was_authenticated(&self) -> Result<bool, StorageError> {
        Ok(self
            .get::<bool>(keys::WAS_AUTHENTICATED)
            .await?
            .unwrap_or(false))
    }

    async fn set_was_authenticated(&self, value: bool) -> Result<(), StorageError> {
        if value {
            self.insert(keys::WAS_AUTHENTICATED, true).await?;
        } else {
            self.remove::<bool>(keys::WAS_AUTHENTICATED).await?;
        }
        Ok(())
    }

    async fn set_logout_reason(&self, reason: &str) -> Result<(), StorageError> {
        Ok(self.insert(keys::LOGOUT_REASON, reason).await?)
    }

    async fn take_logout_reason(&self) -> Result<Option<String>, StorageError> {
        Ok(self.remove::<String>(keys::LOGOUT_REASON).await?)
    }
}

/// In-process session storage. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemorySession {
    state: Arc<Mutex<MemoryState>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    id: Option<String>,
    token: Option<String>,
    was_authenticated: bool,
    logout_reason: Option<String>,
}

impl MemorySession {
    /// Create an empty, not yet persisted session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drop the token without going through logout.
    pub fn lose_token(&self) {
        self.state().token = None;
    }

    /// The pending logout message, without consuming it.
    #[must_use]
    pub fn pending_logout_reason(&self) -> Option<String> {
        self.state().logout_reason.clone()
    }
}

impl SessionStorage for MemorySession {
    fn key(&self) -> Option<SessionKey> {
        self.state().id.clone().map(SessionKey::new)
    }

    async fn renew(&self) -> Result<SessionKey, StorageError> {
        let id = uuid::Uuid::new_v4().to_string();
        self.state().id = Some(id.clone());
        Ok(SessionKey::new(id))
    }

    async fn token(&self) -> Result<Option<String>, StorageError> {
        Ok(self.state().token.clone())
    }

    async fn set_token(&self, token: &str) -> Result<(), StorageError> {
        self.state().token = Some(token.to_string());
        Ok(())
    }

    async fn remove_token(&self) -> Result<Option<String>, StorageError> {
        Ok(self.state().token.take())
    }

    async fn was_authenticated(&self) -> Result<bool, StorageError> {
        Ok(self.state().was_authenticated)
    }

    async fn set_was_authenticated(&self, value: bool) -> Result<(), StorageError> {
        self.state().was_authenticated = value;
        Ok(())
    }

    async fn set_logout_reason(&self, reason: &str) -> Result<(), StorageError> {
        self.state().logout_reason = Some(reason.to_string());
        Ok(())
    }

    async fn take_logout_reason(&self) -> Result<Option<String>, StorageError> {
        Ok(self.state().logout_reason.take())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    fn tower_session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_tower_session_round_trips_auth_state() {
        let session = tower_session();
        assert!(session.token().await.unwrap().is_none());
        assert!(!session.was_authenticated().await.unwrap());

        session.set_token("a.b.c").await.unwrap();
        session.set_was_authenticated(true).await.unwrap();
        session.set_logout_reason("bye").await.unwrap();

        assert_eq!(session.token().await.unwrap().as_deref(), Some("a.b.c"));
        assert!(session.was_authenticated().await.unwrap());
        assert_eq!(session.take_logout_reason().await.unwrap().as_deref(), Some("bye"));
        assert!(session.take_logout_reason().await.unwrap().is_none());

        assert_eq!(session.remove_token().await.unwrap().as_deref(), Some("a.b.c"));
        session.set_was_authenticated(false).await.unwrap();
        assert!(!session.was_authenticated().await.unwrap());
    }

    #[tokio::test]
    async fn test_tower_session_renew_assigns_new_key() {
        let session = tower_session();
        assert!(SessionStorage::key(&session).is_none());

        let first = session.renew().await.unwrap();
        let second = session.renew().await.unwrap();
        assert_ne!(first, second);
        assert_eq!(SessionStorage::key(&session), Some(second));
    }

    #[tokio::test]
    async fn test_memory_session_shares_state_between_clones() {
        let session = MemorySession::new();
        let other = session.clone();

        session.set_token("t").await.unwrap();
        let key = session.renew().await.unwrap();

        assert_eq!(other.token().await.unwrap().as_deref(), Some("t"));
        assert_eq!(other.key(), Some(key));

        other.lose_token();
        assert!(session.token().await.unwrap().is_none());
    }
}
