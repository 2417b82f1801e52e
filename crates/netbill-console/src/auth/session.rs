//! # Session State
//!
//! Observable record of the operator's authentication.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::watch;

use super::error::StorageError;
use super::storage::TokenStore;

/// Authentication status of the console.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token, if logged in.
    pub token: Option<String>,
    /// Profile of the logged-in operator, if loaded.
    pub user: Option<Value>,
}

impl Session {
    /// Returns true if a non-empty token is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Shared session state backed by durable token storage.
///
/// The token is read from storage once, when the store is created. Token
/// changes are written to storage first and then published to observers.
///
/// # Examples
///
/// ```rust
/// use netbill_console::{MemoryTokenStore, SessionStore};
/// use std::sync::Arc;
///
/// let session = SessionStore::new(Arc::new(MemoryTokenStore::default()));
/// assert!(!session.is_authenticated());
///
/// session.set_token("abc123".to_string()).unwrap();
/// assert_eq!(session.token().as_deref(), Some("abc123"));
/// ```
#[derive(Debug, Clone)]
pub struct SessionStore {
    inner: Arc<SessionInner>,
}

#[derive(Debug)]
struct SessionInner {
    state: watch::Sender<Session>,
    storage: Arc<dyn TokenStore>,
}

impl SessionStore {
    /// Create a session, restoring the token from storage.
    ///
    /// An unreadable store is logged and treated as logged out.
    #[must_use]
    pub fn new(storage: Arc<dyn TokenStore>) -> Self {
        let token = match storage.load() {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load session token, starting logged out");
                None
            }
        };

        if token.is_some() {
            tracing::debug!("Restored session token");
        }

        let (state, _) = watch::channel(Session { token, user: None });
        Self {
            inner: Arc::new(SessionInner { state, storage }),
        }
    }

    /// Current bearer token, if non-empty.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.inner
            .state
            .borrow()
            .token
            .clone()
            .filter(|t| !t.is_empty())
    }

    /// Current operator profile.
    #[must_use]
    pub fn user(&self) -> Option<Value> {
        self.inner.state.borrow().user.clone()
    }

    /// Returns true if a non-empty token is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated()
    }

    /// Copy of the current session.
    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    /// Observe session changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }

    /// Persist a token and make it current.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the token cannot be persisted; the
    /// in-memory session is left unchanged in that case.
    pub fn set_token(&self, token: String) -> Result<(), StorageError> {
        self.inner.storage.save(&token)?;
        self.inner.state.send_modify(|s| s.token = Some(token));
        Ok(())
    }

    /// Drop the token from memory and storage.
    ///
    /// Memory is cleared even if storage fails.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the stored token cannot be removed.
    pub fn clear_token(&self) -> Result<(), StorageError> {
        self.inner.state.send_if_modified(|s| s.token.take().is_some());
        self.inner.storage.clear()
    }

    /// Set the operator profile.
    pub fn set_user(&self, user: Option<Value>) {
        self.inner.state.send_modify(|s| s.user = user);
    }

    /// Drop token and profile from memory and storage.
    ///
    /// Never fails; storage errors are logged.
    pub fn clear(&self) {
        self.inner.state.send_modify(|s| {
            s.token = None;
            s.user = None;
        });
        if let Err(e) = self.inner.storage.clear() {
            tracing::warn!(error = %e, "Failed to clear stored session token");
        }
    }
}
