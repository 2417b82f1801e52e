//! # Application State
//!
//! Explicitly constructed state shared by every part of a front end.

use std::sync::Arc;

use serde_json::Value;

use crate::api::{ApiClient, ApiResult};
use crate::auth::{Auth, FileTokenStore, MemoryTokenStore, SessionStore, TokenStore};
use crate::config::Config;
use crate::notification::NotificationStore;
use crate::resource::{Record, Resource, ResourceKind};
use crate::router::Navigator;

/// Global application state.
///
/// Bundles the session, notification queue, navigator and API client.
/// Cloning is cheap and every clone shares the same state, so it can be
/// handed to each view or command that needs it.
///
/// # Examples
///
/// ```rust,ignore
/// let state = AppState::new(Config::load())?;
///
/// let mut notifications = state.notifications().subscribe();
/// let users = state.records(ResourceKind::Users);
/// users.mount().await;
/// ```
#[derive(Clone)]
pub struct AppState {
    config: Config,
    session: SessionStore,
    notifications: NotificationStore,
    navigator: Navigator,
    client: ApiClient,
}

impl AppState {
    /// Creates application state, restoring the session from the token
    /// file named by the config.
    ///
    /// Falls back to an in-memory session if no config directory exists.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Client`](crate::ApiError::Client) if the HTTP
    /// client cannot be built.
    pub fn new(config: Config) -> ApiResult<Self> {
        let storage: Arc<dyn TokenStore> = match config.token_path() {
            Some(path) => Arc::new(FileTokenStore::new(path)),
            None => {
                tracing::warn!("Could not determine config directory, session will not persist");
                Arc::new(MemoryTokenStore::default())
            }
        };
        Self::with_token_store(config, storage)
    }

    /// Creates application state on top of the given token storage.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Client`](crate::ApiError::Client) if the HTTP
    /// client cannot be built.
    pub fn with_token_store(config: Config, storage: Arc<dyn TokenStore>) -> ApiResult<Self> {
        let session = SessionStore::new(storage);
        let notifications = NotificationStore::new();
        let navigator = Navigator::new(session.clone());
        let client = ApiClient::new(&config, session.clone(), notifications.clone())?;

        tracing::debug!(api = %client.base_url(), "Application state ready");

        Ok(Self {
            config,
            session,
            notifications,
            navigator,
            client,
        })
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Session state.
    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Notification queue.
    #[must_use]
    pub fn notifications(&self) -> &NotificationStore {
        &self.notifications
    }

    /// Navigator.
    #[must_use]
    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// API client.
    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Login/logout flow bound to this state.
    #[must_use]
    pub fn auth(&self) -> Auth {
        Auth::new(
            self.client.clone(),
            self.session.clone(),
            self.navigator.clone(),
            self.config.profile_path.clone(),
        )
    }

    /// Typed accessor for a resource.
    #[must_use]
    pub fn resource<T: Record>(&self, kind: ResourceKind) -> Resource<T> {
        Resource::for_kind(self.client.clone(), kind)
    }

    /// Accessor treating records as raw JSON.
    #[must_use]
    pub fn records(&self, kind: ResourceKind) -> Resource<Value> {
        self.resource(kind)
    }
}
