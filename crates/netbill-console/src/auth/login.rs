//! # Login and Logout
//!
//! Credential exchange and session lifecycle.

use serde_json::Value;

use super::error::AuthError;
use super::session::SessionStore;
use crate::api::{ApiClient, ApiResult, LoginRequest, LoginResponse};
use crate::router::{Navigator, Route};

/// Login, logout and profile loading.
///
/// Cheap to clone; all clones act on the same session.
#[derive(Clone)]
pub struct Auth {
    client: ApiClient,
    session: SessionStore,
    navigator: Navigator,
    profile_path: Option<String>,
}

impl Auth {
    /// Create the auth flow.
    ///
    /// `profile_path` is the endpoint [`Auth::fetch_user`] reads the
    /// operator profile from, if the backend has one.
    #[must_use]
    pub fn new(
        client: ApiClient,
        session: SessionStore,
        navigator: Navigator,
        profile_path: Option<String>,
    ) -> Self {
        Self {
            client,
            session,
            navigator,
            profile_path,
        }
    }

    /// Returns true if a non-empty token is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Exchange credentials for a token.
    ///
    /// On success the token is stored durably and in memory and the
    /// navigator moves to the account view. On failure any token state is
    /// cleared and the error is returned; request failures have already
    /// been reported as notifications by the client.
    ///
    /// # Errors
    ///
    /// * [`AuthError::Rejected`] - The request failed (e.g. 401)
    /// * [`AuthError::MissingToken`] - The response held no token
    /// * [`AuthError::Storage`] - The token could not be persisted
    pub async fn login(&self, username: &str, password: &str) -> Result<(), AuthError> {
        match self.exchange(username, password).await {
            Ok(()) => {
                tracing::info!(username = %username, "Logged in");
                self.navigator.push(Route::Account);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(username = %username, error = %err, "Login failed");
                if let Err(e) = self.session.clear_token() {
                    tracing::warn!(error = %e, "Failed to clear stored token after failed login");
                }
                Err(err)
            }
        }
    }

    /// Forget the session and go to the login view. Never fails.
    pub fn logout(&self) {
        self.session.clear();
        self.navigator.push(Route::Login);
        tracing::info!("Logged out");
    }

    /// Load the operator profile into the session.
    ///
    /// Does nothing without a token or when no profile endpoint is
    /// configured. A 401 response logs the operator out.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`](crate::ApiError) of the failed request.
    pub async fn fetch_user(&self) -> ApiResult<()> {
        if !self.session.is_authenticated() {
            return Ok(());
        }
        let Some(path) = self.profile_path.as_deref() else {
            tracing::debug!("No profile endpoint configured");
            return Ok(());
        };

        match self.client.get(path).await {
            Ok(response) => {
                let user = match response.body {
                    body @ Value::Object(_) => Some(body),
                    _ => None,
                };
                self.session.set_user(user);
                Ok(())
            }
            Err(err) => {
                if err.is_unauthorized() {
                    self.logout();
                }
                Err(err)
            }
        }
    }

    async fn exchange(&self, username: &str, password: &str) -> Result<(), AuthError> {
        let response = self
            .client
            .post("/login", &LoginRequest { username, password })
            .await?;

        let token = serde_json::from_value::<LoginResponse>(response.body)
            .ok()
            .map(|r| r.token)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;

        self.session.set_token(token)?;
        Ok(())
    }
}
