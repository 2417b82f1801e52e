//! # Netbill Console
//!
//! Client core for the netbill administrative console.
//!
//! ## Architecture
//!
//! The console talks to a running netbill backend over its REST API.
//! Everything a front end needs is held in an explicitly constructed
//! [`AppState`]; there are no process-wide singletons. Each piece of
//! shared state publishes its changes through a `tokio::sync::watch`
//! channel, so every observer sees a mutation without the mutating call
//! site having to propagate it.
//!
//! ```text
//!  front end ──▶ Resource<T> ──▶ ApiClient ──▶ backend (/api/...)
//!                    │               │
//!                    │               ├── SessionStore (bearer token)
//!                    │               └── NotificationStore (failures)
//!                    ▼
//!              ResourceState { items, loading, error }
//! ```
//!
//! ## Modules
//!
//! - [`api`] - HTTP client wrapper with failure classification
//! - [`auth`] - Session state, durable token storage, login/logout
//! - [`notification`] - Transient, auto-expiring user notifications
//! - [`resource`] - Generic CRUD accessor over REST collections
//! - [`router`] - Application routes and the navigation guard
//! - [`config`] - Configuration persistence
//! - [`format`] - Display helpers for record fields
//! - [`state`] - Application state bundle
//!
//! ## Example
//!
//! ```rust,no_run
//! use netbill_console::{AppState, Config, ResourceKind};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let state = AppState::new(Config::load())?;
//!
//! state.auth().login("admin", "secret").await?;
//!
//! let tariffs = state.records(ResourceKind::Tariffs);
//! tariffs.mount().await;
//! println!("{} tariffs", tariffs.items().len());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod format;
pub mod notification;
pub mod resource;
pub mod router;
pub mod state;

pub use api::{ApiClient, ApiError, ApiResponse, ApiResult};
pub use auth::{
    Auth, AuthError, FileTokenStore, MemoryTokenStore, Session, SessionStore, StorageError,
    TokenStore,
};
pub use config::{Config, ConfigError};
pub use notification::{NewNotification, Notification, NotificationKind, NotificationStore};
pub use resource::{Record, RecordId, Resource, ResourceKind, ResourceState};
pub use router::{guard, NavigationDecision, Navigator, Route};
pub use state::AppState;
