//! # Routing
//!
//! Defines the application routes and the navigation guard.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

use crate::auth::SessionStore;
use crate::resource::ResourceKind;

/// Upper bound on redirects followed by a single navigation.
const MAX_REDIRECTS: usize = 4;

/// Application routes.
///
/// Every route except [`Route::Login`] requires an authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    /// Root; redirects to [`Route::Account`].
    Home,

    /// Login form.
    Login,

    /// Operator landing view after login.
    Account,

    /// Management view for one resource collection.
    Resource(ResourceKind),

    /// Any path without a view.
    NotFound(String),
}

impl Route {
    /// Resolve a path such as `/tariffs` into a route.
    ///
    /// Query strings, fragments and trailing slashes are ignored.
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');

        match trimmed {
            "" => Self::Home,
            "/login" => Self::Login,
            "/account" => Self::Account,
            other => other
                .strip_prefix('/')
                .and_then(|name| name.parse::<ResourceKind>().ok())
                .map_or_else(|| Self::NotFound(path.to_string()), Self::Resource),
        }
    }

    /// Path of this route.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Login => "/login".to_string(),
            Self::Account => "/account".to_string(),
            Self::Resource(kind) => format!("/{}", kind.endpoint()),
            Self::NotFound(path) => path.clone(),
        }
    }

    /// Returns true if the route needs a token.
    #[must_use]
    pub fn requires_auth(&self) -> bool {
        matches!(self, Self::Account | Self::Resource(_))
    }

    /// Target of a redirect record, if this route is one.
    #[must_use]
    pub fn redirect(&self) -> Option<Route> {
        match self {
            Self::Home => Some(Self::Account),
            _ => None,
        }
    }

    /// Resource shown by this route, if any.
    #[must_use]
    pub fn resource(&self) -> Option<ResourceKind> {
        match self {
            Self::Resource(kind) => Some(*kind),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Outcome of the navigation guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationDecision {
    /// Proceed to the requested route.
    Allow,
    /// Go somewhere else instead.
    Redirect(Route),
}

/// Decide whether a navigation may proceed.
///
/// - unauthenticated and the target requires auth: redirect to login
/// - authenticated and the target is login: redirect to the account view
/// - anything else: allow
#[must_use]
pub fn guard(target: &Route, authenticated: bool) -> NavigationDecision {
    if target.requires_auth() && !authenticated {
        NavigationDecision::Redirect(Route::Login)
    } else if *target == Route::Login && authenticated {
        NavigationDecision::Redirect(Route::Account)
    } else {
        NavigationDecision::Allow
    }
}

/// Tracks the current route and runs the guard before every navigation.
///
/// The guard reads token presence from the session at the moment of each
/// navigation; nothing else carries over between calls. Starts at `/`
/// until the first navigation.
#[derive(Debug, Clone)]
pub struct Navigator {
    session: SessionStore,
    current: Arc<watch::Sender<Route>>,
}

impl Navigator {
    /// Create a navigator reading auth state from `session`.
    #[must_use]
    pub fn new(session: SessionStore) -> Self {
        let (current, _) = watch::channel(Route::Home);
        Self {
            session,
            current: Arc::new(current),
        }
    }

    /// Navigate to a route and return where navigation ended.
    pub fn push(&self, target: Route) -> Route {
        let authenticated = self.session.is_authenticated();
        let requested = target.clone();
        let mut route = target;

        for _ in 0..MAX_REDIRECTS {
            if let Some(next) = route.redirect() {
                route = next;
                continue;
            }
            match guard(&route, authenticated) {
                NavigationDecision::Allow => break,
                NavigationDecision::Redirect(next) => {
                    tracing::debug!(from = %route, to = %next, "Navigation redirected by guard");
                    route = next;
                }
            }
        }

        tracing::debug!(requested = %requested, resolved = %route, "Navigated");
        self.current.send_replace(route.clone());
        route
    }

    /// Navigate to a path.
    pub fn navigate(&self, path: &str) -> Route {
        self.push(Route::parse(path))
    }

    /// Current route.
    #[must_use]
    pub fn current(&self) -> Route {
        self.current.borrow().clone()
    }

    /// Observe route changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.current.subscribe()
    }
}
