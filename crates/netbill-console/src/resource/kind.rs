//! Resource collections exposed by the backend.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A REST collection managed by the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// Operator and subscriber accounts.
    Users,
    /// Billing plans.
    Tariffs,
    /// Network equipment.
    Equipment,
    /// Service contracts.
    Contracts,
    /// Subscriber connections.
    Connections,
    /// Client organizations and individuals.
    Clients,
}

impl ResourceKind {
    /// Every resource, in menu order.
    pub const ALL: [ResourceKind; 6] = [
        Self::Users,
        Self::Tariffs,
        Self::Equipment,
        Self::Contracts,
        Self::Connections,
        Self::Clients,
    ];

    /// Endpoint name under the API base, e.g. `tariffs`.
    #[must_use]
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Tariffs => "tariffs",
            Self::Equipment => "equipment",
            Self::Contracts => "contracts",
            Self::Connections => "connections",
            Self::Clients => "clients",
        }
    }

    /// Human-readable view title.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Users => "Users",
            Self::Tariffs => "Tariffs",
            Self::Equipment => "Equipment",
            Self::Contracts => "Contracts",
            Self::Connections => "Connections",
            Self::Clients => "Clients",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint())
    }
}

/// Error returned when a name matches no resource.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown resource: {0}")]
pub struct ParseResourceKindError(pub String);

impl FromStr for ResourceKind {
    type Err = ParseResourceKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.endpoint().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseResourceKindError(s.to_string()))
    }
}
