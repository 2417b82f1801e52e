//! # Resources
//!
//! Generic CRUD access to the backend's REST collections.
//!
//! - [`ResourceKind`] - The collections the console manages
//! - [`Record`] - What the accessor needs from a record (its id)
//! - [`Resource`] - Accessor keeping a local mirror of one collection

mod accessor;
mod kind;
mod record;

pub use accessor::{Resource, ResourceState};
pub use kind::{ParseResourceKindError, ResourceKind};
pub use record::{Record, RecordId};
