//! Record identity.

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

/// Identifier of a record, as used in `/{resource}/{id}` paths.
///
/// Numeric and string ids compare by their textual form, so `7` and
/// `"7"` name the same record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(String);

impl RecordId {
    /// Textual form of the id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The id percent-encoded as a single path segment.
    ///
    /// `/`, `?`, `#` and `%` are escaped so the id cannot leave its
    /// segment. Returns `None` for ids that would be read as dot segments
    /// or an empty segment.
    #[must_use]
    pub fn path_segment(&self) -> Option<String> {
        if matches!(self.0.as_str(), "" | "." | "..") {
            return None;
        }

        let mut url = Url::parse("http://localhost/").ok()?;
        url.path_segments_mut().ok()?.push(&self.0);
        url.path().strip_prefix('/').map(str::to_string)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<u32> for RecordId {
    fn from(id: u32) -> Self {
        Self(id.to_string())
    }
}

impl From<i32> for RecordId {
    fn from(id: i32) -> Self {
        Self(id.to_string())
    }
}

/// A record held by a [`Resource`](super::Resource).
///
/// Records are otherwise opaque; the accessor only needs to find them by
/// id for local updates and deletes.
pub trait Record: DeserializeOwned + Clone + Send + Sync + 'static {
    /// The record's id, or `None` if it has none.
    fn id(&self) -> Option<RecordId>;
}

impl Record for Value {
    fn id(&self) -> Option<RecordId> {
        match self.get("id")? {
            Value::Number(n) => Some(RecordId(n.to_string())),
            Value::String(s) if !s.is_empty() => Some(RecordId(s.clone())),
            _ => None,
        }
    }
}
