//! Transient user notifications.
//!
//! The [`NotificationStore`] is a queue of short-lived messages shown to
//! the operator. Each notification removes itself after its duration
//! unless the duration is zero, in which case it stays until dismissed.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Title used when none is given.
pub const DEFAULT_TITLE: &str = "Notification";

/// Display duration of error notifications.
pub const ERROR_DURATION: Duration = Duration::from_secs(10);

/// Display duration of success notifications.
pub const SUCCESS_DURATION: Duration = Duration::from_secs(3);

/// Display duration of every other kind.
pub const DEFAULT_DURATION: Duration = Duration::from_secs(5);

/// Unique, monotonically increasing notification id.
pub type NotificationId = u64;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Neutral information.
    #[default]
    Info,
    /// An operation succeeded.
    Success,
    /// Something needs attention but nothing failed.
    Warning,
    /// An operation failed.
    Error,
}

impl NotificationKind {
    /// Duration applied by [`NotificationStore::add`] when none is given.
    #[must_use]
    pub fn default_duration(self) -> Duration {
        match self {
            Self::Error => ERROR_DURATION,
            _ => DEFAULT_DURATION,
        }
    }

    /// Lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A notification in the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Unique id.
    pub id: NotificationId,
    /// Severity.
    pub kind: NotificationKind,
    /// Short header.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Optional verbose details.
    pub details: Option<String>,
    /// Time until automatic removal. Zero means never.
    pub duration: Duration,
}

/// Input for [`NotificationStore::add`].
///
/// Unset fields take the store defaults.
#[derive(Debug, Clone, Default)]
pub struct NewNotification {
    /// Severity, defaults to [`NotificationKind::Info`].
    pub kind: Option<NotificationKind>,
    /// Header, defaults to [`DEFAULT_TITLE`].
    pub title: Option<String>,
    /// Body text.
    pub message: String,
    /// Verbose details.
    pub details: Option<String>,
    /// Display duration, defaults to the kind's duration.
    pub duration: Option<Duration>,
}

impl NewNotification {
    /// Create a notification input with only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    /// Set the kind.
    #[must_use]
    pub fn kind(mut self, kind: NotificationKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Set the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the details.
    #[must_use]
    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Set the duration.
    #[must_use]
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }
}

/// Shared queue of notifications.
///
/// Clones share the same queue. Observers get a [`watch::Receiver`] from
/// [`NotificationStore::subscribe`] and are woken on every change.
///
/// Expiry timers are spawned on the ambient tokio runtime. Calling
/// [`NotificationStore::add`] outside a runtime still queues the
/// notification, but it will only leave the queue when removed by hand.
#[derive(Debug, Clone)]
pub struct NotificationStore {
    inner: Arc<StoreInner>,
}

#[derive(Debug)]
struct StoreInner {
    next_id: AtomicU64,
    queue: watch::Sender<Vec<Notification>>,
}

impl NotificationStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        let (queue, _) = watch::channel(Vec::new());
        Self {
            inner: Arc::new(StoreInner {
                next_id: AtomicU64::new(1),
                queue,
            }),
        }
    }

    /// Queue a notification and return its id.
    pub fn add(&self, new: NewNotification) -> NotificationId {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let kind = new.kind.unwrap_or_default();
        let duration = new.duration.unwrap_or_else(|| kind.default_duration());

        let notification = Notification {
            id,
            kind,
            title: new.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            message: new.message,
            details: new.details,
            duration,
        };

        debug!(id, kind = %kind, title = %notification.title, "Notification added");
        self.inner.queue.send_modify(|queue| queue.push(notification));

        if !duration.is_zero() {
            self.schedule_removal(id, duration);
        }

        id
    }

    /// Remove a notification. Unknown ids are ignored.
    pub fn remove(&self, id: NotificationId) {
        self.inner.queue.send_if_modified(|queue| {
            match queue.iter().position(|n| n.id == id) {
                Some(index) => {
                    queue.remove(index);
                    true
                }
                None => false,
            }
        });
    }

    /// Empty the queue.
    ///
    /// Pending expiry timers keep running and find nothing to remove.
    pub fn clear(&self) {
        self.inner.queue.send_if_modified(|queue| {
            let changed = !queue.is_empty();
            queue.clear();
            changed
        });
    }

    /// Queue an error notification shown for 10 seconds.
    pub fn show_error(
        &self,
        title: impl Into<String>,
        message: impl Into<String>,
        details: Option<String>,
    ) -> NotificationId {
        self.add(NewNotification {
            kind: Some(NotificationKind::Error),
            title: Some(title.into()),
            message: message.into(),
            details,
            duration: Some(ERROR_DURATION),
        })
    }

    /// Queue a success notification shown for 3 seconds.
    pub fn show_success(
        &self,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> NotificationId {
        self.show(NotificationKind::Success, title, message, SUCCESS_DURATION)
    }

    /// Queue a warning notification shown for 5 seconds.
    pub fn show_warning(
        &self,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> NotificationId {
        self.show(NotificationKind::Warning, title, message, DEFAULT_DURATION)
    }

    /// Queue an info notification shown for 5 seconds.
    pub fn show_info(&self, title: impl Into<String>, message: impl Into<String>) -> NotificationId {
        self.show(NotificationKind::Info, title, message, DEFAULT_DURATION)
    }

    /// Current queue contents in display order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Notification> {
        self.inner.queue.borrow().clone()
    }

    /// Look up a queued notification.
    #[must_use]
    pub fn get(&self, id: NotificationId) -> Option<Notification> {
        self.inner.queue.borrow().iter().find(|n| n.id == id).cloned()
    }

    /// Number of queued notifications.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.queue.borrow().len()
    }

    /// Returns true if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.queue.borrow().is_empty()
    }

    /// Observe queue changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<Notification>> {
        self.inner.queue.subscribe()
    }

    fn show(
        &self,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        duration: Duration,
    ) -> NotificationId {
        self.add(NewNotification {
            kind: Some(kind),
            title: Some(title.into()),
            message: message.into(),
            details: None,
            duration: Some(duration),
        })
    }

    fn schedule_removal(&self, id: NotificationId, duration: Duration) {
        let Ok(handle) = Handle::try_current() else {
            warn!(id, "No async runtime; notification will not expire");
            return;
        };

        let store = self.clone();
        handle.spawn(async move {
            tokio::time::sleep(duration).await;
            store.remove(id);
        });
    }
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new()
    }
}
