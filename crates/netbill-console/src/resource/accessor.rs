//! Generic CRUD accessor.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::kind::ResourceKind;
use super::record::{Record, RecordId};
use crate::api::{ApiClient, ApiError, ApiResult};

/// Observable state of one resource collection.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceState<T> {
    /// Local mirror of the collection.
    pub items: Vec<T>,
    /// True while an operation is in flight.
    pub loading: bool,
    /// Message describing the last failed operation.
    pub error: Option<String>,
}

impl<T> Default for ResourceState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            error: None,
        }
    }
}

/// CRUD accessor for the collection at `/{name}`.
///
/// Keeps a local mirror of the collection and patches it from server
/// responses: a created or updated record returned by the backend is
/// applied in place, and anything unexpected triggers a full refetch.
/// The mirror is never treated as authoritative.
///
/// Clones share state. Operations on one accessor are not coordinated
/// with each other: if two overlap, the response that arrives last wins.
///
/// # Examples
///
/// ```rust,ignore
/// let tariffs: Resource<serde_json::Value> = state.resource(ResourceKind::Tariffs);
///
/// tariffs.mount().await;
/// tariffs.create_item(&json!({"name": "Basic", "price": 500})).await?;
/// tariffs.delete_item(3).await?;
/// ```
pub struct Resource<T: Record> {
    inner: Arc<ResourceInner<T>>,
}

struct ResourceInner<T> {
    name: String,
    client: ApiClient,
    state: watch::Sender<ResourceState<T>>,
    mounted: AtomicBool,
}

impl<T: Record> Clone for Resource<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Clears the loading flag when dropped, on every exit path.
struct LoadingGuard<'a, T> {
    state: &'a watch::Sender<ResourceState<T>>,
}

impl<T> Drop for LoadingGuard<'_, T> {
    fn drop(&mut self) {
        self.state.send_modify(|s| s.loading = false);
    }
}

impl<T: Record> Resource<T> {
    /// Create an accessor for the collection `name`.
    pub fn new(client: ApiClient, name: impl Into<String>) -> Self {
        let (state, _) = watch::channel(ResourceState::default());
        Self {
            inner: Arc::new(ResourceInner {
                name: name.into(),
                client,
                state,
                mounted: AtomicBool::new(false),
            }),
        }
    }

    /// Create an accessor for a known resource.
    pub fn for_kind(client: ApiClient, kind: ResourceKind) -> Self {
        Self::new(client, kind.endpoint())
    }

    /// Collection name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Copy of the current state.
    #[must_use]
    pub fn state(&self) -> ResourceState<T> {
        self.inner.state.borrow().clone()
    }

    /// Copy of the local items.
    #[must_use]
    pub fn items(&self) -> Vec<T> {
        self.inner.state.borrow().items.clone()
    }

    /// Returns true while an operation is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().loading
    }

    /// Message of the last failed operation.
    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.inner.state.borrow().error.clone()
    }

    /// Observe state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ResourceState<T>> {
        self.inner.state.subscribe()
    }

    /// Load the collection the first time a view shows it.
    ///
    /// Later calls do nothing.
    pub async fn mount(&self) {
        if !self.inner.mounted.swap(true, Ordering::AcqRel) {
            self.fetch_items().await;
        }
    }

    /// Replace the local items with the server's collection.
    ///
    /// A body that is not a list of records leaves an empty collection.
    /// On failure the items are emptied and [`Resource::error`] is set; the
    /// failure has already been reported by the client.
    pub async fn fetch_items(&self) {
        let _loading = self.begin();
        self.load().await;
    }

    /// Create a record.
    ///
    /// If the backend returns the created record it is added locally,
    /// otherwise the collection is refetched.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`](crate::ApiError) of the failed request.
    pub async fn create_item<D>(&self, data: &D) -> ApiResult<()>
    where
        D: Serialize + ?Sized,
    {
        let _loading = self.begin();

        match self.inner.client.post(&self.collection_path(), data).await {
            Ok(response) => {
                match usable_record::<T>(response.body) {
                    Some((id, record)) => {
                        debug!(resource = %self.inner.name, id = %id, "Created record applied locally");
                        self.inner
                            .state
                            .send_modify(|s| upsert(&mut s.items, &id, record));
                    }
                    None => {
                        debug!(resource = %self.inner.name, "Create returned no record, refetching");
                        self.load().await;
                    }
                }
                Ok(())
            }
            Err(err) => {
                self.fail("Failed to create item.".to_string());
                Err(err)
            }
        }
    }

    /// Update the record `id`.
    ///
    /// The record returned by the backend replaces the local one. If the
    /// response carries no record, or no local record has that id, the
    /// collection is refetched.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`](crate::ApiError) of the failed request, or
    /// [`ApiError::Client`] for an id that cannot form a path segment
    /// (`.` or `..`).
    pub async fn update_item<D>(&self, id: impl Into<RecordId>, data: &D) -> ApiResult<()>
    where
        D: Serialize + ?Sized,
    {
        let id = id.into();
        let _loading = self.begin();

        let result = match self.item_path(&id) {
            Ok(path) => self.inner.client.put(&path, data).await,
            Err(err) => Err(err),
        };

        match result {
            Ok(response) => {
                let replaced = usable_record::<T>(response.body).is_some_and(|(_, record)| {
                    self.inner
                        .state
                        .send_if_modified(|s| replace(&mut s.items, &id, record))
                });

                if replaced {
                    debug!(resource = %self.inner.name, id = %id, "Updated record applied locally");
                } else {
                    debug!(resource = %self.inner.name, id = %id, "Update not applicable locally, refetching");
                    self.load().await;
                }
                Ok(())
            }
            Err(err) => {
                self.fail(format!("Failed to update item with ID: {id}."));
                Err(err)
            }
        }
    }

    /// Delete the record `id`.
    ///
    /// Removes at most one local record; an id missing locally is fine.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`](crate::ApiError) of the failed request, or
    /// [`ApiError::Client`] for an id that cannot form a path segment
    /// (`.` or `..`).
    pub async fn delete_item(&self, id: impl Into<RecordId>) -> ApiResult<()> {
        let id = id.into();
        let _loading = self.begin();

        let result = match self.item_path(&id) {
            Ok(path) => self.inner.client.delete(&path).await,
            Err(err) => Err(err),
        };

        match result {
            Ok(_) => {
                self.inner.state.send_if_modified(|s| {
                    match s.items.iter().position(|r| r.id().as_ref() == Some(&id)) {
                        Some(index) => {
                            s.items.remove(index);
                            true
                        }
                        None => false,
                    }
                });
                info!(resource = %self.inner.name, id = %id, "Record deleted");
                Ok(())
            }
            Err(err) => {
                self.fail(format!("Failed to delete item with ID: {id}."));
                Err(err)
            }
        }
    }

    fn begin(&self) -> LoadingGuard<'_, T> {
        self.inner.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });
        LoadingGuard {
            state: &self.inner.state,
        }
    }

    /// Fetch the collection without touching the loading flag.
    async fn load(&self) {
        match self.inner.client.get(&self.collection_path()).await {
            Ok(response) => {
                let items = decode_items::<T>(&self.inner.name, response.body);
                info!(resource = %self.inner.name, count = items.len(), "Loaded records");
                self.inner.state.send_modify(|s| s.items = items);
            }
            Err(_) => {
                let message = format!("Failed to load {}.", self.inner.name);
                self.inner.state.send_modify(|s| {
                    s.error = Some(message);
                    s.items.clear();
                });
            }
        }
    }

    fn fail(&self, message: String) {
        self.inner.state.send_modify(|s| s.error = Some(message));
    }

    fn collection_path(&self) -> String {
        format!("/{}", self.inner.name)
    }

    /// `/{name}/{id}` with the id confined to one path segment.
    fn item_path(&self, id: &RecordId) -> ApiResult<String> {
        match id.path_segment() {
            Some(segment) => Ok(format!("/{}/{segment}", self.inner.name)),
            None => {
                let err = ApiError::Client {
                    message: format!("invalid record id {:?}", id.as_str()),
                    details: format!("Resource: {}", self.inner.name),
                };
                self.inner.client.report(&err);
                Err(err)
            }
        }
    }
}

/// Decode a list body, falling back to an empty collection.
fn decode_items<T: Record>(name: &str, body: Value) -> Vec<T> {
    match body {
        Value::Array(values) => values
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<T>, _>>()
            .unwrap_or_else(|e| {
                warn!(resource = %name, error = %e, "Records did not decode, using empty list");
                Vec::new()
            }),
        Value::Null => Vec::new(),
        other => {
            warn!(resource = %name, body = %other, "Expected a list of records, using empty list");
            Vec::new()
        }
    }
}

/// A record with an id, if the body holds one.
fn usable_record<T: Record>(body: Value) -> Option<(RecordId, T)> {
    if body.is_null() {
        return None;
    }
    let record: T = serde_json::from_value(body).ok()?;
    record.id().map(|id| (id, record))
}

fn upsert<T: Record>(items: &mut Vec<T>, id: &RecordId, record: T) {
    match items.iter_mut().find(|r| r.id().as_ref() == Some(id)) {
        Some(existing) => *existing = record,
        None => items.push(record),
    }
}

fn replace<T: Record>(items: &mut [T], id: &RecordId, record: T) -> bool {
    match items.iter_mut().find(|r| r.id().as_ref() == Some(id)) {
        Some(existing) => {
            *existing = record;
            true
        }
        None => false,
    }
}
