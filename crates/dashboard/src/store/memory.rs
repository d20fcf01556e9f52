//! In-process realtime document store.
//!
//! Each collection keeps its documents in insertion order and publishes a
//! fresh [`Snapshot`] through a `tokio::sync::watch` channel after every
//! mutation. Watchers that fall behind only see the latest snapshot, which
//! is all a full-replacement consumer needs.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_stream::stream;
use grocify_core::Fields;
use tokio::sync::watch;
use tracing::debug;

use super::{Document, DocumentStore, Snapshot, SnapshotStream, StoreError};

#[derive(Debug, Clone)]
enum FeedEvent {
    Snapshot(Snapshot),
    Failed(String),
}

struct Collection {
    documents: Vec<Document>,
    sequence: u64,
    feed: watch::Sender<FeedEvent>,
}

impl Collection {
    fn new() -> Self {
        let (feed, _) = watch::channel(FeedEvent::Snapshot(Snapshot::default()));
        Self {
            documents: Vec::new(),
            sequence: 0,
            feed,
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            sequence: self.sequence,
            documents: self.documents.clone(),
        }
    }

    fn publish(&mut self) {
        self.sequence += 1;
        let snapshot = self.snapshot();
        self.feed.send_replace(FeedEvent::Snapshot(snapshot));
    }
}

/// Realtime document store held in memory.
///
/// Cheap to clone; clones share the same collections.
#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    collections: Arc<Mutex<HashMap<String, Collection>>>,
}

impl MemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a document under a caller-chosen ID, replacing any existing
    /// one. Used to seed data, including documents with legacy fields.
    pub fn put(&self, collection: &str, id: impl Into<String>, fields: Fields) {
        let id = id.into();
        let mut collections = self.lock();
        let coll = collections
            .entry(collection.to_owned())
            .or_insert_with(Collection::new);
        match coll.documents.iter_mut().find(|d| d.id == id) {
            Some(doc) => doc.fields = fields,
            None => coll.documents.push(Document::new(id, fields)),
        }
        coll.publish();
    }

    /// Current documents of a collection, in store order.
    #[must_use]
    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.lock()
            .get(collection)
            .map(|c| c.documents.clone())
            .unwrap_or_default()
    }

    /// Push a feed error to every current watcher of `collection`.
    pub fn fail_feed(&self, collection: &str, message: impl Into<String>) {
        let mut collections = self.lock();
        let coll = collections
            .entry(collection.to_owned())
            .or_insert_with(Collection::new);
        coll.feed.send_replace(FeedEvent::Failed(message.into()));
    }

    /// Number of live watchers on `collection`.
    #[must_use]
    pub fn watcher_count(&self, collection: &str) -> usize {
        self.lock()
            .get(collection)
            .map_or(0, |c| c.feed.receiver_count())
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Collection>> {
        self.collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl DocumentStore for MemoryDocumentStore {
    async fn add(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let mut collections = self.lock();
        let coll = collections
            .entry(collection.to_owned())
            .or_insert_with(Collection::new);
        coll.documents.push(Document::new(id.clone(), fields));
        coll.publish();
        debug!(collection, id = %id, "Document added");
        Ok(id)
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        let mut collections = self.lock();
        let coll = collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::NotFound(id.to_owned()))?;
        let doc = coll
            .documents
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_owned()))?;
        doc.fields.extend(fields);
        coll.publish();
        debug!(collection, id, "Document updated");
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut collections = self.lock();
        if let Some(coll) = collections.get_mut(collection) {
            let before = coll.documents.len();
            coll.documents.retain(|d| d.id != id);
            if coll.documents.len() != before {
                coll.publish();
                debug!(collection, id, "Document deleted");
            }
        }
        Ok(())
    }

    fn watch(&self, collection: &str) -> SnapshotStream {
        let (initial, mut rx) = {
            let mut collections = self.lock();
            let coll = collections
                .entry(collection.to_owned())
                .or_insert_with(Collection::new);
            (coll.snapshot(), coll.feed.subscribe())
        };

        Box::pin(stream! {
            yield Ok(initial);

            while rx.changed().await.is_ok() {
                let event = rx.borrow_and_update().clone();
                match event {
                    FeedEvent::Snapshot(snapshot) => yield Ok(snapshot),
                    FeedEvent::Failed(message) => yield Err(StoreError::Feed(message)),
                }
            }
        })
    }
}
