//! Remote document store abstraction.
//!
//! Products live in a named collection of a realtime document store. The
//! store pushes a full [`Snapshot`] of the collection whenever any document
//! changes; mutations go through add/update/delete.
//!
//! Two backends are provided:
//!
//! - [`MemoryDocumentStore`] - in-process realtime store
//! - [`HttpDocumentStore`] - REST mutations plus a server-sent-events feed
//!
//! [`AnyStore`] picks one from configuration.

pub mod document;
pub mod http;
pub mod memory;

pub use document::{Document, Snapshot};
pub use http::HttpDocumentStore;
pub use memory::MemoryDocumentStore;

use std::future::Future;

use futures::stream::BoxStream;
use grocify_core::Fields;
use thiserror::Error;

use crate::auth::TokenStore;
use crate::config::DashboardConfig;

/// Stream of collection snapshots, in store order.
///
/// An `Err` item means the feed failed. The stream ending means the store
/// closed the feed.
pub type SnapshotStream = BoxStream<'static, Result<Snapshot, StoreError>>;

/// Errors that can occur when talking to a document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No document with this ID exists.
    #[error("document not found: {0}")]
    NotFound(String),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with an error status.
    #[error("store rejected request (HTTP {status}): {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body.
        message: String,
    },

    /// A response or feed event could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),

    /// The realtime feed reported an error.
    #[error("feed error: {0}")]
    Feed(String),

    /// The collection or document path is not usable.
    #[error("invalid path: {0}")]
    InvalidPath(String),
}

/// A realtime document store.
///
/// Implementations are cheap handles; the feed returned by
/// [`watch`](Self::watch) must not borrow the store.
pub trait DocumentStore: Send + Sync + 'static {
    /// Add a document and return its store-assigned ID.
    fn add(
        &self,
        collection: &str,
        fields: Fields,
    ) -> impl Future<Output = Result<String, StoreError>> + Send;

    /// Merge `fields` into an existing document.
    ///
    /// Fails with [`StoreError::NotFound`] if the document does not exist.
    fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Delete a document.
    fn delete(
        &self,
        collection: &str,
        id: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Subscribe to snapshots of `collection`.
    ///
    /// The first item reflects the collection as it is now. Snapshots are
    /// delivered in store order; duplicates are possible.
    fn watch(&self, collection: &str) -> SnapshotStream;
}

/// Store backend chosen at startup.
#[derive(Clone)]
pub enum AnyStore {
    Memory(MemoryDocumentStore),
    Http(HttpDocumentStore),
}

impl AnyStore {
    /// Use the HTTP store when `store_url` is configured, otherwise an
    /// in-process store.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &DashboardConfig, tokens: TokenStore) -> Result<Self, StoreError> {
        match &config.store_url {
            Some(url) => Ok(Self::Http(HttpDocumentStore::new(
                url.clone(),
                tokens,
                config.request_timeout,
            )?)),
            None => Ok(Self::Memory(MemoryDocumentStore::new())),
        }
    }
}

impl DocumentStore for AnyStore {
    async fn add(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        match self {
            Self::Memory(store) => store.add(collection, fields).await,
            Self::Http(store) => store.add(collection, fields).await,
        }
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.update(collection, id, fields).await,
            Self::Http(store) => store.update(collection, id, fields).await,
        }
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.delete(collection, id).await,
            Self::Http(store) => store.delete(collection, id).await,
        }
    }

    fn watch(&self, collection: &str) -> SnapshotStream {
        match self {
            Self::Memory(store) => store.watch(collection),
            Self::Http(store) => store.watch(collection),
        }
    }
}
