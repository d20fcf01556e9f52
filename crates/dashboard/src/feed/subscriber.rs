//! Product collection subscriber.
//!
//! A subscription runs as one background task that pulls snapshots from
//! the store, maps them to products and hands each full list to the
//! `on_update` callback. The first feed error is handed to `on_error` and
//! ends the subscription; the last delivered list is left as it was.
//!
//! # Cancellation
//!
//! [`Subscription::unsubscribe`] (also run on drop) sets a cancelled flag
//! that is checked immediately before every callback, then aborts the
//! task at its next await point. A callback that already passed the check
//! when `unsubscribe` runs on another thread still completes.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::StreamExt;
use grocify_core::Product;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::auth::Authorized;
use crate::store::{DocumentStore, StoreError};

use super::list::{ProductListReader, product_list};
use super::mapping::products_from_snapshot;

/// Errors delivered to a subscription's error callback.
#[derive(Debug, Error)]
pub enum SubscriptionError {
    /// The store reported an error on the feed.
    #[error("product feed failed: {0}")]
    Feed(#[from] StoreError),

    /// The store ended the feed.
    #[error("product feed closed by the store")]
    Closed,
}

/// Subscribes to one collection of a [`DocumentStore`].
#[derive(Clone)]
pub struct ProductFeed<S> {
    store: S,
    collection: Arc<str>,
}

impl<S: DocumentStore + Clone> ProductFeed<S> {
    #[must_use]
    pub fn new(store: S, collection: impl Into<Arc<str>>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Start delivering the products collection.
    ///
    /// Requires the [`Authorized`] capability from a successful session
    /// check. `on_update` receives the complete list in store order on
    /// every change, starting with the current contents. `on_error` is
    /// called at most once, after which nothing more is delivered.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn subscribe<U, E>(
        &self,
        _authorized: &Authorized,
        mut on_update: U,
        on_error: E,
    ) -> Subscription
    where
        U: FnMut(Vec<Product>) + Send + 'static,
        E: FnOnce(SubscriptionError) + Send + 'static,
    {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let mut feed = self.store.watch(&self.collection);
        let collection = Arc::clone(&self.collection);

        let task = tokio::spawn(async move {
            let mut last_sequence = 0;

            while let Some(item) = feed.next().await {
                if flag.load(Ordering::Acquire) {
                    return;
                }
                match item {
                    Ok(snapshot) => {
                        if snapshot.sequence < last_sequence {
                            debug!(
                                collection = %collection,
                                sequence = snapshot.sequence,
                                last_sequence,
                                "Skipping stale snapshot"
                            );
                            continue;
                        }
                        last_sequence = snapshot.sequence;

                        let products = products_from_snapshot(&snapshot);
                        if flag.load(Ordering::Acquire) {
                            return;
                        }
                        debug!(
                            collection = %collection,
                            sequence = snapshot.sequence,
                            count = products.len(),
                            "Delivering products"
                        );
                        on_update(products);
                    }
                    Err(e) => {
                        if flag.load(Ordering::Acquire) {
                            return;
                        }
                        warn!(collection = %collection, error = %e, "Product feed failed");
                        on_error(SubscriptionError::Feed(e));
                        return;
                    }
                }
            }

            if !flag.load(Ordering::Acquire) {
                warn!(collection = %collection, "Product feed closed");
                on_error(SubscriptionError::Closed);
            }
        });

        info!(collection = %self.collection, "Subscribed to products");
        Subscription { cancelled, task }
    }

    /// Subscribe and keep the results in a single-writer product list.
    ///
    /// The subscription owns the list's only writer; the returned
    /// [`LiveProducts`] exposes readers and the feed status.
    #[must_use]
    pub fn subscribe_list(&self, authorized: &Authorized) -> LiveProducts {
        let (writer, products) = product_list();
        let (status_tx, status) = watch::channel(FeedStatus::Connecting);
        let status_tx = Arc::new(status_tx);
        let on_live = Arc::clone(&status_tx);

        let subscription = self.subscribe(
            authorized,
            move |list| {
                writer.replace(list);
                on_live.send_replace(FeedStatus::Live);
            },
            move |error| {
                status_tx.send_replace(FeedStatus::Failed(Arc::new(error)));
            },
        );

        LiveProducts {
            subscription,
            products,
            status,
        }
    }
}

/// State of a list-backed subscription.
#[derive(Debug, Clone)]
pub enum FeedStatus {
    /// Waiting for the first snapshot.
    Connecting,
    /// At least one snapshot has been applied.
    Live,
    /// The feed failed; the list keeps its last contents.
    Failed(Arc<SubscriptionError>),
}

impl FeedStatus {
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Connecting)
    }

    #[must_use]
    pub fn error(&self) -> Option<&SubscriptionError> {
        match self {
            Self::Failed(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

/// A running list-backed subscription.
#[derive(Debug)]
pub struct LiveProducts {
    pub subscription: Subscription,
    pub products: ProductListReader,
    pub status: watch::Receiver<FeedStatus>,
}

impl LiveProducts {
    #[must_use]
    pub fn status(&self) -> FeedStatus {
        self.status.borrow().clone()
    }
}

/// Handle to a running subscription. Unsubscribes on drop.
#[derive(Debug)]
pub struct Subscription {
    cancelled: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl Subscription {
    /// Stop delivery. Safe to call more than once.
    pub fn unsubscribe(&self) {
        if !self.cancelled.swap(true, Ordering::AcqRel) {
            self.task.abort();
            debug!("Unsubscribed from products");
        }
    }

    /// Whether callbacks may still be invoked.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.cancelled.load(Ordering::Acquire) && !self.task.is_finished()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
