//! Analytics screen controller.

use std::sync::Arc;

use grocify_core::Product;
use tracing::info;

use crate::analytics::{ProductStats, aggregate};
use crate::auth::Authorized;
use crate::feed::{FeedStatus, LiveProducts, ProductFeed};
use crate::store::DocumentStore;

use super::scope::ViewScope;

/// Analytics screen: statistics recomputed from the live list.
#[derive(Debug)]
pub struct AnalyticsView {
    live: LiveProducts,
    scope: ViewScope,
}

impl AnalyticsView {
    /// Mount the view and subscribe to the products collection.
    #[must_use]
    pub fn mount<S: DocumentStore + Clone>(authorized: &Authorized, feed: &ProductFeed<S>) -> Self {
        let live = feed.subscribe_list(authorized);
        info!(collection = feed.collection(), "Analytics view mounted");
        Self {
            live,
            scope: ViewScope::new(),
        }
    }

    #[must_use]
    pub fn products(&self) -> Arc<[Product]> {
        self.live.products.current()
    }

    /// Statistics for the current list.
    #[must_use]
    pub fn stats(&self) -> ProductStats {
        aggregate(&self.live.products.current())
    }

    #[must_use]
    pub fn feed_status(&self) -> FeedStatus {
        self.live.status()
    }

    /// Wait for the next list change and return fresh statistics.
    ///
    /// Returns `None` once the feed has ended.
    pub async fn next_stats(&mut self) -> Option<ProductStats> {
        if self.live.products.changed().await {
            Some(self.stats())
        } else {
            None
        }
    }

    /// Stop the feed. Safe to call more than once.
    pub fn unmount(&self) {
        if self.scope.tear_down() {
            self.live.subscription.unsubscribe();
            info!("Analytics view unmounted");
        }
    }
}

impl Drop for AnalyticsView {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use grocify_core::Fields;
    use serde_json::json;

    use super::*;
    use crate::store::MemoryDocumentStore;

    fn fields(category: &str, status: &str) -> Fields {
        serde_json::from_value(json!({
            "name": "x",
            "price": 1,
            "category": category,
            "status": status,
            "createdAt": 1
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_stats_follow_the_feed() {
        let store = MemoryDocumentStore::new();
        store.put("products", "a", fields("Dairy", "active"));
        let feed = ProductFeed::new(store.clone(), "products");
        let mut view = AnalyticsView::mount(&Authorized::issue(), &feed);

        let stats = view.next_stats().await.unwrap();
        assert_eq!(stats.total, 1);

        store.put("products", "b", fields("Bakery", "inactive"));
        let stats = view.next_stats().await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.by_status.inactive, 1);
        assert_eq!(stats.category("Bakery"), Some(1));
        assert!(matches!(view.feed_status(), FeedStatus::Live));
    }

    #[tokio::test]
    async fn test_unmount_ends_updates() {
        let store = MemoryDocumentStore::new();
        let feed = ProductFeed::new(store.clone(), "products");
        let mut view = AnalyticsView::mount(&Authorized::issue(), &feed);
        view.next_stats().await.unwrap();

        view.unmount();
        assert!(view.next_stats().await.is_none());
        assert_eq!(view.stats().total, 0);
    }
}
