//! Single-writer product list.
//!
//! The live list has exactly one writer, the feed subscription that owns
//! [`ProductListWriter`]. Views and commands only ever hold a
//! [`ProductListReader`]; commands never patch the list, they wait for the
//! store to echo their write back through the feed.

use std::sync::Arc;

use grocify_core::Product;
use tokio::sync::watch;

/// Create a connected writer/reader pair holding an empty list.
#[must_use]
pub fn product_list() -> (ProductListWriter, ProductListReader) {
    let (tx, rx) = watch::channel(Arc::from(Vec::new()));
    (ProductListWriter { tx }, ProductListReader { rx })
}

/// The only handle that can change the list. Not `Clone`.
#[derive(Debug)]
pub struct ProductListWriter {
    tx: watch::Sender<Arc<[Product]>>,
}

impl ProductListWriter {
    /// Replace the whole list.
    pub fn replace(&self, products: Vec<Product>) {
        self.tx.send_replace(products.into());
    }
}

/// Read access to the list. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ProductListReader {
    rx: watch::Receiver<Arc<[Product]>>,
}

impl ProductListReader {
    /// The latest list.
    #[must_use]
    pub fn current(&self) -> Arc<[Product]> {
        Arc::clone(&self.rx.borrow())
    }

    /// Wait for the next replacement.
    ///
    /// Returns `false` once the writer is gone and no further change can
    /// arrive.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// Wait until the list satisfies `predicate` and return it.
    ///
    /// Returns `None` if the writer goes away first.
    pub async fn wait_until<F>(&mut self, mut predicate: F) -> Option<Arc<[Product]>>
    where
        F: FnMut(&[Product]) -> bool,
    {
        self.rx
            .wait_for(|list| predicate(list))
            .await
            .ok()
            .map(|list| Arc::clone(&list))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use grocify_core::{Price, ProductId, ProductStatus};

    use super::*;

    fn product(id: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: id.to_uppercase(),
            description: None,
            price: Price::ZERO,
            category: "Misc".into(),
            status: ProductStatus::Active,
            created_at: 0,
        }
    }

    #[tokio::test]
    async fn test_replace_is_wholesale() {
        let (writer, mut reader) = product_list();
        assert!(reader.current().is_empty());

        writer.replace(vec![product("a"), product("b")]);
        assert!(reader.changed().await);
        assert_eq!(reader.current().len(), 2);

        writer.replace(vec![product("c")]);
        let list = reader.current();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id.as_str(), "c");
    }

    #[tokio::test]
    async fn test_readers_see_last_value_after_writer_drops() {
        let (writer, mut reader) = product_list();
        writer.replace(vec![product("a")]);
        drop(writer);

        assert_eq!(reader.current().len(), 1);
        assert!(reader.changed().await);
        assert!(!reader.changed().await);
    }

    #[tokio::test]
    async fn test_wait_until() {
        let (writer, mut reader) = product_list();
        let waiter = tokio::spawn(async move { reader.wait_until(|p| p.len() == 2).await });

        writer.replace(vec![product("a")]);
        writer.replace(vec![product("a"), product("b")]);

        let list = waiter.await.unwrap().unwrap();
        assert_eq!(list.len(), 2);
    }
}
