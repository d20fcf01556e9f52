//! Realtime product feed.
//!
//! [`ProductFeed`] subscribes to the products collection and turns every
//! store snapshot into a complete, ordered `Vec<Product>`. Each delivery
//! replaces the previous one wholesale; nothing is merged.
//!
//! [`ProductFeed::subscribe_list`] wires a subscription to a
//! single-writer [`ProductList`](list) that views read from.

pub mod list;
pub mod mapping;
pub mod subscriber;

pub use list::{ProductListReader, ProductListWriter, product_list};
pub use mapping::{product_from_document, products_from_snapshot};
pub use subscriber::{FeedStatus, LiveProducts, ProductFeed, Subscription, SubscriptionError};
