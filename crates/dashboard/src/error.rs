//! Unified error handling for the dashboard.

use grocify_core::{ProductId, ValidationError};
use thiserror::Error;

use crate::auth::AuthError;
use crate::config::ConfigError;
use crate::feed::SubscriptionError;
use crate::storage::StorageError;
use crate::store::StoreError;

/// Dashboard-level error type.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Login, logout or session check failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Input was rejected before reaching the store.
    #[error("Invalid product: {0}")]
    Validation(#[from] ValidationError),

    /// The product no longer exists in the store.
    #[error("Product not found: {0}")]
    NotFound(ProductId),

    /// The document store failed or rejected the request.
    #[error("Store error: {0}")]
    Remote(StoreError),

    /// The realtime feed failed.
    #[error("Subscription error: {0}")]
    Subscription(#[from] SubscriptionError),

    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Durable token storage could not be opened.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<StoreError> for DashboardError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(ProductId::new(id)),
            other => Self::Remote(other),
        }
    }
}

impl DashboardError {
    /// Message suitable for showing in a view.
    ///
    /// Remote failures are logged here with full detail; the message
    /// itself stays generic.
    #[must_use]
    pub fn user_message(&self) -> String {
        if matches!(self, Self::Remote(_) | Self::Subscription(_)) {
            tracing::error!(error = %self, "Dashboard operation failed");
        }

        match self {
            Self::Validation(e) => e.to_string(),
            Self::NotFound(_) => "This product no longer exists.".to_string(),
            Self::Remote(_) => "Couldn't save changes. Try again.".to_string(),
            Self::Subscription(_) => "Live updates stopped. Reload to reconnect.".to_string(),
            Self::Auth(_) => "Your session has ended. Please log in again.".to_string(),
            Self::Config(_) | Self::Storage(_) => "Dashboard is misconfigured.".to_string(),
        }
    }
}
