//! Product commands: create, update, delete and toggle status.
//!
//! Commands validate their input, then write to the store and return. They
//! never touch the local product list: the realtime feed delivers the
//! result, so the list always reflects the store and has a single writer.
//!
//! Commands are independent. Two updates racing on the same product are
//! resolved by the store (last write wins per field).

use std::sync::Arc;

use grocify_core::{ProductDraft, ProductForm, ProductId, ProductPatch, ProductStatus};
use tracing::{info, instrument};

use crate::error::DashboardError;
use crate::store::DocumentStore;

/// Writes to the products collection.
#[derive(Clone)]
pub struct ProductCommands<S> {
    store: S,
    collection: Arc<str>,
}

impl<S: DocumentStore> ProductCommands<S> {
    #[must_use]
    pub fn new(store: S, collection: impl Into<Arc<str>>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    /// Validate a submitted form and create the product.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Validation`] without contacting the store
    /// if the form is invalid, or [`DashboardError::Remote`] if the write
    /// fails.
    pub async fn create_from_form(&self, form: ProductForm) -> Result<ProductId, DashboardError> {
        let draft = form.into_draft()?;
        self.create(draft).await
    }

    /// Create a product, stamping the creation time.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Remote`] if the write fails.
    #[instrument(skip(self, draft), fields(collection = %self.collection, name = %draft.name()))]
    pub async fn create(&self, draft: ProductDraft) -> Result<ProductId, DashboardError> {
        let created_at = chrono::Utc::now().timestamp_millis();
        let id = self
            .store
            .add(&self.collection, draft.into_fields(created_at))
            .await?;
        info!(id = %id, "Product created");
        Ok(ProductId::new(id))
    }

    /// Validate a submitted form as a full edit of `id`.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Validation`] if the form is invalid,
    /// [`DashboardError::NotFound`] if the product is gone, or
    /// [`DashboardError::Remote`] if the write fails.
    pub async fn update_from_form(
        &self,
        id: &ProductId,
        form: ProductForm,
    ) -> Result<(), DashboardError> {
        let patch = form.into_patch()?;
        self.update(id, patch).await
    }

    /// Apply a partial update. The ID and creation time never change.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Validation`] for an empty or invalid
    /// patch, [`DashboardError::NotFound`] if the product is gone, or
    /// [`DashboardError::Remote`] if the write fails.
    #[instrument(skip(self, patch), fields(collection = %self.collection))]
    pub async fn update(&self, id: &ProductId, patch: ProductPatch) -> Result<(), DashboardError> {
        patch.validate()?;
        self.store
            .update(&self.collection, id.as_str(), patch.into_fields())
            .await?;
        info!("Product updated");
        Ok(())
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::NotFound`] if the store reports the
    /// product missing, or [`DashboardError::Remote`] if the delete fails.
    #[instrument(skip(self), fields(collection = %self.collection))]
    pub async fn delete(&self, id: &ProductId) -> Result<(), DashboardError> {
        self.store.delete(&self.collection, id.as_str()).await?;
        info!("Product deleted");
        Ok(())
    }

    /// Flip a product's status, based on the status the caller last saw.
    ///
    /// Returns the status that was written. Only the status field is sent.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::NotFound`] if the product is gone, or
    /// [`DashboardError::Remote`] if the write fails.
    pub async fn toggle_status(
        &self,
        id: &ProductId,
        current: ProductStatus,
    ) -> Result<ProductStatus, DashboardError> {
        let next = current.toggled();
        self.update(id, ProductPatch::status(next)).await?;
        Ok(next)
    }
}
