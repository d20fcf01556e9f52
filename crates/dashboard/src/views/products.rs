//! Products screen controller.
//!
//! Holds the live product list, the add/edit modal and the last command
//! error. Commands run against the store and never patch the list; the
//! feed delivers their effect.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use grocify_core::{Product, ProductForm, ProductId, ProductStatus};
use tracing::{info, warn};

use crate::auth::Authorized;
use crate::commands::ProductCommands;
use crate::error::DashboardError;
use crate::feed::{FeedStatus, LiveProducts, ProductFeed, ProductListReader};
use crate::store::DocumentStore;

use super::scope::ViewScope;

/// State of the add/edit modal.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Modal {
    #[default]
    Closed,
    /// Adding a new product; the form starts empty with status `active`.
    Adding(ProductForm),
    /// Editing an existing product; the form is prefilled from it.
    Editing { id: ProductId, form: ProductForm },
}

impl Modal {
    #[must_use]
    pub const fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }
}

#[derive(Debug, Default)]
struct UiState {
    modal: Modal,
    last_error: Option<String>,
}

/// Products screen. Cheap to clone; clones share state.
pub struct ProductsView<S> {
    inner: Arc<ProductsViewInner<S>>,
}

impl<S> Clone for ProductsView<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct ProductsViewInner<S> {
    commands: ProductCommands<S>,
    live: LiveProducts,
    scope: ViewScope,
    ui: Mutex<UiState>,
}

impl<S: DocumentStore + Clone> ProductsView<S> {
    /// Mount the view and subscribe to the products collection.
    #[must_use]
    pub fn mount(
        authorized: &Authorized,
        feed: &ProductFeed<S>,
        commands: ProductCommands<S>,
    ) -> Self {
        let live = feed.subscribe_list(authorized);
        info!(collection = feed.collection(), "Products view mounted");

        Self {
            inner: Arc::new(ProductsViewInner {
                commands,
                live,
                scope: ViewScope::new(),
                ui: Mutex::new(UiState::default()),
            }),
        }
    }

    /// The current product list, in store order.
    #[must_use]
    pub fn products(&self) -> Arc<[Product]> {
        self.inner.live.products.current()
    }

    /// A reader for waiting on list changes.
    #[must_use]
    pub fn products_reader(&self) -> ProductListReader {
        self.inner.live.products.clone()
    }

    #[must_use]
    pub fn feed_status(&self) -> FeedStatus {
        self.inner.live.status()
    }

    /// Whether the first snapshot is still pending.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.feed_status().is_loading()
    }

    #[must_use]
    pub fn modal(&self) -> Modal {
        self.ui().modal.clone()
    }

    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.ui().last_error.clone()
    }

    pub fn clear_error(&self) {
        self.ui().last_error = None;
    }

    pub fn open_add(&self) {
        self.ui().modal = Modal::Adding(ProductForm::default());
    }

    pub fn open_edit(&self, product: &Product) {
        self.ui().modal = Modal::Editing {
            id: product.id.clone(),
            form: ProductForm::from_product(product),
        };
    }

    pub fn close_modal(&self) {
        self.ui().modal = Modal::Closed;
    }

    /// Submit the modal form.
    ///
    /// Updates the product being edited, otherwise creates a new one. The
    /// modal closes on success and stays open on failure.
    ///
    /// # Errors
    ///
    /// Returns the command's error; it is also recorded as
    /// [`last_error`](Self::last_error) while the view is mounted.
    pub async fn save(&self, form: ProductForm) -> Result<(), DashboardError> {
        let editing = match self.modal() {
            Modal::Editing { id, .. } => Some(id),
            Modal::Adding(_) | Modal::Closed => None,
        };

        let result = match &editing {
            Some(id) => self.inner.commands.update_from_form(id, form).await,
            None => self.inner.commands.create_from_form(form).await.map(|_| ()),
        };
        self.settle(&result, |ui| ui.modal = Modal::Closed);
        result
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns the command's error; it is also recorded as
    /// [`last_error`](Self::last_error) while the view is mounted.
    pub async fn delete(&self, id: &ProductId) -> Result<(), DashboardError> {
        let result = self.inner.commands.delete(id).await;
        self.settle(&result, |_| {});
        result
    }

    /// Flip a product's status from the value currently shown.
    ///
    /// # Errors
    ///
    /// Returns the command's error; it is also recorded as
    /// [`last_error`](Self::last_error) while the view is mounted.
    pub async fn toggle_status(&self, product: &Product) -> Result<ProductStatus, DashboardError> {
        let result = self
            .inner
            .commands
            .toggle_status(&product.id, product.status)
            .await;
        self.settle(&result, |_| {});
        result
    }

    /// Tear the view down: stop the feed and discard results of commands
    /// still in flight. Safe to call more than once.
    pub fn unmount(&self) {
        if self.inner.scope.tear_down() {
            self.inner.live.subscription.unsubscribe();
            info!("Products view unmounted");
        }
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.inner.scope.is_active()
    }

    fn settle<T>(&self, result: &Result<T, DashboardError>, on_success: impl FnOnce(&mut UiState)) {
        self.inner.scope.apply(|| {
            let mut ui = self.ui();
            match result {
                Ok(_) => {
                    ui.last_error = None;
                    on_success(&mut ui);
                }
                Err(e) => {
                    warn!(error = %e, "Product command failed");
                    ui.last_error = Some(e.user_message());
                }
            }
        });
    }

    fn ui(&self) -> MutexGuard<'_, UiState> {
        self.inner.ui.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
