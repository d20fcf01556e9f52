//! Mount/teardown tracking for a view.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

/// Tracks whether a view is still mounted.
///
/// Command futures may outlive the view that started them. Their results
/// are applied through [`ViewScope::apply`], which drops them once the
/// view is torn down.
#[derive(Debug, Clone, Default)]
pub struct ViewScope {
    torn_down: Arc<AtomicBool>,
}

impl ViewScope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.torn_down.load(Ordering::Acquire)
    }

    /// Mark the view torn down. Returns `true` the first time only.
    pub fn tear_down(&self) -> bool {
        !self.torn_down.swap(true, Ordering::AcqRel)
    }

    /// Run `f` if the view is still mounted. Returns whether it ran.
    pub fn apply<F: FnOnce()>(&self, f: F) -> bool {
        if self.is_active() {
            f();
            true
        } else {
            debug!("View torn down, discarding result");
            false
        }
    }
}
