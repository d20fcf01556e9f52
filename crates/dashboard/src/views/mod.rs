//! View controllers for the dashboard screens.
//!
//! Each controller owns the state of one screen and talks to the services
//! in [`AppState`](crate::state::AppState). Protected views can only be
//! mounted with an [`Authorized`](crate::auth::Authorized) capability.

pub mod analytics;
pub mod login;
pub mod products;
pub mod scope;

pub use analytics::AnalyticsView;
pub use login::{LOGIN_FAILED_MESSAGE, LoginOutcome, LoginView, NETWORK_ERROR_MESSAGE};
pub use products::{Modal, ProductsView};
pub use scope::ViewScope;
