//! Navigation middleware.
//!
//! - [`RouteGuard`] - runs the auth gate before protected routes

pub mod auth;

pub use auth::{Navigation, RouteGuard};
