//! Grocify dashboard library.
//!
//! Client-side data layer of the Grocify admin dashboard: it gates the
//! dashboard behind a session check, mirrors the remote products
//! collection in real time, and issues product commands.
//!
//! # Layout
//!
//! - [`auth`] - token store, auth backend client, auth gate
//! - [`store`] - realtime document store backends
//! - [`feed`] - products subscription and the single-writer list
//! - [`commands`] - create/update/delete/toggle
//! - [`analytics`] - aggregate statistics
//! - [`views`] - login, products and analytics screen controllers
//! - [`middleware`] / [`routes`] - route protection and navigation
//! - [`state`] - session state and the application state container

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod analytics;
pub mod auth;
pub mod commands;
pub mod config;
pub mod error;
pub mod feed;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod storage;
pub mod store;
pub mod telemetry;
pub mod views;

#[cfg(test)]
mod test_support;

pub use error::DashboardError;
pub use grocify_core::{Product, ProductForm, ProductId, ProductStatus};
