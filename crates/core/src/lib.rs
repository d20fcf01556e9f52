//! Grocify Core - Shared domain types.
//!
//! This crate provides the types shared by the Grocify dashboard components:
//! - `dashboard` - Realtime product sync, auth gating, and view controllers
//! - `integration-tests` - Fake backends and end-to-end tests
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no HTTP
//! clients, no logging. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for product IDs, prices, emails, statuses,
//!   and the product record with its create/update payloads

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
