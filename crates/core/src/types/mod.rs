//! Core types for Grocify.
//!
//! This module provides type-safe wrappers for the product catalog domain.

pub mod email;
pub mod id;
pub mod price;
pub mod product;
pub mod status;
pub mod validation;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::Price;
pub use product::{Fields, Product, ProductDraft, ProductForm, ProductPatch, field_names};
pub use status::ProductStatus;
pub use validation::ValidationError;
