//! Validation errors for product payloads.

use thiserror::Error;

/// Errors raised when product fields are malformed.
///
/// Validation happens before a command is submitted, so a payload that
/// fails here never reaches the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The product name is empty or whitespace.
    #[error("product name is required")]
    EmptyName,

    /// The category is empty or whitespace.
    #[error("product category is required")]
    MissingCategory,

    /// The price is not a number.
    #[error("price must be a number (got {0:?})")]
    InvalidPrice(String),

    /// The price is below zero.
    #[error("price cannot be negative")]
    NegativePrice,

    /// The status is not one of the stored enum values.
    #[error("status must be \"active\" or \"inactive\" (got {0:?})")]
    InvalidStatus(String),

    /// An update carried no fields.
    #[error("update must change at least one field")]
    EmptyPatch,
}
