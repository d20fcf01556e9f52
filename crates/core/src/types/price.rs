//! Non-negative product price using decimal arithmetic.
//!
//! Prices are stored in documents as JSON numbers, so serialization goes
//! through `f64` while arithmetic and comparison stay in [`Decimal`].

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use super::ValidationError;

/// A non-negative price in the store's single currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NegativePrice`] if `amount` is below zero.
    pub fn new(amount: Decimal) -> Result<Self, ValidationError> {
        if amount < Decimal::ZERO {
            return Err(ValidationError::NegativePrice);
        }
        Ok(Self(amount.normalize()))
    }

    /// Parse a price from form input such as `"3.50"`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPrice`] if the input is not a
    /// number, or [`ValidationError::NegativePrice`] if it is below zero.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        let amount = Decimal::from_str(trimmed)
            .map_err(|_| ValidationError::InvalidPrice(input.to_owned()))?;
        Self::new(amount)
    }

    /// Create a price from a JSON number.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPrice`] for NaN or infinite values,
    /// or [`ValidationError::NegativePrice`] if the value is below zero.
    pub fn from_f64(value: f64) -> Result<Self, ValidationError> {
        let amount = Decimal::try_from(value)
            .map_err(|_| ValidationError::InvalidPrice(value.to_string()))?;
        Self::new(amount)
    }

    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// The price as a JSON-friendly float.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or_default()
    }
}

impl TryFrom<f64> for Price {
    type Error = ValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::from_f64(value)
    }
}

impl From<Price> for f64 {
    fn from(price: Price) -> Self {
        price.to_f64()
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "$ {:.2}", self.0)
    }
}
