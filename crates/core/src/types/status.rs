//! Product availability status.
//!
//! The stored representation is lowercase (`"active"` / `"inactive"`).
//! Capitalized forms such as `"Active"` are display labels only and are
//! never written to the store.

use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Two-valued product availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    /// Listed and available.
    #[default]
    Active,
    /// Hidden from the catalog.
    Inactive,
}

impl ProductStatus {
    /// The stored value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    /// Human-readable label for tables and charts.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
        }
    }

    /// The opposite status.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Active => Self::Inactive,
            Self::Inactive => Self::Active,
        }
    }

    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }

    /// Read a status value as found in a stored document.
    ///
    /// Anything other than exactly `"active"` reads as [`Self::Inactive`],
    /// including legacy values such as `"Active"` or `"disabled"`.
    #[must_use]
    pub fn from_stored(value: &str) -> Self {
        if value == Self::Active.as_str() {
            Self::Active
        } else {
            Self::Inactive
        }
    }

    /// Whether `value` is exactly one of the stored enum values.
    #[must_use]
    pub fn is_canonical(value: &str) -> bool {
        value == Self::Active.as_str() || value == Self::Inactive.as_str()
    }
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProductStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => Err(ValidationError::InvalidStatus(s.to_owned())),
        }
    }
}
