//! Product record and its create/update payloads.
//!
//! Products live as documents in a remote collection. The document body is
//! a flat JSON object (see [`field_names`]); the store assigns the ID.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::{Price, ProductId, ProductStatus, ValidationError};

/// Field set of a stored document, without its ID.
pub type Fields = serde_json::Map<String, Value>;

/// Document field names as stored in the products collection.
pub mod field_names {
    pub const NAME: &str = "name";
    pub const DESCRIPTION: &str = "description";
    pub const PRICE: &str = "price";
    pub const CATEGORY: &str = "category";
    pub const STATUS: &str = "status";
    /// Creation time in milliseconds since the Unix epoch.
    pub const CREATED_AT: &str = "createdAt";
}

/// A product as mirrored from the remote collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Store-assigned identifier; never changes.
    pub id: ProductId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: Price,
    pub category: String,
    pub status: ProductStatus,
    /// Milliseconds since the Unix epoch, set once at creation.
    pub created_at: i64,
}

/// Validated fields for a new product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    name: String,
    description: Option<String>,
    price: Price,
    category: String,
    status: ProductStatus,
}

impl ProductDraft {
    /// Create a draft from already-typed values.
    ///
    /// # Errors
    ///
    /// Returns an error if the name or category is blank.
    pub fn new(
        name: impl Into<String>,
        price: Price,
        category: impl Into<String>,
        status: ProductStatus,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            name: required_name(name.into())?,
            description: None,
            price,
            category: required_category(category.into())?,
            status,
        })
    }

    /// Attach a description. Blank descriptions are dropped.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = non_blank(description.into());
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn price(&self) -> Price {
        self.price
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub const fn status(&self) -> ProductStatus {
        self.status
    }

    /// Build the document body, stamping the creation time.
    #[must_use]
    pub fn into_fields(self, created_at: i64) -> Fields {
        let mut fields = Fields::new();
        fields.insert(field_names::NAME.into(), json!(self.name));
        if let Some(description) = self.description {
            fields.insert(field_names::DESCRIPTION.into(), json!(description));
        }
        fields.insert(field_names::PRICE.into(), json!(self.price.to_f64()));
        fields.insert(field_names::CATEGORY.into(), json!(self.category));
        fields.insert(field_names::STATUS.into(), json!(self.status.as_str()));
        fields.insert(field_names::CREATED_AT.into(), json!(created_at));
        fields
    }
}

/// A partial update. `None` fields are left untouched.
///
/// The ID and creation time are not part of a patch and cannot change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub category: Option<String>,
    pub status: Option<ProductStatus>,
}

impl ProductPatch {
    /// A patch that only changes the status.
    #[must_use]
    pub fn status(status: ProductStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.category.is_none()
            && self.status.is_none()
    }

    /// Check the patch before it is submitted.
    ///
    /// # Errors
    ///
    /// Returns an error if the patch is empty, or sets a blank name or
    /// category.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::EmptyPatch);
        }
        if self.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(ValidationError::EmptyName);
        }
        if self
            .category
            .as_deref()
            .is_some_and(|c| c.trim().is_empty())
        {
            return Err(ValidationError::MissingCategory);
        }
        Ok(())
    }

    /// Build the partial document body.
    #[must_use]
    pub fn into_fields(self) -> Fields {
        let mut fields = Fields::new();
        if let Some(name) = self.name {
            fields.insert(field_names::NAME.into(), json!(name.trim()));
        }
        if let Some(description) = self.description {
            fields.insert(field_names::DESCRIPTION.into(), json!(description));
        }
        if let Some(price) = self.price {
            fields.insert(field_names::PRICE.into(), json!(price.to_f64()));
        }
        if let Some(category) = self.category {
            fields.insert(field_names::CATEGORY.into(), json!(category.trim()));
        }
        if let Some(status) = self.status {
            fields.insert(field_names::STATUS.into(), json!(status.as_str()));
        }
        fields
    }
}

/// Raw product form input, as typed into the add/edit modal.
///
/// Every field is a string; conversion into a [`ProductDraft`] or
/// [`ProductPatch`] performs the validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductForm {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: String,
    pub category: String,
    pub status: String,
}

impl Default for ProductForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            price: String::new(),
            category: String::new(),
            status: ProductStatus::Active.as_str().to_owned(),
        }
    }
}

impl ProductForm {
    /// Prefill the form for editing an existing product.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone().unwrap_or_default(),
            price: product.price.amount().to_string(),
            category: product.category.clone(),
            status: product.status.as_str().to_owned(),
        }
    }

    /// Validate the form as a new product.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn into_draft(self) -> Result<ProductDraft, ValidationError> {
        let price = Price::parse(&self.price)?;
        let status = self.status.trim().parse::<ProductStatus>()?;
        Ok(ProductDraft::new(self.name, price, self.category, status)?
            .with_description(self.description))
    }

    /// Validate the form as a full replacement of an existing product.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn into_patch(self) -> Result<ProductPatch, ValidationError> {
        let draft = self.into_draft()?;
        Ok(ProductPatch {
            name: Some(draft.name),
            description: Some(draft.description.unwrap_or_default()),
            price: Some(draft.price),
            category: Some(draft.category),
            status: Some(draft.status),
        })
    }
}

fn required_name(name: String) -> Result<String, ValidationError> {
    non_blank(name).ok_or(ValidationError::EmptyName)
}

fn required_category(category: String) -> Result<String, ValidationError> {
    non_blank(category).ok_or(ValidationError::MissingCategory)
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == value.len() {
        Some(value)
    } else {
        Some(trimmed.to_owned())
    }
}
