//! Products sold at the till.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use till_core::error::DomainError;

use super::category::normalize_name;

/// Collection holding product documents.
pub const PRODUCTS_COLLECTION: &str = "products";

/// A product as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Document identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Unit price.
    pub price: Decimal,
    /// Name of the category the product is listed under.
    pub category: String,
}

/// The editable fields of a product.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProductDraft {
    /// Display name.
    pub name: String,
    /// Unit price; accepts a JSON number or a numeric string.
    pub price: Decimal,
    /// Category name.
    pub category: String,
}

impl ProductDraft {
    /// Validates the draft and returns the document body to store.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the name or category is blank or
    /// the price is negative.
    pub fn to_body(&self) -> Result<Value, DomainError> {
        let name = normalize_name("product", &self.name)?;
        let category = normalize_name("category", &self.category)?;
        if self.price < Decimal::ZERO {
            return Err(DomainError::Validation(format!(
                "product price must not be negative, got {}",
                self.price
            )));
        }
        Ok(json!({
            "name": name,
            "price": self.price,
            "category": category,
        }))
    }
}
