//! Categories group products on the cashier screen.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use till_core::error::DomainError;

/// Collection holding category documents.
pub const CATEGORIES_COLLECTION: &str = "categories";

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Document identifier.
    pub id: String,
    /// Display name, also used by products to reference the category.
    pub name: String,
}

/// Trims `name` and rejects it if nothing is left.
///
/// # Errors
///
/// Returns `DomainError::Validation` for blank names.
pub fn normalize_name(kind: &str, name: &str) -> Result<String, DomainError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::Validation(format!("{kind} name must not be empty")));
    }
    Ok(trimmed.to_owned())
}

/// Document body for a category with the given (already normalized) name.
#[must_use]
pub fn category_body(name: &str) -> Value {
    json!({ "name": name })
}
