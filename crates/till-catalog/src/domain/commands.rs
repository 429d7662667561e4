//! Commands for the catalog context.

use uuid::Uuid;

use super::product::ProductDraft;

/// Command to add a category.
#[derive(Debug, Clone)]
pub struct AddCategory {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Category name.
    pub name: String,
}

/// Command to rename a category.
#[derive(Debug, Clone)]
pub struct UpdateCategory {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The category document identifier.
    pub category_id: String,
    /// New category name.
    pub name: String,
}

/// Command to delete a category.
#[derive(Debug, Clone)]
pub struct DeleteCategory {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The category document identifier.
    pub category_id: String,
}

/// Command to add a product.
#[derive(Debug, Clone)]
pub struct AddProduct {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Product fields.
    pub draft: ProductDraft,
}

/// Command to replace the editable fields of a product.
#[derive(Debug, Clone)]
pub struct UpdateProduct {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The product document identifier.
    pub product_id: String,
    /// New product fields.
    pub draft: ProductDraft,
}

/// Command to delete a product.
#[derive(Debug, Clone)]
pub struct DeleteProduct {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The product document identifier.
    pub product_id: String,
}
