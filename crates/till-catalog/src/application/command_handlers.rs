//! Command handlers for the catalog context.
//!
//! Handlers validate the command and write straight to the document store.
//! They never touch the views: the store's next snapshot carries the change
//! to every subscriber, this process included.

use till_core::document::DocumentStore;
use till_core::error::DomainError;
use tracing::info;

use crate::domain::category::{CATEGORIES_COLLECTION, category_body, normalize_name};
use crate::domain::commands::{
    AddCategory, AddProduct, DeleteCategory, DeleteProduct, UpdateCategory, UpdateProduct,
};
use crate::domain::product::PRODUCTS_COLLECTION;

/// Handles the `AddCategory` command and returns the new category's id.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a blank name, or the store's error
/// if the write fails.
pub async fn handle_add_category(
    command: &AddCategory,
    store: &dyn DocumentStore,
) -> Result<String, DomainError> {
    let name = normalize_name("category", &command.name)?;
    let id = store
        .add(CATEGORIES_COLLECTION, category_body(&name))
        .await?;
    info!(correlation_id = %command.correlation_id, category_id = %id, "category added");
    Ok(id)
}

/// Handles the `UpdateCategory` command.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a blank name,
/// `DomainError::DocumentNotFound` if the category does not exist, or the
/// store's error if the write fails.
pub async fn handle_update_category(
    command: &UpdateCategory,
    store: &dyn DocumentStore,
) -> Result<(), DomainError> {
    let name = normalize_name("category", &command.name)?;
    store
        .update(
            CATEGORIES_COLLECTION,
            &command.category_id,
            category_body(&name),
        )
        .await?;
    info!(
        correlation_id = %command.correlation_id,
        category_id = %command.category_id,
        "category updated"
    );
    Ok(())
}

/// Handles the `DeleteCategory` command. Deleting a missing category
/// succeeds.
///
/// # Errors
///
/// Returns the store's error if the write fails.
pub async fn handle_delete_category(
    command: &DeleteCategory,
    store: &dyn DocumentStore,
) -> Result<(), DomainError> {
    store
        .delete(CATEGORIES_COLLECTION, &command.category_id)
        .await?;
    info!(
        correlation_id = %command.correlation_id,
        category_id = %command.category_id,
        "category deleted"
    );
    Ok(())
}

/// Handles the `AddProduct` command and returns the new product's id.
///
/// # Errors
///
/// Returns `DomainError::Validation` for an invalid draft, or the store's
/// error if the write fails.
pub async fn handle_add_product(
    command: &AddProduct,
    store: &dyn DocumentStore,
) -> Result<String, DomainError> {
    let body = command.draft.to_body()?;
    let id = store.add(PRODUCTS_COLLECTION, body).await?;
    info!(correlation_id = %command.correlation_id, product_id = %id, "product added");
    Ok(id)
}

/// Handles the `UpdateProduct` command.
///
/// # Errors
///
/// Returns `DomainError::Validation` for an invalid draft,
/// `DomainError::DocumentNotFound` if the product does not exist, or the
/// store's error if the write fails.
pub async fn handle_update_product(
    command: &UpdateProduct,
    store: &dyn DocumentStore,
) -> Result<(), DomainError> {
    let body = command.draft.to_body()?;
    store
        .update(PRODUCTS_COLLECTION, &command.product_id, body)
        .await?;
    info!(
        correlation_id = %command.correlation_id,
        product_id = %command.product_id,
        "product updated"
    );
    Ok(())
}

/// Handles the `DeleteProduct` command. Deleting a missing product succeeds.
///
/// # Errors
///
/// Returns the store's error if the write fails.
pub async fn handle_delete_product(
    command: &DeleteProduct,
    store: &dyn DocumentStore,
) -> Result<(), DomainError> {
    store
        .delete(PRODUCTS_COLLECTION, &command.product_id)
        .await?;
    info!(
        correlation_id = %command.correlation_id,
        product_id = %command.product_id,
        "product deleted"
    );
    Ok(())
}
