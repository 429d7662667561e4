//! Cached live views over the catalog collections.
//!
//! The back office reads from `CatalogViews` (name-ordered, capped at
//! [`CATALOG_PAGE_LIMIT`]); the cashier screen reads from `CashierView`,
//! which follows the same collections without a cap and keeps its own cache
//! entries so the two screens never overwrite each other's offline copy.

use std::sync::Arc;

use till_core::cache::LocalCache;
use till_core::document::{Direction, DocumentStore, Query};
use till_core::error::DomainError;
use till_core::mirror::CollectionMirror;

use crate::domain::category::{CATEGORIES_COLLECTION, Category};
use crate::domain::product::{PRODUCTS_COLLECTION, Product};

/// Maximum number of documents the back-office views follow.
pub const CATALOG_PAGE_LIMIT: usize = 100;

/// Cache key of the back-office category list.
pub const CATEGORIES_CACHE_KEY: &str = "categories";
/// Cache key of the back-office product list.
pub const PRODUCTS_CACHE_KEY: &str = "products";
/// Cache key of the cashier category list.
pub const CASHIER_CATEGORIES_CACHE_KEY: &str = "cashier_categories";
/// Cache key of the cashier product list.
pub const CASHIER_PRODUCTS_CACHE_KEY: &str = "cashier_products";

fn by_name(collection: &str) -> Query {
    Query::collection(collection).order_by("name", Direction::Ascending)
}

/// Back-office views of categories and products.
#[derive(Debug)]
pub struct CatalogViews {
    /// Categories ordered by name.
    pub categories: CollectionMirror<Category>,
    /// Products ordered by name.
    pub products: CollectionMirror<Product>,
}

impl CatalogViews {
    /// Creates both views, seeded from `cache`.
    #[must_use]
    pub fn new(cache: &Arc<dyn LocalCache>) -> Self {
        Self {
            categories: CollectionMirror::new(
                by_name(CATEGORIES_COLLECTION).limit(CATALOG_PAGE_LIMIT),
                CATEGORIES_CACHE_KEY,
                Arc::clone(cache),
            ),
            products: CollectionMirror::new(
                by_name(PRODUCTS_COLLECTION).limit(CATALOG_PAGE_LIMIT),
                PRODUCTS_CACHE_KEY,
                Arc::clone(cache),
            ),
        }
    }

    /// Starts following the store.
    pub fn start(&self, store: &Arc<dyn DocumentStore>) {
        self.categories.start(Arc::clone(store));
        self.products.start(Arc::clone(store));
    }

    /// Stops following the store.
    pub fn stop(&self) {
        self.categories.stop();
        self.products.stop();
    }

    /// Re-reads both collections once.
    ///
    /// # Errors
    ///
    /// Returns the first store error encountered.
    pub async fn refresh(&self, store: &dyn DocumentStore) -> Result<(), DomainError> {
        self.categories.refresh(store).await?;
        self.products.refresh(store).await
    }
}

/// Cashier-screen view of the full catalog.
#[derive(Debug)]
pub struct CashierView {
    /// All categories ordered by name.
    pub categories: CollectionMirror<Category>,
    /// All products ordered by name.
    pub products: CollectionMirror<Product>,
}

impl CashierView {
    /// Creates the view, seeded from `cache`.
    #[must_use]
    pub fn new(cache: &Arc<dyn LocalCache>) -> Self {
        Self {
            categories: CollectionMirror::new(
                by_name(CATEGORIES_COLLECTION),
                CASHIER_CATEGORIES_CACHE_KEY,
                Arc::clone(cache),
            ),
            products: CollectionMirror::new(
                by_name(PRODUCTS_COLLECTION),
                CASHIER_PRODUCTS_CACHE_KEY,
                Arc::clone(cache),
            ),
        }
    }

    /// Starts following the store.
    pub fn start(&self, store: &Arc<dyn DocumentStore>) {
        self.categories.start(Arc::clone(store));
        self.products.start(Arc::clone(store));
    }

    /// Stops following the store.
    pub fn stop(&self) {
        self.categories.stop();
        self.products.stop();
    }

    /// Re-reads both collections once.
    ///
    /// # Errors
    ///
    /// Returns the first store error encountered.
    pub async fn refresh(&self, store: &dyn DocumentStore) -> Result<(), DomainError> {
        self.categories.refresh(store).await?;
        self.products.refresh(store).await
    }
}
