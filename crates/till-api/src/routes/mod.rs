//! Route modules organized by bounded context.

pub mod cashier;
pub mod categories;
pub mod health;
pub mod products;
pub mod sales;

use axum::Router;
use serde::Serialize;

use crate::state::AppState;

/// Response body for list endpoints backed by a live view.
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    /// The view's current items.
    pub items: Vec<T>,
    /// `false` while the view still shows cached data only.
    pub synced: bool,
}

/// Response body returned after a document is created.
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    /// Identifier assigned by the store.
    pub id: String,
}

/// Builds the full application router, without state or layers.
pub fn app_router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/api/v1/categories", categories::router())
        .nest("/api/v1/products", products::router())
        .nest("/api/v1/cashier", cashier::router())
        .nest("/api/v1/sales", sales::router())
}
