//! Health check endpoint.

use axum::extract::State;
use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::state::AppState;

/// Sync status of the catalog views.
#[derive(Debug, Serialize)]
pub struct ViewsStatus {
    /// Back-office categories view.
    pub categories: bool,
    /// Back-office products view.
    pub products: bool,
    /// Cashier-screen catalog view.
    pub cashier: bool,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
    /// Whether each catalog view has applied a live snapshot.
    pub synced: ViewsStatus,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        synced: ViewsStatus {
            categories: state.catalog.categories.is_synced(),
            products: state.catalog.products.is_synced(),
            cashier: state.cashier.categories.is_synced() && state.cashier.products.is_synced(),
        },
    })
}

/// Returns the health check router.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
