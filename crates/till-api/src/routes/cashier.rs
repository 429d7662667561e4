//! Route for the cashier screen.

use axum::extract::State;
use axum::{Json, Router, routing::get};
use serde::Serialize;

use till_catalog::application::query_handlers::{MenuSection, cashier_menu};
use till_catalog::domain::category::Category;

use crate::state::AppState;

/// Response body for GET /.
#[derive(Debug, Serialize)]
pub struct CashierResponse {
    /// All categories ordered by name.
    pub categories: Vec<Category>,
    /// Products grouped under their categories.
    pub menu: Vec<MenuSection>,
    /// `false` while either list still comes from the local cache only.
    pub synced: bool,
}

/// GET /
async fn cashier(State(state): State<AppState>) -> Json<CashierResponse> {
    let categories = state.cashier.categories.items();
    let products = state.cashier.products.items();
    let menu = cashier_menu(&categories, &products);

    Json(CashierResponse {
        categories,
        menu,
        synced: state.cashier.categories.is_synced() && state.cashier.products.is_synced(),
    })
}

/// Returns the router for the cashier screen.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(cashier))
}
