//! Routes for products.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use tracing::{info, instrument};
use uuid::Uuid;

use till_catalog::application::command_handlers;
use till_catalog::domain::commands;
use till_catalog::domain::product::{Product, ProductDraft};

use super::{CreatedResponse, ListResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// GET /
async fn list_products(State(state): State<AppState>) -> Json<ListResponse<Product>> {
    Json(ListResponse {
        items: state.catalog.products.items(),
        synced: state.catalog.products.is_synced(),
    })
}

/// POST /
#[instrument(skip(state, draft))]
async fn add_product(
    State(state): State<AppState>,
    Json(draft): Json<ProductDraft>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let command = commands::AddProduct {
        correlation_id: Uuid::new_v4(),
        draft,
    };

    info!(correlation_id = %command.correlation_id, "handling add_product command");

    let id = command_handlers::handle_add_product(&command, &*state.document_store).await?;

    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// PUT /{id}
#[instrument(skip(state, draft))]
async fn update_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    Json(draft): Json<ProductDraft>,
) -> Result<StatusCode, ApiError> {
    let command = commands::UpdateProduct {
        correlation_id: Uuid::new_v4(),
        product_id,
        draft,
    };

    info!(correlation_id = %command.correlation_id, "handling update_product command");

    command_handlers::handle_update_product(&command, &*state.document_store).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /{id}
#[instrument(skip(state))]
async fn delete_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let command = commands::DeleteProduct {
        correlation_id: Uuid::new_v4(),
        product_id,
    };

    info!(correlation_id = %command.correlation_id, "handling delete_product command");

    command_handlers::handle_delete_product(&command, &*state.document_store).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Returns the router for products.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(add_product))
        .route("/{id}", put(update_product).delete(delete_product))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use serde_json::json;
    use till_core::document::{DocumentStore, Query};
    use till_store::memory_document_store::InMemoryDocumentStore;
    use till_test_support::FailingDocumentStore;

    use super::*;
    use crate::routes::test_helpers::{send, state_with};

    #[tokio::test]
    async fn test_list_products_reports_unsynced_view_before_first_snapshot() {
        let app = router().with_state(state_with(Arc::new(InMemoryDocumentStore::new())));

        let (status, json) = send(app, "GET", "/", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["synced"], false);
        assert_eq!(json["items"], json!([]));
    }

    #[tokio::test]
    async fn test_add_product_accepts_string_price_and_shows_up_after_refresh() {
        // Arrange
        let store = Arc::new(InMemoryDocumentStore::new());
        let state = state_with(store.clone());
        let body = json!({ "name": "Tea", "price": "2.50", "category": "Drinks" });

        // Act
        let (status, json) = send(router().with_state(state.clone()), "POST", "/", Some(&body)).await;
        state.catalog.refresh(&*store).await.unwrap();
        let (_, listed) = send(router().with_state(state), "GET", "/", None).await;

        // Assert
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(listed["items"][0]["id"], json["id"]);
        assert_eq!(listed["items"][0]["name"], "Tea");
        assert_eq!(listed["items"][0]["price"], "2.50");
    }

    #[tokio::test]
    async fn test_add_product_returns_400_for_negative_price() {
        let app = router().with_state(state_with(Arc::new(InMemoryDocumentStore::new())));
        let body = json!({ "name": "Tea", "price": -1, "category": "Drinks" });

        let (status, json) = send(app, "POST", "/", Some(&body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_update_product_replaces_fields() {
        // Arrange
        let store = Arc::new(InMemoryDocumentStore::new());
        store.insert(
            "products",
            "p1",
            json!({ "name": "Tea", "price": "2.50", "category": "Drinks" }),
        );
        let app = router().with_state(state_with(store.clone()));
        let body = json!({ "name": "Green Tea", "price": 3, "category": "Drinks" });

        // Act
        let (status, _) = send(app, "PUT", "/p1", Some(&body)).await;

        // Assert
        assert_eq!(status, StatusCode::NO_CONTENT);
        let docs = store.query(&Query::collection("products")).await.unwrap();
        assert_eq!(docs[0].data["name"], "Green Tea");
    }

    #[tokio::test]
    async fn test_update_missing_product_returns_404() {
        let app = router().with_state(state_with(Arc::new(InMemoryDocumentStore::new())));
        let body = json!({ "name": "Tea", "price": 1, "category": "Drinks" });

        let (status, json) = send(app, "PUT", "/missing", Some(&body)).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "document_not_found");
    }

    #[tokio::test]
    async fn test_delete_product_returns_204() {
        let store = Arc::new(InMemoryDocumentStore::new());
        store.insert(
            "products",
            "p1",
            json!({ "name": "Tea", "price": "2.50", "category": "Drinks" }),
        );
        let app = router().with_state(state_with(store.clone()));

        let (status, _) = send(app, "DELETE", "/p1", None).await;

        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(store.len("products"), 0);
    }

    #[tokio::test]
    async fn test_delete_product_returns_500_when_store_fails() {
        let app = router().with_state(state_with(Arc::new(FailingDocumentStore::new())));

        let (status, json) = send(app, "DELETE", "/p1", None).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "infrastructure_error");
    }
}
