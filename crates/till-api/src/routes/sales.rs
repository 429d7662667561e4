//! Routes for the sales context.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use till_core::clock::Clock;
use till_sales::application::command_handlers::{self, RecordedSale};
use till_sales::domain::commands;
use till_sales::domain::sale::{LineItem, SaleRecord, SaleStatus};
use till_sales::domain::summary::SalesDashboard;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /.
#[derive(Debug, Deserialize)]
pub struct RecordSaleRequest {
    /// Lines in the order they were rung up.
    pub items: Vec<LineItem>,
    /// Initial status; `completed` when omitted.
    #[serde(default)]
    pub status: Option<SaleStatus>,
}

/// Response body for GET /summary.
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    /// Totals and per-product rollup.
    #[serde(flatten)]
    pub dashboard: SalesDashboard,
    /// Number of feed documents rejected at ingestion.
    pub rejected: usize,
}

/// Response body for GET /recent.
#[derive(Debug, Serialize)]
pub struct RecentSalesResponse {
    /// Completed sales, newest first.
    pub sales: Vec<SaleRecord>,
}

/// GET /summary
async fn summary(State(state): State<AppState>) -> Json<SummaryResponse> {
    let now = state.clock.now();
    let rejected = state.sales.snapshot().rejected.len();

    Json(SummaryResponse {
        dashboard: state.dashboard(now),
        rejected,
    })
}

/// GET /recent
async fn recent_sales(State(state): State<AppState>) -> Json<RecentSalesResponse> {
    Json(RecentSalesResponse {
        sales: state.sales.recent_sales(),
    })
}

/// POST /
#[instrument(skip(state, request), fields(items = request.items.len()))]
async fn record_sale(
    State(state): State<AppState>,
    Json(request): Json<RecordSaleRequest>,
) -> Result<(StatusCode, Json<RecordedSale>), ApiError> {
    let command = commands::RecordSale {
        correlation_id: Uuid::new_v4(),
        items: request.items,
        status: request.status.unwrap_or(SaleStatus::Completed),
    };

    info!(correlation_id = %command.correlation_id, "handling record_sale command");

    let recorded = command_handlers::handle_record_sale(
        &command,
        state.clock.as_ref(),
        &*state.document_store,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(recorded)))
}

/// Returns the router for the sales context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(record_sale))
        .route("/summary", get(summary))
        .route("/recent", get(recent_sales))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use serde_json::json;
    use till_store::memory_document_store::InMemoryDocumentStore;
    use till_test_support::FailingDocumentStore;

    use super::*;
    use crate::routes::test_helpers::{send, state_with};

    fn seeded_store() -> Arc<InMemoryDocumentStore> {
        let store = Arc::new(InMemoryDocumentStore::new());
        store.insert(
            "sales",
            "s1",
            json!({
                "timestamp": "2024-03-15T08:00:00Z",
                "status": "completed",
                "total": 10,
                "items": [{ "productId": "p1", "productName": "Tea", "price": 10, "quantity": 1 }]
            }),
        );
        store.insert(
            "sales",
            "s2",
            json!({
                "timestamp": "2024-02-01T00:00:00Z",
                "status": "completed",
                "total": 25,
                "items": [{ "productId": "p1", "productName": "Tea", "price": 25, "quantity": 1 }]
            }),
        );
        store.insert(
            "sales",
            "broken",
            json!({ "timestamp": "not a date", "status": "completed", "total": 1000 }),
        );
        store
    }

    #[tokio::test]
    async fn test_summary_returns_totals_and_product_rollup() {
        // Arrange
        let store = seeded_store();
        let state = state_with(store.clone());
        state.sales.refresh(&*store).await.unwrap();
        let app = router().with_state(state);

        // Act
        let (status, json) = send(app, "GET", "/summary", None).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["totals"]["daily"], "10");
        assert_eq!(json["totals"]["monthly"], "10");
        assert_eq!(json["totals"]["overall"], "35");
        assert_eq!(json["productSales"][0]["productId"], "p1");
        assert_eq!(json["productSales"][0]["unitsSold"], 2);
        assert_eq!(json["productSales"][0]["revenue"], "35");
        assert_eq!(json["productSales"][0]["lastSoldAt"], "2024-03-15T08:00:00Z");
        assert_eq!(json["saleCount"], 2);
        assert_eq!(json["rejected"], 1);
    }

    #[tokio::test]
    async fn test_summary_of_empty_feed_is_zero() {
        let app = router().with_state(state_with(Arc::new(InMemoryDocumentStore::new())));

        let (status, json) = send(app, "GET", "/summary", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["totals"]["overall"], "0");
        assert_eq!(json["productSales"], json!([]));
    }

    #[tokio::test]
    async fn test_recent_returns_completed_sales_newest_first() {
        let store = seeded_store();
        let state = state_with(store.clone());
        state.sales.refresh(&*store).await.unwrap();
        let app = router().with_state(state);

        let (status, json) = send(app, "GET", "/recent", None).await;

        assert_eq!(status, StatusCode::OK);
        let ids: Vec<&str> = json["sales"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["s1", "s2"]);
    }

    #[tokio::test]
    async fn test_record_sale_returns_201_and_feeds_the_summary() {
        // Arrange
        let store = Arc::new(InMemoryDocumentStore::new());
        let state = state_with(store.clone());
        let body = json!({
            "items": [
                { "productId": "p1", "productName": "Tea", "price": "2.50", "quantity": 2 }
            ]
        });

        // Act
        let (status, json) = send(router().with_state(state.clone()), "POST", "/", Some(&body)).await;
        state.sales.refresh(&*store).await.unwrap();
        let (_, summary) = send(router().with_state(state), "GET", "/summary", None).await;

        // Assert
        assert_eq!(status, StatusCode::CREATED);
        assert!(json["saleId"].is_string());
        assert_eq!(json["total"], "5.00");
        assert_eq!(json["timestamp"], "2024-03-15T10:00:00Z");
        assert_eq!(summary["totals"]["daily"], "5.00");
    }

    #[tokio::test]
    async fn test_record_sale_returns_400_for_empty_items() {
        let app = router().with_state(state_with(Arc::new(InMemoryDocumentStore::new())));

        let (status, json) = send(app, "POST", "/", Some(&json!({ "items": [] }))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_record_sale_returns_400_for_amounts_out_of_range() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let app = router().with_state(state_with(store.clone()));
        let body = json!({
            "items": [{ "productId": "p1", "price": "79228162514264337593543950335", "quantity": 2 }]
        });

        let (status, json) = send(app, "POST", "/", Some(&body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "validation_error");
        assert_eq!(store.len("sales"), 0);
    }

    #[tokio::test]
    async fn test_summary_survives_an_oversized_stored_sale() {
        // Arrange
        let store = seeded_store();
        store.insert(
            "sales",
            "huge",
            json!({ "timestamp": "2024-03-15T09:00:00Z", "status": "completed",
                    "total": "79228162514264337593543950335" }),
        );
        let state = state_with(store.clone());
        state.sales.refresh(&*store).await.unwrap();
        let app = router().with_state(state);

        // Act
        let (status, json) = send(app, "GET", "/summary", None).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["totals"]["overall"], "35");
        assert_eq!(json["rejected"], 2);
    }

    #[tokio::test]
    async fn test_responses_use_camel_case_throughout() {
        let store = seeded_store();
        let state = state_with(store.clone());
        state.sales.refresh(&*store).await.unwrap();

        let (_, summary) = send(router().with_state(state.clone()), "GET", "/summary", None).await;
        let (_, recent) = send(router().with_state(state), "GET", "/recent", None).await;

        assert!(summary.get("asOf").is_some());
        assert!(summary.get("product_sales").is_none());
        assert_eq!(summary["productSales"][0]["productName"], "Tea");
        assert_eq!(summary["productSales"][0]["unitPrice"], "10");
        assert_eq!(recent["sales"][0]["items"][0]["productId"], "p1");
        assert_eq!(recent["sales"][0]["items"][0]["productName"], "Tea");
    }

    #[tokio::test]
    async fn test_record_sale_returns_500_when_store_fails() {
        let app = router().with_state(state_with(Arc::new(FailingDocumentStore::new())));
        let body = json!({ "items": [{ "productId": "p1", "price": 1, "quantity": 1 }] });

        let (status, json) = send(app, "POST", "/", Some(&body)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "infrastructure_error");
    }
}
