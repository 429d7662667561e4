//! Command handlers for the sales context.

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;
use till_core::clock::Clock;
use till_core::document::DocumentStore;
use till_core::error::DomainError;
use tracing::info;

use crate::domain::commands::RecordSale;
use crate::domain::sale::{LineItem, MAX_AMOUNT, SALES_COLLECTION};

/// Result of recording a sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedSale {
    /// Identifier assigned by the store.
    pub sale_id: String,
    /// Sum of the line totals.
    pub total: Decimal,
    /// When the sale was stamped.
    pub timestamp: DateTime<Utc>,
}

/// Checks the item list and returns the sale total.
fn validate_items(items: &[LineItem]) -> Result<Decimal, DomainError> {
    if items.is_empty() {
        return Err(DomainError::Validation(
            "a sale needs at least one item".into(),
        ));
    }
    for (index, item) in items.iter().enumerate() {
        if item.product_id.trim().is_empty() {
            return Err(DomainError::Validation(format!(
                "item {index}: product id must not be empty"
            )));
        }
        if item.quantity == 0 {
            return Err(DomainError::Validation(format!(
                "item {index}: quantity must be positive"
            )));
        }
        if item.unit_price < Decimal::ZERO {
            return Err(DomainError::Validation(format!(
                "item {index}: price must not be negative"
            )));
        }
        if item.unit_price > MAX_AMOUNT {
            return Err(DomainError::Validation(format!(
                "item {index}: price must not exceed {MAX_AMOUNT}"
            )));
        }
    }

    let mut total = Decimal::ZERO;
    for (index, item) in items.iter().enumerate() {
        total = item
            .line_total()
            .filter(|line| *line <= MAX_AMOUNT)
            .and_then(|line| total.checked_add(line))
            .filter(|sum| *sum <= MAX_AMOUNT)
            .ok_or_else(|| {
                DomainError::Validation(format!(
                    "item {index}: sale total must not exceed {MAX_AMOUNT}"
                ))
            })?;
    }
    Ok(total)
}

/// Handles the `RecordSale` command.
///
/// The sale is stamped with the clock's current instant and its total is
/// the sum of its line totals.
///
/// # Errors
///
/// Returns `DomainError::Validation` for an empty or invalid item list or
/// one whose amounts exceed `MAX_AMOUNT`, or the store's error if the write
/// fails.
pub async fn handle_record_sale(
    command: &RecordSale,
    clock: &dyn Clock,
    store: &dyn DocumentStore,
) -> Result<RecordedSale, DomainError> {
    let total = validate_items(&command.items)?;
    let timestamp = clock.now();
    let body = json!({
        "timestamp": timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        "status": command.status,
        "total": total,
        "items": command.items,
    });

    let sale_id = store.add(SALES_COLLECTION, body).await?;
    info!(
        correlation_id = %command.correlation_id,
        sale_id = %sale_id,
        total = %total,
        items = command.items.len(),
        "sale recorded"
    );

    Ok(RecordedSale {
        sale_id,
        total,
        timestamp,
    })
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use serde_json::json;
    use till_core::document::{DocumentStore, Query};
    use till_core::error::DomainError;
    use till_store::memory_document_store::InMemoryDocumentStore;
    use till_test_support::{
        FailingDocumentStore, FixedClock, RecordedWrite, RecordingDocumentStore, at,
    };
    use uuid::Uuid;

    use crate::application::command_handlers::handle_record_sale;
    use crate::domain::commands::RecordSale;
    use crate::domain::sale::{LineItem, MAX_AMOUNT, SaleRecord, SaleStatus};

    fn line(product_id: &str, price: rust_decimal::Decimal, quantity: u32) -> LineItem {
        LineItem {
            product_id: product_id.into(),
            product_name: "Tea".into(),
            unit_price: price,
            quantity,
        }
    }

    fn record(items: Vec<LineItem>) -> RecordSale {
        RecordSale {
            correlation_id: Uuid::new_v4(),
            items,
            status: SaleStatus::Completed,
        }
    }

    #[tokio::test]
    async fn test_handle_record_sale_writes_stamped_document() {
        // Arrange
        let clock = FixedClock(at(2024, 3, 15, 8, 0, 0));
        let store = RecordingDocumentStore::new(Vec::new());
        let command = record(vec![line("p1", dec!(2.50), 2), line("p2", dec!(1.25), 1)]);

        // Act
        let recorded = handle_record_sale(&command, &clock, &store).await.unwrap();

        // Assert
        assert_eq!(recorded.sale_id, "generated-1");
        assert_eq!(recorded.total, dec!(6.25));
        assert_eq!(recorded.timestamp, at(2024, 3, 15, 8, 0, 0));
        match &store.writes()[..] {
            [RecordedWrite::Add { collection, data }] => {
                assert_eq!(collection, "sales");
                assert_eq!(data["timestamp"], "2024-03-15T08:00:00.000Z");
                assert_eq!(data["status"], "completed");
                assert_eq!(data["total"], json!(dec!(6.25)));
                assert_eq!(data["items"][0]["productId"], "p1");
                assert_eq!(data["items"][0]["price"], json!(dec!(2.50)));
            }
            other => panic!("expected one add, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_recorded_sale_reads_back_through_ingestion() {
        // Arrange
        let clock = FixedClock(at(2024, 3, 15, 8, 0, 0));
        let store = InMemoryDocumentStore::new();
        let command = record(vec![line("p1", dec!(3), 3)]);

        // Act
        let recorded = handle_record_sale(&command, &clock, &store).await.unwrap();

        // Assert
        let docs = store.query(&Query::collection("sales")).await.unwrap();
        let sale = SaleRecord::from_document(&docs[0]).unwrap();
        assert_eq!(sale.id, recorded.sale_id);
        assert_eq!(sale.timestamp, recorded.timestamp);
        assert_eq!(sale.total, dec!(9));
        assert!(sale.is_completed());
        assert_eq!(sale.items, command.items);
    }

    #[tokio::test]
    async fn test_handle_record_sale_rejects_invalid_items_without_writing() {
        let clock = FixedClock(at(2024, 3, 15, 8, 0, 0));
        let store = RecordingDocumentStore::new(Vec::new());

        for items in [
            vec![],
            vec![line("p1", dec!(1), 0)],
            vec![line(" ", dec!(1), 1)],
            vec![line("p1", dec!(-1), 1)],
        ] {
            let result = handle_record_sale(&record(items), &clock, &store).await;

            assert!(matches!(result, Err(DomainError::Validation(_))));
        }
        assert!(store.writes().is_empty());
    }

    #[tokio::test]
    async fn test_handle_record_sale_rejects_amounts_out_of_range() {
        let clock = FixedClock(at(2024, 3, 15, 8, 0, 0));
        let store = RecordingDocumentStore::new(Vec::new());
        let max = MAX_AMOUNT;

        for items in [
            vec![line("p1", rust_decimal::Decimal::MAX, 2)],
            vec![line("p1", max + dec!(0.01), 1)],
            vec![line("p1", max, 2)],
            vec![line("p1", max, 1), line("p2", dec!(0.01), 1)],
        ] {
            let result = handle_record_sale(&record(items), &clock, &store).await;

            match result.unwrap_err() {
                DomainError::Validation(msg) => assert!(msg.contains("exceed"), "{msg}"),
                other => panic!("expected Validation, got {other:?}"),
            }
        }
        assert!(store.writes().is_empty());
    }

    #[tokio::test]
    async fn test_handle_record_sale_accepts_total_at_the_bound() {
        let clock = FixedClock(at(2024, 3, 15, 8, 0, 0));
        let store = RecordingDocumentStore::new(Vec::new());
        let half = MAX_AMOUNT / dec!(2);

        let recorded = handle_record_sale(&record(vec![line("p1", half, 2)]), &clock, &store)
            .await
            .unwrap();

        assert_eq!(recorded.total, MAX_AMOUNT);
    }

    #[tokio::test]
    async fn test_handle_record_sale_propagates_store_failure() {
        let clock = FixedClock(at(2024, 3, 15, 8, 0, 0));
        let store = FailingDocumentStore::new();

        let result = handle_record_sale(&record(vec![line("p1", dec!(1), 1)]), &clock, &store).await;

        match result.unwrap_err() {
            DomainError::Infrastructure(msg) => assert_eq!(msg, "connection refused"),
            other => panic!("expected Infrastructure, got {other:?}"),
        }
    }
}
