//! Sale records and the ingestion boundary.
//!
//! Documents from the sales feed are only trusted once they have been turned
//! into a `SaleRecord`, whose timestamp is a validated instant. A document
//! whose timestamp cannot be read is rejected; it is never given a stand-in
//! date, because a wrong instant silently moves money between the daily and
//! monthly figures.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use till_core::document::Document;
use till_core::error::DomainError;
use till_core::timestamp::parse_instant;
use tracing::warn;

use super::error::IngestError;

/// Collection holding sale documents.
pub const SALES_COLLECTION: &str = "sales";

/// Largest magnitude accepted for a price, line total or sale total
/// (10^15). Sums of bounded amounts stay far inside `Decimal`'s range.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// Lifecycle status of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaleStatus {
    /// Rung up but not yet paid.
    Pending,
    /// Paid; counts towards every aggregate.
    Completed,
    /// Any other status (voided, refunded, unknown).
    #[default]
    #[serde(other)]
    Other,
}

/// One line of a sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Identifier of the product sold.
    pub product_id: String,
    /// Product name at the time of sale.
    #[serde(default)]
    pub product_name: String,
    /// Price of one unit at the time of sale.
    #[serde(rename = "price", alias = "unitPrice")]
    pub unit_price: Decimal,
    /// Number of units sold.
    pub quantity: u32,
}

impl LineItem {
    /// `unit_price × quantity`, or `None` if the product overflows.
    #[must_use]
    pub fn line_total(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }

    fn is_within_bounds(&self) -> bool {
        self.unit_price.abs() <= MAX_AMOUNT
            && self.line_total().is_some_and(|line| line.abs() <= MAX_AMOUNT)
    }
}

/// A validated sale record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRecord {
    /// Document identifier.
    pub id: String,
    /// When the sale happened.
    pub timestamp: DateTime<Utc>,
    /// Lifecycle status.
    pub status: SaleStatus,
    /// Amount charged for the whole sale.
    pub total: Decimal,
    /// Lines in the order they were rung up.
    pub items: Vec<LineItem>,
}

impl SaleRecord {
    /// Returns `true` if the sale participates in aggregates.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == SaleStatus::Completed
    }

    /// Validates a sale document.
    ///
    /// # Errors
    ///
    /// Returns `IngestError::MalformedRecord` if the document is not a sale
    /// or carries an amount beyond [`MAX_AMOUNT`], and
    /// `IngestError::MalformedTimestamp` if its timestamp is unreadable.
    pub fn from_document(document: &Document) -> Result<Self, IngestError> {
        let raw: RawSaleRecord = document.decode(SALES_COLLECTION).map_err(|e| {
            let reason = match e {
                DomainError::MalformedDocument { reason, .. } => reason,
                other => other.to_string(),
            };
            IngestError::MalformedRecord {
                sale_id: document.id.clone(),
                reason,
            }
        })?;

        if let Err(reason) = check_amounts(raw.total, &raw.items) {
            return Err(IngestError::MalformedRecord {
                sale_id: raw.id,
                reason,
            });
        }

        let timestamp =
            parse_timestamp(&raw.timestamp).ok_or_else(|| IngestError::MalformedTimestamp {
                sale_id: raw.id.clone(),
                raw: raw.timestamp.to_string(),
            })?;

        Ok(Self {
            id: raw.id,
            timestamp,
            status: raw.status,
            total: raw.total,
            items: raw.items,
        })
    }
}

fn check_amounts(total: Decimal, items: &[LineItem]) -> Result<(), String> {
    if total.abs() > MAX_AMOUNT {
        return Err(format!("total {total} is out of range"));
    }
    match items.iter().position(|item| !item.is_within_bounds()) {
        Some(index) => Err(format!("item {index}: amount is out of range")),
        None => Ok(()),
    }
}

#[derive(Debug, Deserialize)]
struct RawSaleRecord {
    id: String,
    timestamp: Value,
    #[serde(default)]
    status: SaleStatus,
    total: Decimal,
    #[serde(default)]
    items: Vec<LineItem>,
}

/// Reads an instant from its wire form: an RFC 3339 string, or an object
/// with integral `seconds` and optional `nanoseconds` since the Unix epoch
/// (underscore-prefixed field names are accepted too).
#[must_use]
pub fn parse_timestamp(raw: &Value) -> Option<DateTime<Utc>> {
    parse_instant(raw)
}

/// Outcome of ingesting one feed snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Records that passed validation, in feed order.
    pub sales: Vec<SaleRecord>,
    /// Documents that were rejected.
    pub rejected: Vec<IngestError>,
}

/// Validates every document of a snapshot, keeping feed order. Rejected
/// documents are logged and reported, never repaired.
#[must_use]
pub fn ingest(documents: &[Document]) -> IngestReport {
    let mut report = IngestReport::default();
    for document in documents {
        match SaleRecord::from_document(document) {
            Ok(sale) => report.sales.push(sale),
            Err(e) => {
                warn!(error = %e, "rejecting sale record");
                report.rejected.push(e);
            }
        }
    }
    report
}
