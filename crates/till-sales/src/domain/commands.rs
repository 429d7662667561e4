//! Commands for the sales context.

use uuid::Uuid;

use super::sale::{LineItem, SaleStatus};

/// Command to record a sale rung up at the till.
#[derive(Debug, Clone)]
pub struct RecordSale {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Lines in the order they were rung up.
    pub items: Vec<LineItem>,
    /// Initial status, usually `Completed`.
    pub status: SaleStatus,
}
