//! Aggregation results. Serialized in camelCase like the sale documents
//! they are derived from.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// Revenue totals over three windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SalesTotals {
    /// Sales since local midnight.
    pub daily: Decimal,
    /// Sales since local midnight on the first of the month.
    pub monthly: Decimal,
    /// All sales in the snapshot.
    pub overall: Decimal,
}

/// Per-product rollup over one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSalesSummary {
    /// Product identifier.
    pub product_id: String,
    /// Product name as recorded on its first line in the snapshot.
    pub product_name: String,
    /// Unit price as recorded on its first line in the snapshot.
    pub unit_price: Decimal,
    /// Units sold across all lines.
    pub units_sold: u64,
    /// Sum of `unit_price × quantity` across all lines.
    pub revenue: Decimal,
    /// Latest timestamp among the sales the product appeared in.
    pub last_sold_at: DateTime<Utc>,
}

/// Everything the sales dashboard shows, derived from one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesDashboard {
    /// The instant the boundaries were computed for.
    pub as_of: DateTime<Utc>,
    /// Revenue totals.
    pub totals: SalesTotals,
    /// Per-product rollup in first-seen order.
    pub product_sales: Vec<ProductSalesSummary>,
    /// Number of completed sales that contributed.
    pub sale_count: usize,
}
