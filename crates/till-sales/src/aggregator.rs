//! Sales aggregation.
//!
//! Every pass recomputes all figures from the snapshot it is given; nothing
//! carries over between passes. Only completed sales contribute.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::domain::sale::SaleRecord;
use crate::domain::summary::{ProductSalesSummary, SalesDashboard, SalesTotals};

/// Aggregation context: the time zone whose calendar defines "today" and
/// "this month".
#[derive(Debug, Clone)]
pub struct SalesAggregator<Tz: TimeZone> {
    zone: Tz,
}

impl<Tz: TimeZone> SalesAggregator<Tz> {
    /// Creates an aggregator reporting in `zone`.
    #[must_use]
    pub fn new(zone: Tz) -> Self {
        Self { zone }
    }

    /// The reporting time zone.
    #[must_use]
    pub fn zone(&self) -> &Tz {
        &self.zone
    }

    /// Local midnight of the day containing `now`.
    #[must_use]
    pub fn start_of_day(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = now.with_timezone(&self.zone).date_naive();
        local_midnight(&self.zone, today)
    }

    /// Local midnight of the first day of the month containing `now`.
    #[must_use]
    pub fn start_of_month(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = now.with_timezone(&self.zone).date_naive();
        let first = today.with_day(1).unwrap_or(today);
        local_midnight(&self.zone, first)
    }

    /// Daily, monthly and overall revenue as of `now`. Sums saturate at the
    /// bounds of `Decimal` instead of overflowing.
    #[must_use]
    pub fn compute_totals(&self, now: DateTime<Utc>, sales: &[SaleRecord]) -> SalesTotals {
        let day_start = self.start_of_day(now);
        let month_start = self.start_of_month(now);

        sales
            .iter()
            .filter(|sale| sale.is_completed())
            .fold(SalesTotals::default(), |mut totals, sale| {
                totals.overall = totals.overall.saturating_add(sale.total);
                if sale.timestamp >= month_start {
                    totals.monthly = totals.monthly.saturating_add(sale.total);
                }
                if sale.timestamp >= day_start {
                    totals.daily = totals.daily.saturating_add(sale.total);
                }
                totals
            })
    }

    /// Totals plus the per-product rollup in one call.
    #[must_use]
    pub fn summarize(&self, now: DateTime<Utc>, sales: &[SaleRecord]) -> SalesDashboard {
        SalesDashboard {
            as_of: now,
            totals: self.compute_totals(now, sales),
            product_sales: compute_product_sales(sales),
            sale_count: sales.iter().filter(|sale| sale.is_completed()).count(),
        }
    }
}

/// Per-product units, revenue and last sale, in first-seen order.
///
/// Sales are walked in input order and their lines in line order; the first
/// line naming a product fixes its reported name and unit price.
#[must_use]
pub fn compute_product_sales(sales: &[SaleRecord]) -> Vec<ProductSalesSummary> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut summaries: Vec<ProductSalesSummary> = Vec::new();

    for sale in sales.iter().filter(|sale| sale.is_completed()) {
        for item in &sale.items {
            let slot = *slots.entry(item.product_id.as_str()).or_insert_with(|| {
                summaries.push(ProductSalesSummary {
                    product_id: item.product_id.clone(),
                    product_name: item.product_name.clone(),
                    unit_price: item.unit_price,
                    units_sold: 0,
                    revenue: Decimal::ZERO,
                    last_sold_at: sale.timestamp,
                });
                summaries.len() - 1
            });

            let summary = &mut summaries[slot];
            summary.units_sold = summary.units_sold.saturating_add(u64::from(item.quantity));
            summary.revenue = summary
                .revenue
                .saturating_add(item.unit_price.saturating_mul(Decimal::from(item.quantity)));
            if sale.timestamp > summary.last_sold_at {
                summary.last_sold_at = sale.timestamp;
            }
        }
    }

    summaries
}

fn local_midnight<Tz: TimeZone>(zone: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    if let Some(start) = zone.from_local_datetime(&midnight).earliest() {
        return start.with_timezone(&Utc);
    }
    // Midnight falls in a DST gap: the day starts at its first valid minute.
    (1..=24 * 60)
        .map(|minutes| midnight + Duration::minutes(minutes))
        .find_map(|local| zone.from_local_datetime(&local).earliest())
        .map_or_else(
            || Utc.from_utc_datetime(&midnight),
            |start| start.with_timezone(&Utc),
        )
}
