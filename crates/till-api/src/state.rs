//! Shared application state.

use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use till_catalog::application::views::{CashierView, CatalogViews};
use till_core::cache::LocalCache;
use till_core::clock::Clock;
use till_core::document::DocumentStore;
use till_sales::aggregator::SalesAggregator;
use till_sales::application::sales_view::SalesView;
use till_sales::domain::summary::SalesDashboard;

use crate::config::ReportingZone;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Clock used to stamp sales and compute dashboard boundaries.
    pub clock: Arc<dyn Clock>,
    /// Document store all writes go to.
    pub document_store: Arc<dyn DocumentStore>,
    /// Back-office category and product views.
    pub catalog: Arc<CatalogViews>,
    /// Cashier-screen catalog view.
    pub cashier: Arc<CashierView>,
    /// Live sales feed.
    pub sales: Arc<SalesView>,
    /// Time zone whose calendar bounds the dashboard totals.
    pub reporting_zone: ReportingZone,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("catalog", &self.catalog)
            .field("cashier", &self.cashier)
            .field("sales", &self.sales)
            .field("reporting_zone", &self.reporting_zone)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Create new application state with empty views seeded from `cache`.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        document_store: Arc<dyn DocumentStore>,
        cache: &Arc<dyn LocalCache>,
        sales_feed_limit: usize,
        reporting_zone: ReportingZone,
    ) -> Self {
        Self {
            clock,
            document_store,
            catalog: Arc::new(CatalogViews::new(cache)),
            cashier: Arc::new(CashierView::new(cache)),
            sales: Arc::new(SalesView::new(sales_feed_limit)),
            reporting_zone,
        }
    }

    /// Dashboard figures of the current sales snapshot as of `now`.
    #[must_use]
    pub fn dashboard(&self, now: DateTime<Utc>) -> SalesDashboard {
        match self.reporting_zone {
            ReportingZone::Local => self.sales.dashboard(&SalesAggregator::new(Local), now),
            ReportingZone::Named(zone) => self.sales.dashboard(&SalesAggregator::new(zone), now),
        }
    }

    /// Starts every view following the document store.
    pub fn start_views(&self) {
        self.catalog.start(&self.document_store);
        self.cashier.start(&self.document_store);
        self.sales.start(Arc::clone(&self.document_store));
    }

    /// Stops every view.
    pub fn stop_views(&self) {
        self.catalog.stop();
        self.cashier.stop();
        self.sales.stop();
    }
}
