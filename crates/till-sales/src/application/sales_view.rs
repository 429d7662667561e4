//! Live view over the sales feed.
//!
//! Every snapshot is ingested from scratch and replaces the previous one;
//! the dashboard figures are recomputed from the current snapshot whenever
//! they are asked for.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use chrono::{DateTime, TimeZone, Utc};
use till_core::document::{Direction, Document, DocumentStore, Query};
use till_core::error::DomainError;
use till_core::listener::{self, SnapshotSubscription};
use tracing::{info, warn};

use crate::aggregator::SalesAggregator;
use crate::domain::error::IngestError;
use crate::domain::sale::{SALES_COLLECTION, SaleRecord, ingest};
use crate::domain::summary::SalesDashboard;

/// Number of most recent sales the feed follows unless configured otherwise.
pub const DEFAULT_FEED_LIMIT: usize = 50;

/// The sales feed query: newest instant first, capped at `limit`.
#[must_use]
pub fn sales_feed_query(limit: usize) -> Query {
    Query::collection(SALES_COLLECTION)
        .order_by_instant("timestamp", Direction::Descending)
        .limit(limit)
}

/// One ingested feed snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SalesSnapshot {
    /// Completed sales, newest first.
    pub recent_sales: Vec<SaleRecord>,
    /// Documents rejected at the ingestion boundary.
    pub rejected: Vec<IngestError>,
    /// Number of documents the snapshot contained.
    pub received: usize,
}

impl SalesSnapshot {
    fn from_documents(documents: &[Document]) -> Self {
        let report = ingest(documents);
        let recent_sales: Vec<SaleRecord> = report
            .sales
            .into_iter()
            .filter(SaleRecord::is_completed)
            .collect();

        if !report.rejected.is_empty() {
            warn!(
                rejected = report.rejected.len(),
                received = documents.len(),
                "sales snapshot contained malformed records"
            );
        }
        info!(
            received = documents.len(),
            completed = recent_sales.len(),
            "sales snapshot applied"
        );

        Self {
            recent_sales,
            rejected: report.rejected,
            received: documents.len(),
        }
    }
}

/// Follows the sales feed and serves dashboard figures from it.
#[derive(Debug)]
pub struct SalesView {
    query: Query,
    snapshot: Arc<RwLock<SalesSnapshot>>,
    subscription: Mutex<Option<SnapshotSubscription>>,
}

impl SalesView {
    /// Creates an empty view following the `limit` most recent sales.
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            query: sales_feed_query(limit),
            snapshot: Arc::new(RwLock::new(SalesSnapshot::default())),
            subscription: Mutex::new(None),
        }
    }

    /// The feed query.
    #[must_use]
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Starts following the store. Calling this while already live is a
    /// no-op. Must be called from within a tokio runtime.
    pub fn start(&self, store: Arc<dyn DocumentStore>) {
        let mut subscription = self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if subscription.as_ref().is_some_and(|s| !s.is_finished()) {
            return;
        }

        let snapshot = Arc::clone(&self.snapshot);
        *subscription = Some(listener::subscribe(
            store,
            self.query.clone(),
            move |documents| {
                let next = SalesSnapshot::from_documents(&documents);
                *snapshot.write().unwrap_or_else(PoisonError::into_inner) = next;
            },
        ));
        info!(limit = ?self.query.limit, "sales feed started");
    }

    /// Stops following the store. The last snapshot is kept.
    pub fn stop(&self) {
        let stopped = self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if stopped.is_some() {
            info!("sales feed stopped");
        }
    }

    /// Re-reads the feed once.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the query fails; the current snapshot is
    /// kept in that case.
    pub async fn refresh(&self, store: &dyn DocumentStore) -> Result<(), DomainError> {
        let documents = store.query(&self.query).await?;
        let next = SalesSnapshot::from_documents(&documents);
        *self
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner) = next;
        Ok(())
    }

    /// Returns a copy of the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> SalesSnapshot {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Completed sales of the current snapshot, newest first.
    #[must_use]
    pub fn recent_sales(&self) -> Vec<SaleRecord> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .recent_sales
            .clone()
    }

    /// Dashboard figures for the current snapshot as of `now`.
    #[must_use]
    pub fn dashboard<Tz: TimeZone>(
        &self,
        aggregator: &SalesAggregator<Tz>,
        now: DateTime<Utc>,
    ) -> SalesDashboard {
        let snapshot = self.snapshot.read().unwrap_or_else(PoisonError::into_inner);
        aggregator.summarize(now, &snapshot.recent_sales)
    }
}
