//! Test document stores — mock `DocumentStore` implementations for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use till_core::document::{ChangeNotice, Document, DocumentStore, Query};
use till_core::error::DomainError;
use tokio::sync::broadcast;

/// A write observed by `RecordingDocumentStore`.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedWrite {
    /// `add(collection, data)`.
    Add {
        /// Target collection.
        collection: String,
        /// Document body.
        data: Value,
    },
    /// `update(collection, id, data)`.
    Update {
        /// Target collection.
        collection: String,
        /// Document identifier.
        id: String,
        /// Fields merged into the document.
        data: Value,
    },
    /// `delete(collection, id)`.
    Delete {
        /// Target collection.
        collection: String,
        /// Document identifier.
        id: String,
    },
}

/// A document store that records every write and answers every query with
/// the configured documents. `add` returns `generated-<n>` identifiers.
#[derive(Debug)]
pub struct RecordingDocumentStore {
    query_result: Vec<Document>,
    writes: Mutex<Vec<RecordedWrite>>,
    changes: broadcast::Sender<ChangeNotice>,
}

impl RecordingDocumentStore {
    /// Create a recording store whose queries return `query_result`.
    #[must_use]
    pub fn new(query_result: Vec<Document>) -> Self {
        let (changes, _) = broadcast::channel(16);
        Self {
            query_result,
            writes: Mutex::new(Vec::new()),
            changes,
        }
    }

    /// Returns a snapshot of all writes performed so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn writes(&self) -> Vec<RecordedWrite> {
        self.writes.lock().unwrap().clone()
    }

    fn record(&self, write: RecordedWrite) -> usize {
        let mut writes = self.writes.lock().unwrap();
        writes.push(write);
        writes.len()
    }
}

#[async_trait]
impl DocumentStore for RecordingDocumentStore {
    async fn query(&self, query: &Query) -> Result<Vec<Document>, DomainError> {
        let mut docs = self.query_result.clone();
        if let Some(limit) = query.limit {
            docs.truncate(limit);
        }
        Ok(docs)
    }

    async fn add(&self, collection: &str, data: Value) -> Result<String, DomainError> {
        let n = self.record(RecordedWrite::Add {
            collection: collection.to_owned(),
            data,
        });
        Ok(format!("generated-{n}"))
    }

    async fn update(&self, collection: &str, id: &str, data: Value) -> Result<(), DomainError> {
        self.record(RecordedWrite::Update {
            collection: collection.to_owned(),
            id: id.to_owned(),
            data,
        });
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), DomainError> {
        self.record(RecordedWrite::Delete {
            collection: collection.to_owned(),
            id: id.to_owned(),
        });
        Ok(())
    }

    fn watch(&self) -> broadcast::Receiver<ChangeNotice> {
        self.changes.subscribe()
    }
}

/// A document store that always returns an infrastructure error. Useful for
/// testing error-handling paths.
#[derive(Debug)]
pub struct FailingDocumentStore {
    changes: broadcast::Sender<ChangeNotice>,
}

impl FailingDocumentStore {
    /// Creates a new failing store.
    #[must_use]
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(1);
        Self { changes }
    }
}

impl Default for FailingDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for FailingDocumentStore {
    async fn query(&self, _query: &Query) -> Result<Vec<Document>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn add(&self, _collection: &str, _data: Value) -> Result<String, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn update(&self, _collection: &str, _id: &str, _data: Value) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn delete(&self, _collection: &str, _id: &str) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    fn watch(&self) -> broadcast::Receiver<ChangeNotice> {
        self.changes.subscribe()
    }
}
