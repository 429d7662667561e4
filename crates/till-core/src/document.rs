//! Document store abstraction.
//!
//! The remote database is a collection-of-JSON-documents store with live
//! change notification. Bounded contexts only talk to it through the
//! `DocumentStore` trait; concrete backends live in `till-store`.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::error::DomainError;

/// A stored document: its identifier plus its JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Document identifier, unique within its collection.
    pub id: String,
    /// Document body. Always a JSON object for well-formed documents.
    pub data: Value,
}

impl Document {
    /// Creates a new document.
    #[must_use]
    pub fn new(id: impl Into<String>, data: Value) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    /// Decodes the document into `T`, exposing the identifier as an `id`
    /// field next to the body fields.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MalformedDocument` if the body is not an object
    /// or does not deserialize into `T`.
    pub fn decode<T: DeserializeOwned>(&self, collection: &str) -> Result<T, DomainError> {
        let malformed = |reason: String| DomainError::MalformedDocument {
            collection: collection.to_owned(),
            id: self.id.clone(),
            reason,
        };

        let Value::Object(fields) = &self.data else {
            return Err(malformed("document body is not an object".to_owned()));
        };
        let mut fields = fields.clone();
        fields.insert("id".to_owned(), Value::String(self.id.clone()));

        serde_json::from_value(Value::Object(fields)).map_err(|e| malformed(e.to_string()))
    }
}

/// Sort direction for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Smallest value first.
    Ascending,
    /// Largest value first.
    Descending,
}

/// How the values of the ordering field are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderKey {
    /// The raw JSON values, in `jsonb` order.
    #[default]
    Value,
    /// The instants the values denote, as read by
    /// [`parse_instant`](crate::timestamp::parse_instant). Values that are
    /// not instants sort after every instant in both directions.
    Instant,
}

/// Ordering on a single top-level field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    /// Top-level field name.
    pub field: String,
    /// Sort direction.
    pub direction: Direction,
    /// Comparison applied to the field values.
    pub key: OrderKey,
}

/// A query over one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// Collection name.
    pub collection: String,
    /// Optional ordering; unordered queries return documents by id.
    pub order_by: Option<OrderBy>,
    /// Optional maximum number of documents.
    pub limit: Option<usize>,
}

impl Query {
    /// Starts a query over `collection`.
    #[must_use]
    pub fn collection(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            order_by: None,
            limit: None,
        }
    }

    /// Orders results by `field`.
    #[must_use]
    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some(OrderBy {
            field: field.into(),
            direction,
            key: OrderKey::Value,
        });
        self
    }

    /// Orders results by the instant stored in `field`, whichever wire form
    /// it uses.
    #[must_use]
    pub fn order_by_instant(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some(OrderBy {
            field: field.into(),
            direction,
            key: OrderKey::Instant,
        });
        self
    }

    /// Caps the number of results.
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Notification that a collection changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeNotice {
    /// The collection that was written to.
    pub collection: String,
}

/// Repository trait for the remote document database.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Runs a query and returns the full current result set.
    async fn query(&self, query: &Query) -> Result<Vec<Document>, DomainError>;

    /// Adds a document with a store-generated identifier and returns it.
    async fn add(&self, collection: &str, data: Value) -> Result<String, DomainError>;

    /// Merges the top-level fields of `data` into an existing document.
    /// Fails with `DomainError::DocumentNotFound` if the document is absent.
    async fn update(&self, collection: &str, id: &str, data: Value) -> Result<(), DomainError>;

    /// Deletes a document. Deleting an absent document succeeds.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), DomainError>;

    /// Subscribes to change notices for every collection.
    fn watch(&self) -> broadcast::Receiver<ChangeNotice>;
}
