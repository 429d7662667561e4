//! In-memory implementation of the `DocumentStore` trait.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

use till_core::document::{
    ChangeNotice, Direction, Document, DocumentStore, OrderBy, OrderKey, Query,
};
use till_core::error::DomainError;
use till_core::timestamp::parse_instant;

use crate::ordering::{compare_instants, compare_values};

const CHANGE_CHANNEL_CAPACITY: usize = 256;

type Collection = BTreeMap<String, Value>;

/// Process-local document store. Documents live in per-collection maps and
/// every write broadcasts a change notice for its collection.
#[derive(Debug)]
pub struct InMemoryDocumentStore {
    collections: Mutex<HashMap<String, Collection>>,
    changes: broadcast::Sender<ChangeNotice>,
}

impl InMemoryDocumentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            collections: Mutex::new(HashMap::new()),
            changes,
        }
    }

    /// Inserts or replaces a document under a caller-chosen identifier.
    pub fn insert(&self, collection: &str, id: &str, data: Value) {
        self.collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(collection.to_owned())
            .or_default()
            .insert(id.to_owned(), data);
        self.notify(collection);
    }

    /// Returns the number of documents in `collection`.
    #[must_use]
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    fn notify(&self, collection: &str) {
        // No receivers just means nobody is subscribed yet.
        let _ = self.changes.send(ChangeNotice {
            collection: collection.to_owned(),
        });
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

fn compare_documents(order: &OrderBy, a: &Document, b: &Document) -> Ordering {
    let (x, y) = (&a.data[&order.field], &b.data[&order.field]);
    let directed = |ordering: Ordering| match order.direction {
        Direction::Ascending => ordering,
        Direction::Descending => ordering.reverse(),
    };
    match order.key {
        OrderKey::Value => directed(compare_values(x, y).then_with(|| a.id.cmp(&b.id))),
        // Values that are not instants trail in either direction.
        OrderKey::Instant => parse_instant(x)
            .is_none()
            .cmp(&parse_instant(y).is_none())
            .then_with(|| directed(compare_instants(x, y).then_with(|| a.id.cmp(&b.id)))),
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn query(&self, query: &Query) -> Result<Vec<Document>, DomainError> {
        let collections = self
            .collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let Some(collection) = collections.get(&query.collection) else {
            return Ok(Vec::new());
        };

        let mut documents: Vec<Document> = match &query.order_by {
            // Ordered queries only see documents that carry the field.
            Some(order) => collection
                .iter()
                .filter(|(_, data)| data.get(&order.field).is_some())
                .map(|(id, data)| Document::new(id.clone(), data.clone()))
                .collect(),
            None => collection
                .iter()
                .map(|(id, data)| Document::new(id.clone(), data.clone()))
                .collect(),
        };

        if let Some(order) = &query.order_by {
            documents.sort_by(|a, b| compare_documents(order, a, b));
        }

        if let Some(limit) = query.limit {
            documents.truncate(limit);
        }
        Ok(documents)
    }

    async fn add(&self, collection: &str, data: Value) -> Result<String, DomainError> {
        if !data.is_object() {
            return Err(DomainError::Validation(
                "document body must be a JSON object".into(),
            ));
        }
        let id = Uuid::new_v4().simple().to_string();
        self.collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(collection.to_owned())
            .or_default()
            .insert(id.clone(), data);
        debug!(collection, id = %id, "document added");
        self.notify(collection);
        Ok(id)
    }

    async fn update(&self, collection: &str, id: &str, data: Value) -> Result<(), DomainError> {
        let Value::Object(fields) = data else {
            return Err(DomainError::Validation(
                "update body must be a JSON object".into(),
            ));
        };
        {
            let mut collections = self
                .collections
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let existing = collections
                .get_mut(collection)
                .and_then(|docs| docs.get_mut(id))
                .ok_or_else(|| DomainError::not_found(collection, id))?;
            match existing {
                Value::Object(current) => current.extend(fields),
                other => *other = Value::Object(fields),
            }
        }
        debug!(collection, id, "document updated");
        self.notify(collection);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), DomainError> {
        let removed = self
            .collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(collection)
            .and_then(|docs| docs.remove(id));
        if removed.is_some() {
            debug!(collection, id, "document deleted");
            self.notify(collection);
        }
        Ok(())
    }

    fn watch(&self) -> broadcast::Receiver<ChangeNotice> {
        self.changes.subscribe()
    }
}
