//! Live snapshot subscriptions.
//!
//! A subscription re-runs its query every time the queried collection
//! changes and hands the complete result set to a callback. Consumers always
//! rebuild their state from the full snapshot.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::document::{Document, DocumentStore, Query};

/// Handle to a running subscription. Dropping it unsubscribes.
#[derive(Debug)]
pub struct SnapshotSubscription {
    handle: JoinHandle<()>,
}

impl SnapshotSubscription {
    /// Returns `true` once the subscription task has stopped.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for SnapshotSubscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Subscribes to `query`, invoking `on_snapshot` with the full result set
/// once immediately and again after every change to the queried collection.
///
/// Query failures are logged and the subscription keeps waiting for the next
/// change. The task ends when the store's change channel closes.
///
/// Must be called from within a tokio runtime.
pub fn subscribe<F>(
    store: Arc<dyn DocumentStore>,
    query: Query,
    mut on_snapshot: F,
) -> SnapshotSubscription
where
    F: FnMut(Vec<Document>) + Send + 'static,
{
    // Register for notices before the first query so no write falls between.
    let mut changes = store.watch();

    let handle = tokio::spawn(async move {
        loop {
            match store.query(&query).await {
                Ok(documents) => {
                    debug!(
                        collection = %query.collection,
                        count = documents.len(),
                        "snapshot delivered"
                    );
                    on_snapshot(documents);
                }
                Err(e) => {
                    error!(collection = %query.collection, error = %e, "snapshot query failed");
                }
            }

            loop {
                match changes.recv().await {
                    Ok(notice) if notice.collection == query.collection => break,
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(collection = %query.collection, skipped, "change feed lagged");
                        break;
                    }
                    Err(RecvError::Closed) => return,
                }
            }
        }
    });

    SnapshotSubscription { handle }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::{Value, json};
    use tokio::sync::{broadcast, mpsc};

    use super::*;
    use crate::document::ChangeNotice;
    use crate::error::DomainError;

    #[derive(Debug)]
    struct MockStore {
        docs: Mutex<BTreeMap<(String, String), Value>>,
        changes: broadcast::Sender<ChangeNotice>,
    }

    impl MockStore {
        fn new() -> Self {
            let (changes, _) = broadcast::channel(16);
            Self {
                docs: Mutex::new(BTreeMap::new()),
                changes,
            }
        }
    }

    #[async_trait]
    impl DocumentStore for MockStore {
        async fn query(&self, query: &Query) -> Result<Vec<Document>, DomainError> {
            Ok(self
                .docs
                .lock()
                .unwrap()
                .iter()
                .filter(|((collection, _), _)| *collection == query.collection)
                .map(|((_, id), data)| Document::new(id.clone(), data.clone()))
                .collect())
        }

        async fn add(&self, collection: &str, data: Value) -> Result<String, DomainError> {
            let id = format!("doc-{}", self.docs.lock().unwrap().len() + 1);
            self.docs
                .lock()
                .unwrap()
                .insert((collection.into(), id.clone()), data);
            let _ = self.changes.send(ChangeNotice {
                collection: collection.into(),
            });
            Ok(id)
        }

        async fn update(&self, _: &str, _: &str, _: Value) -> Result<(), DomainError> {
            Ok(())
        }

        async fn delete(&self, _: &str, _: &str) -> Result<(), DomainError> {
            Ok(())
        }

        fn watch(&self) -> broadcast::Receiver<ChangeNotice> {
            self.changes.subscribe()
        }
    }

    async fn next_snapshot(rx: &mut mpsc::UnboundedReceiver<usize>) -> usize {
        tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("snapshot not delivered in time")
            .expect("subscription closed")
    }

    #[tokio::test]
    async fn test_subscribe_delivers_initial_and_follow_up_snapshots() {
        // Arrange
        let store = Arc::new(MockStore::new());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _subscription = subscribe(
            store.clone(),
            Query::collection("categories"),
            move |docs| {
                let _ = tx.send(docs.len());
            },
        );

        // Act / Assert
        assert_eq!(next_snapshot(&mut rx).await, 0);

        store
            .add("categories", json!({ "name": "Drinks" }))
            .await
            .unwrap();
        assert_eq!(next_snapshot(&mut rx).await, 1);
    }

    #[tokio::test]
    async fn test_subscribe_ignores_other_collections() {
        // Arrange
        let store = Arc::new(MockStore::new());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _subscription = subscribe(
            store.clone(),
            Query::collection("categories"),
            move |docs| {
                let _ = tx.send(docs.len());
            },
        );
        assert_eq!(next_snapshot(&mut rx).await, 0);

        // Act
        store.add("products", json!({ "name": "Cola" })).await.unwrap();
        store
            .add("categories", json!({ "name": "Drinks" }))
            .await
            .unwrap();

        // Assert: only the categories write produced a snapshot.
        assert_eq!(next_snapshot(&mut rx).await, 1);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_dropping_subscription_stops_delivery() {
        // Arrange
        let store = Arc::new(MockStore::new());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let subscription = subscribe(
            store.clone(),
            Query::collection("categories"),
            move |docs| {
                let _ = tx.send(docs.len());
            },
        );
        assert_eq!(next_snapshot(&mut rx).await, 0);

        // Act
        drop(subscription);
        store
            .add("categories", json!({ "name": "Drinks" }))
            .await
            .unwrap();

        // Assert: the callback (and its sender) is gone with the task.
        let next = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap();
        assert!(next.is_none());
    }
}
