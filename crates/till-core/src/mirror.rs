//! Cached live collections.
//!
//! A `CollectionMirror` keeps an in-process copy of one live query result.
//! It starts from whatever the local cache holds, then replaces its contents
//! wholesale with every snapshot the store delivers and writes each new
//! snapshot back to the cache.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::cache::{self, LocalCache};
use crate::document::{Document, DocumentStore, Query};
use crate::error::DomainError;
use crate::listener::{self, SnapshotSubscription};

#[derive(Debug)]
struct MirrorState<T> {
    items: RwLock<Vec<T>>,
    synced: AtomicBool,
}

/// In-process copy of a live query, backed by a local cache entry.
pub struct CollectionMirror<T> {
    query: Query,
    cache_key: String,
    cache: Arc<dyn LocalCache>,
    state: Arc<MirrorState<T>>,
    subscription: Mutex<Option<SnapshotSubscription>>,
}

impl<T> std::fmt::Debug for CollectionMirror<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionMirror")
            .field("query", &self.query)
            .field("cache_key", &self.cache_key)
            .finish_non_exhaustive()
    }
}

impl<T> CollectionMirror<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Creates a mirror for `query`, seeded from the cache entry `cache_key`.
    ///
    /// A missing or unreadable cache entry leaves the mirror empty.
    #[must_use]
    pub fn new(query: Query, cache_key: impl Into<String>, cache: Arc<dyn LocalCache>) -> Self {
        let cache_key = cache_key.into();
        let items = match cache::load_json::<Vec<T>>(cache.as_ref(), &cache_key) {
            Ok(Some(items)) => {
                debug!(cache_key = %cache_key, count = items.len(), "mirror seeded from cache");
                items
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(cache_key = %cache_key, error = %e, "ignoring unreadable cache entry");
                Vec::new()
            }
        };

        Self {
            query,
            cache_key,
            cache,
            state: Arc::new(MirrorState {
                items: RwLock::new(items),
                synced: AtomicBool::new(false),
            }),
            subscription: Mutex::new(None),
        }
    }

    /// The query this mirror follows.
    #[must_use]
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Returns a copy of the current items.
    #[must_use]
    pub fn items(&self) -> Vec<T> {
        self.state
            .items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns `true` once at least one live snapshot has been applied.
    #[must_use]
    pub fn is_synced(&self) -> bool {
        self.state.synced.load(Ordering::Acquire)
    }

    /// Returns `true` while a live subscription is running.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|s| !s.is_finished())
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

        let state = Arc::clone(&self.state);
        let cache = Arc::clone(&self.cache);
        let collection = self.query.collection.clone();
        let cache_key = self.cache_key.clone();

        *subscription = Some(listener::subscribe(
            store,
            self.query.clone(),
            move |documents| {
                apply_snapshot(&state, cache.as_ref(), &collection, &cache_key, &documents);
            },
        ));
        info!(collection = %self.query.collection, cache_key = %self.cache_key, "mirror started");
    }

    /// Stops following the store. The current items are kept.
    pub fn stop(&self) {
        let stopped = self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if stopped.is_some() {
            info!(collection = %self.query.collection, "mirror stopped");
        }
    }

    /// Runs the query once and applies the result as a snapshot.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the query fails; the items are left
    /// untouched in that case.
    pub async fn refresh(&self, store: &dyn DocumentStore) -> Result<(), DomainError> {
        let documents = store.query(&self.query).await?;
        apply_snapshot(
            &self.state,
            self.cache.as_ref(),
            &self.query.collection,
            &self.cache_key,
            &documents,
        );
        Ok(())
    }
}

fn apply_snapshot<T>(
    state: &MirrorState<T>,
    cache: &dyn LocalCache,
    collection: &str,
    cache_key: &str,
    documents: &[Document],
) where
    T: Serialize + DeserializeOwned,
{
    let items: Vec<T> = documents
        .iter()
        .filter_map(|doc| match doc.decode::<T>(collection) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(error = %e, "skipping malformed document");
                None
            }
        })
        .collect();

    if let Err(e) = cache::store_json(cache, cache_key, &items) {
        warn!(cache_key, error = %e, "failed to persist snapshot to cache");
    }

    *state.items.write().unwrap_or_else(PoisonError::into_inner) = items;
    state.synced.store(true, Ordering::Release);
}
