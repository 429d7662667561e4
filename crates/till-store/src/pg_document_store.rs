//! `PostgreSQL` implementation of the `DocumentStore` trait.
//!
//! Documents are rows of the `documents` table keyed by `(collection, id)`
//! with a JSONB body. Every committed write issues `pg_notify` on
//! [`CHANGE_CHANNEL`] with the collection name as payload; [`PgDocumentStore::listen`]
//! relays those notifications to local watchers.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgListener, PgPool};
use sqlx::{Postgres, Transaction};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use uuid::Uuid;

use till_core::document::{ChangeNotice, Direction, Document, DocumentStore, OrderKey, Query};
use till_core::error::DomainError;

/// Notification channel carrying collection names of changed documents.
pub const CHANGE_CHANNEL: &str = "document_changes";

const CHANGE_CHANNEL_CAPACITY: usize = 256;
const LISTENER_RETRY_DELAY: Duration = Duration::from_secs(1);

fn infrastructure(e: sqlx::Error) -> DomainError {
    DomainError::Infrastructure(e.to_string())
}

/// PostgreSQL-backed document store.
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
    changes: broadcast::Sender<ChangeNotice>,
}

impl PgDocumentStore {
    /// Creates a new `PgDocumentStore`. Watchers receive nothing until
    /// [`listen`](Self::listen) has been started.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self { pool, changes }
    }

    /// Applies the bundled migrations.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if a migration fails.
    pub async fn migrate(&self) -> Result<(), DomainError> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DomainError::Infrastructure(format!("migration failed: {e}")))
    }

    /// Starts relaying `NOTIFY` messages to watchers. The returned task runs
    /// until aborted.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the listener connection
    /// cannot be established.
    pub async fn listen(&self) -> Result<JoinHandle<()>, DomainError> {
        let mut listener = PgListener::connect_with(&self.pool)
            .await
            .map_err(infrastructure)?;
        listener
            .listen(CHANGE_CHANNEL)
            .await
            .map_err(infrastructure)?;
        info!(channel = CHANGE_CHANNEL, "listening for document changes");

        let changes = self.changes.clone();
        Ok(tokio::spawn(async move {
            loop {
                match listener.recv().await {
                    Ok(notification) => {
                        let _ = changes.send(ChangeNotice {
                            collection: notification.payload().to_owned(),
                        });
                    }
                    Err(e) => {
                        // The listener reconnects on the next recv.
                        error!(error = %e, "document change listener failed");
                        tokio::time::sleep(LISTENER_RETRY_DELAY).await;
                    }
                }
            }
        }))
    }

    async fn notify(
        tx: &mut Transaction<'_, Postgres>,
        collection: &str,
    ) -> Result<(), DomainError> {
        sqlx::query("SELECT pg_notify($1, $2)")
            .bind(CHANGE_CHANNEL)
            .bind(collection)
            .execute(&mut **tx)
            .await
            .map_err(infrastructure)?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn query(&self, query: &Query) -> Result<Vec<Document>, DomainError> {
        let limit = query.limit.map(|l| i64::try_from(l).unwrap_or(i64::MAX));

        let rows: Vec<(String, Value)> = match &query.order_by {
            Some(order) => {
                let direction = match order.direction {
                    Direction::Ascending => "ASC",
                    Direction::Descending => "DESC",
                };
                let sort_key = match order.key {
                    OrderKey::Value => format!("data -> $2 {direction}"),
                    OrderKey::Instant => {
                        format!("document_instant(data -> $2) {direction} NULLS LAST")
                    }
                };
                let sql = format!(
                    "SELECT id, data FROM documents \
                     WHERE collection = $1 AND data ? $2 \
                     ORDER BY {sort_key}, id {direction} \
                     LIMIT $3"
                );
                sqlx::query_as(&sql)
                    .bind(&query.collection)
                    .bind(&order.field)
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(infrastructure)?
            }
            None => sqlx::query_as(
                "SELECT id, data FROM documents WHERE collection = $1 ORDER BY id LIMIT $2",
            )
            .bind(&query.collection)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(infrastructure)?,
        };

        Ok(rows
            .into_iter()
            .map(|(id, data)| Document::new(id, data))
            .collect())
    }

    async fn add(&self, collection: &str, data: Value) -> Result<String, DomainError> {
        if !data.is_object() {
            return Err(DomainError::Validation(
                "document body must be a JSON object".into(),
            ));
        }
        let id = Uuid::new_v4().simple().to_string();

        let mut tx = self.pool.begin().await.map_err(infrastructure)?;
        sqlx::query("INSERT INTO documents (collection, id, data) VALUES ($1, $2, $3)")
            .bind(collection)
            .bind(&id)
            .bind(&data)
            .execute(&mut *tx)
            .await
            .map_err(infrastructure)?;
        Self::notify(&mut tx, collection).await?;
        tx.commit().await.map_err(infrastructure)?;

        debug!(collection, id = %id, "document added");
        Ok(id)
    }

    async fn update(&self, collection: &str, id: &str, data: Value) -> Result<(), DomainError> {
        if !data.is_object() {
            return Err(DomainError::Validation(
                "update body must be a JSON object".into(),
            ));
        }

        let mut tx = self.pool.begin().await.map_err(infrastructure)?;
        let result = sqlx::query(
            "UPDATE documents SET data = data || $3, updated_at = now() \
             WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .bind(&data)
        .execute(&mut *tx)
        .await
        .map_err(infrastructure)?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(collection, id));
        }
        Self::notify(&mut tx, collection).await?;
        tx.commit().await.map_err(infrastructure)?;

        debug!(collection, id, "document updated");
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(infrastructure)?;
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(infrastructure)?;
        if result.rows_affected() > 0 {
            Self::notify(&mut tx, collection).await?;
        }
        tx.commit().await.map_err(infrastructure)?;

        debug!(collection, id, "document deleted");
        Ok(())
    }

    fn watch(&self) -> broadcast::Receiver<ChangeNotice> {
        self.changes.subscribe()
    }
}
