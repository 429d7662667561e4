//! Till Store — concrete document stores and local caches.
//!
//! `InMemoryDocumentStore` serves tests and single-process deployments,
//! `PgDocumentStore` keeps documents as JSONB rows in PostgreSQL and relays
//! change notices through `LISTEN`/`NOTIFY`. The caches back the offline
//! copies that views render before their first live snapshot.

pub mod file_cache;
pub mod memory_cache;
pub mod memory_document_store;
pub mod ordering;
pub mod pg_document_store;
