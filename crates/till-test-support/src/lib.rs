//! Shared test mocks and utilities for the Till point-of-sale backend.

mod cache;
mod clock;
mod store;

pub use cache::FailingCache;
pub use clock::{FixedClock, at};
pub use store::{FailingDocumentStore, RecordedWrite, RecordingDocumentStore};
