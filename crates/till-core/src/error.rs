//! Domain error types.

use thiserror::Error;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A document was not found in its collection.
    #[error("document not found: {collection}/{id}")]
    DocumentNotFound {
        /// The collection that was searched.
        collection: String,
        /// The missing document identifier.
        id: String,
    },

    /// A stored document does not have the expected shape.
    #[error("malformed document {collection}/{id}: {reason}")]
    MalformedDocument {
        /// The collection the document belongs to.
        collection: String,
        /// The offending document identifier.
        id: String,
        /// What failed to decode.
        reason: String,
    },

    /// A validation error in domain logic.
    #[error("validation error: {0}")]
    Validation(String),

    /// The local cache could not be read or written.
    #[error("cache error: {0}")]
    Cache(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl DomainError {
    /// Convenience constructor for `DocumentNotFound`.
    #[must_use]
    pub fn not_found(collection: &str, id: &str) -> Self {
        Self::DocumentNotFound {
            collection: collection.to_owned(),
            id: id.to_owned(),
        }
    }
}
