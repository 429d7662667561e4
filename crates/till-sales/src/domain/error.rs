//! Ingestion errors for sale records.

use thiserror::Error;

/// Why a sale document was rejected at the ingestion boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    /// The timestamp is neither an RFC 3339 string nor a
    /// `{ seconds, nanoseconds }` object describing a valid instant.
    #[error("sale {sale_id}: malformed timestamp {raw}")]
    MalformedTimestamp {
        /// The sale document identifier.
        sale_id: String,
        /// The offending value, as JSON.
        raw: String,
    },

    /// The document does not have the shape of a sale record.
    #[error("sale {sale_id}: malformed record: {reason}")]
    MalformedRecord {
        /// The sale document identifier.
        sale_id: String,
        /// What failed to decode.
        reason: String,
    },
}
