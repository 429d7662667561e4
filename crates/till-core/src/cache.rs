//! Local key-value cache abstraction.
//!
//! Views persist the last snapshot they saw so the next start can render
//! before the first live snapshot arrives.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::DomainError;

/// A small string key-value store local to this process.
pub trait LocalCache: Send + Sync {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), DomainError>;
}

/// Reads and deserializes the JSON value stored under `key`.
///
/// # Errors
///
/// Returns `DomainError::Cache` if the cache read fails or the stored value
/// is not valid JSON for `T`.
pub fn load_json<T: DeserializeOwned>(
    cache: &dyn LocalCache,
    key: &str,
) -> Result<Option<T>, DomainError> {
    let Some(raw) = cache.get(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| DomainError::Cache(format!("cached value `{key}` is malformed: {e}")))
}

/// Serializes `value` as JSON and stores it under `key`.
///
/// # Errors
///
/// Returns `DomainError::Cache` if serialization or the cache write fails.
pub fn store_json<T: Serialize + ?Sized>(
    cache: &dyn LocalCache,
    key: &str,
    value: &T,
) -> Result<(), DomainError> {
    let raw = serde_json::to_string(value)
        .map_err(|e| DomainError::Cache(format!("cannot serialize `{key}`: {e}")))?;
    cache.set(key, &raw)
}
