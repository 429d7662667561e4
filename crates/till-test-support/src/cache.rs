//! Test caches.

use till_core::cache::LocalCache;
use till_core::error::DomainError;

/// A cache whose reads find nothing and whose writes always fail. Useful for
/// checking that cache trouble never breaks a live view.
#[derive(Debug)]
pub struct FailingCache;

impl LocalCache for FailingCache {
    fn get(&self, _key: &str) -> Result<Option<String>, DomainError> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), DomainError> {
        Err(DomainError::Cache("disk full".into()))
    }
}
