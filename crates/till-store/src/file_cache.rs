//! File-backed local cache.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use till_core::cache::LocalCache;
use till_core::error::DomainError;

/// Stores each entry as `<dir>/<key>.json`. Writes go to a temporary file
/// first and are renamed into place so a crash never leaves half an entry.
#[derive(Debug, Clone)]
pub struct JsonFileCache {
    dir: PathBuf,
}

impl JsonFileCache {
    /// Opens (and creates if needed) a cache rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Cache` if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            DomainError::Cache(format!("cannot create cache dir {}: {e}", dir.display()))
        })?;
        Ok(Self { dir })
    }

    /// The directory entries are stored in.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> Result<PathBuf, DomainError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(DomainError::Cache(format!("invalid cache key `{key}`")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl LocalCache for JsonFileCache {
    fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        let path = self.entry_path(key)?;
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DomainError::Cache(format!(
                "cannot read {}: {e}",
                path.display()
            ))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), DomainError> {
        let path = self.entry_path(key)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)
            .and_then(|()| fs::rename(&tmp, &path))
            .map_err(|e| DomainError::Cache(format!("cannot write {}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "till-cache-{name}-{}",
            uuid::Uuid::new_v4().simple()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_open_creates_directory() {
        let dir = scratch_dir("open");

        let cache = JsonFileCache::open(&dir).unwrap();

        assert!(cache.dir().is_dir());
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_get_missing_entry_returns_none() {
        let dir = scratch_dir("missing");
        let cache = JsonFileCache::open(&dir).unwrap();

        assert_eq!(cache.get("categories").unwrap(), None);
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_set_then_get_survives_reopen() {
        // Arrange
        let dir = scratch_dir("reopen");
        let cache = JsonFileCache::open(&dir).unwrap();

        // Act
        cache
            .set("cashier_products", r#"[{"id":"p1","name":"Tea"}]"#)
            .unwrap();
        let reopened = JsonFileCache::open(&dir).unwrap();

        // Assert
        assert_eq!(
            reopened.get("cashier_products").unwrap().as_deref(),
            Some(r#"[{"id":"p1","name":"Tea"}]"#)
        );
        assert!(dir.join("cashier_products.json").is_file());
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let dir = scratch_dir("keys");
        let cache = JsonFileCache::open(&dir).unwrap();

        let result = cache.set("../escape", "[]");

        assert!(matches!(result, Err(DomainError::Cache(_))));
        fs::remove_dir_all(dir).unwrap();
    }
}
