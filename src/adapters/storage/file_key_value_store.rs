//! File-based Key-Value Store Adapter
//!
//! Stores each key as a pretty-printed JSON document `<key>.json` under a
//! base directory. Writes go through a temporary file and a rename so a
//! crash mid-write never leaves a truncated document behind.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::ports::{KeyValueStore, StorageError};

/// File-based storage for learner progress
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    base_path: PathBuf,
}

impl FileKeyValueStore {
    /// Create a new file store rooted at `base_path`
    ///
    /// The directory is created lazily on first write.
    ///
    /// # Example
    /// ```ignore
    /// let store = FileKeyValueStore::new("./data");
    /// ```
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Keys map to file names, so only a conservative character set is allowed.
    fn file_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.base_path.join(format!("{}.json", key)))
    }

    async fn ensure_dir(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StorageError> {
        let file_path = self.file_path(key)?;

        if !file_path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&file_path)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;

        let value = serde_json::from_str(&json).map_err(|e| StorageError::Deserialization {
            key: key.to_string(),
            message: e.to_string(),
        })?;

        Ok(Some(value))
    }

    async fn set(&self, key: &str, value: serde_json::Value) -> Result<(), StorageError> {
        let file_path = self.file_path(key)?;
        self.ensure_dir().await?;

        let json = serde_json::to_string_pretty(&value).map_err(|e| StorageError::Serialization {
            key: key.to_string(),
            message: e.to_string(),
        })?;

        let tmp_path = file_path.with_extension("json.tmp");
        fs::write(&tmp_path, json)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;
        fs::rename(&tmp_path, &file_path)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let file_path = self.file_path(key)?;

        if file_path.exists() {
            fs::remove_file(&file_path)
                .await
                .map_err(|e| StorageError::Io(e.to_string()))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn store() -> (FileKeyValueStore, TempDir) {
        let dir = TempDir::new().unwrap();
        (FileKeyValueStore::new(dir.path().join("progress")), dir)
    }

    #[tokio::test]
    async fn set_then_get_returns_value() {
        let (store, _dir) = store();
        let value = json!({"history": [], "metrics": {"sessions_completed": 0}});

        store.set("simulation_progress", value.clone()).await.unwrap();

        assert_eq!(store.get("simulation_progress").await.unwrap(), Some(value));
        assert!(store.base_path().join("simulation_progress.json").exists());
    }

    #[tokio::test]
    async fn missing_key_is_none() {
        let (store, _dir) = store();
        assert_eq!(store.get("nothing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_overwrites_previous_value() {
        let (store, _dir) = store();
        store.set("k", json!(1)).await.unwrap();
        store.set("k", json!(2)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(json!(2)));
    }

    #[tokio::test]
    async fn remove_deletes_and_tolerates_missing() {
        let (store, _dir) = store();
        store.set("k", json!(true)).await.unwrap();

        store.remove("k").await.unwrap();
        store.remove("k").await.unwrap();

        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn path_like_keys_are_rejected() {
        let (store, _dir) = store();
        let result = store.set("../escape", json!(1)).await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn corrupt_document_is_a_deserialization_error() {
        let (store, _dir) = store();
        store.set("k", json!(1)).await.unwrap();
        fs::write(store.base_path().join("k.json"), "{not json")
            .await
            .unwrap();

        let result = store.get("k").await;

        assert!(matches!(result, Err(StorageError::Deserialization { .. })));
    }
}
