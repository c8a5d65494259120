//! Key-Value Store Port - best-effort persistence of learner progress.
//!
//! The simulation engine treats this port as fallible and non-critical:
//! a failed save is logged and the in-memory state remains authoritative.

use async_trait::async_trait;

/// Errors that can occur during key-value storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to serialize value for key '{key}': {message}")]
    Serialization { key: String, message: String },

    #[error("Failed to deserialize value for key '{key}': {message}")]
    Deserialization { key: String, message: String },

    #[error("Invalid storage key: '{0}'")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    Io(String),
}

/// Port for storing JSON documents under string keys.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Load the value stored under `key`.
    ///
    /// # Returns
    /// `Ok(None)` if nothing has been stored yet
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: serde_json::Value) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn KeyValueStore) {}

    #[test]
    fn storage_error_messages_name_the_key() {
        let err = StorageError::Deserialization {
            key: "simulation_progress".to_string(),
            message: "expected value".to_string(),
        };
        assert!(err.to_string().contains("simulation_progress"));
        assert!(err.to_string().contains("deserialize"));
    }

    #[test]
    fn io_error_message() {
        let err = StorageError::Io("disk full".to_string());
        assert_eq!(err.to_string(), "IO error: disk full");
    }
}
