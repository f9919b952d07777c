use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// The fixed set of record keys the app persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    UserProgress,
    QuizConfig,
    QuizResults,
}

impl StoreKey {
    pub const ALL: [StoreKey; 3] = [
        StoreKey::UserProgress,
        StoreKey::QuizConfig,
        StoreKey::QuizResults,
    ];

    /// Key as written to the backend.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StoreKey::UserProgress => "userProgress",
            StoreKey::QuizConfig => "quizConfig",
            StoreKey::QuizResults => "quizResults",
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key-value contract over opaque JSON records.
///
/// Each call is atomic for its single key; callers serialize multi-key work.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the record stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get(&self, key: StoreKey) -> Result<Option<Value>, StorageError>;

    /// Replace the record stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be written.
    async fn set(&self, key: StoreKey, value: Value) -> Result<(), StorageError>;

    /// Delete the record under `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn remove(&self, key: StoreKey) -> Result<(), StorageError>;
}

/// Simple in-memory store for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    records: Arc<Mutex<HashMap<StoreKey, Value>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: StoreKey) -> Result<Option<Value>, StorageError> {
        let guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&key).cloned())
    }

    async fn set(&self, key: StoreKey, value: Value) -> Result<(), StorageError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key, value);
        Ok(())
    }

    async fn remove(&self, key: StoreKey) -> Result<(), StorageError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(&key);
        Ok(())
    }
}

/// Typed access to a key-value backend behind a trait object for easy swapping.
#[derive(Clone)]
pub struct Storage {
    pub records: Arc<dyn KeyValueStore>,
}

impl Storage {
    #[must_use]
    pub fn new(records: Arc<dyn KeyValueStore>) -> Self {
        Self { records }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryStore::new()))
    }

    /// Load and deserialize the record under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored JSON does not match `T`,
    /// or any backend error.
    pub async fn load<T: DeserializeOwned>(&self, key: StoreKey) -> Result<Option<T>, StorageError> {
        match self.records.get(key).await? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| StorageError::Serialization(format!("{key}: {e}"))),
            None => Ok(None),
        }
    }

    /// Serialize `value` and write it under `key` as a full replacement.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if `value` cannot be encoded,
    /// or any backend error.
    pub async fn save<T: Serialize + ?Sized>(
        &self,
        key: StoreKey,
        value: &T,
    ) -> Result<(), StorageError> {
        let json = serde_json::to_value(value)
            .map_err(|e| StorageError::Serialization(format!("{key}: {e}")))?;
        self.records.set(key, json).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    pub async fn remove(&self, key: StoreKey) -> Result<(), StorageError> {
        self.records.remove(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Note {
        text: String,
    }

    #[tokio::test]
    async fn set_get_remove_round_trip() {
        let store = InMemoryStore::new();
        assert!(store.get(StoreKey::QuizConfig).await.unwrap().is_none());

        store
            .set(StoreKey::QuizConfig, json!({"questionCount": 5}))
            .await
            .unwrap();
        let value = store.get(StoreKey::QuizConfig).await.unwrap().unwrap();
        assert_eq!(value["questionCount"], 5);

        store.remove(StoreKey::QuizConfig).await.unwrap();
        assert!(store.get(StoreKey::QuizConfig).await.unwrap().is_none());
        store.remove(StoreKey::QuizConfig).await.unwrap();
    }

    #[tokio::test]
    async fn typed_load_reports_shape_mismatch() {
        let storage = Storage::in_memory();
        storage
            .records
            .set(StoreKey::QuizResults, json!({"unexpected": true}))
            .await
            .unwrap();

        let err = storage.load::<Note>(StoreKey::QuizResults).await.unwrap_err();
        assert!(matches!(err, StorageError::Serialization(msg) if msg.starts_with("quizResults")));
    }

    #[tokio::test]
    async fn typed_save_then_load() {
        let storage = Storage::in_memory();
        let note = Note { text: "hi".into() };
        storage.save(StoreKey::UserProgress, &note).await.unwrap();
        assert_eq!(
            storage.load::<Note>(StoreKey::UserProgress).await.unwrap(),
            Some(note)
        );
    }

    #[test]
    fn keys_use_wire_names() {
        let names: Vec<&str> = StoreKey::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(names, ["userProgress", "quizConfig", "quizResults"]);
    }
}
