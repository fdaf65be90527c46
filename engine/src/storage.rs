//! The storage collaborator.
//!
//! The host owns persistence; the engine sees it as a byte-oriented
//! key/value interface. Keys are flat strings with `/`-separated
//! namespaces (`config`, `projects/<name>`, `dsn/<project>/<label>`), and
//! per-key puts are last-write-wins. [`MemoryStorage`] is the in-process
//! implementation used in tests and for embedding.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Errors surfaced by the storage layer or the JSON codec on top of it.
#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("failed to encode record at {key}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to decode record at {key}: {source}")]
    Deserialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Key/value persistence as provided by the host.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Returns the raw value at `key`, or `None` if absent.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Stores `value` at `key`, overwriting any previous value.
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

    /// Removes `key`. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Lists keys under `prefix`, prefix-stripped, in sorted order.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError>;
}

/// Loads and decodes the JSON record at `key`.
pub async fn get_json<T: DeserializeOwned>(
    storage: &dyn Storage,
    key: &str,
) -> Result<Option<T>, StorageError> {
    match storage.get(key).await? {
        Some(raw) => serde_json::from_slice(&raw)
            .map(Some)
            .map_err(|source| StorageError::Deserialize {
                key: key.to_string(),
                source,
            }),
        None => Ok(None),
    }
}

/// Encodes `value` as JSON and stores it at `key`.
pub async fn put_json<T: Serialize>(
    storage: &dyn Storage,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_vec(value).map_err(|source| StorageError::Serialize {
        key: key.to_string(),
        source,
    })?;
    storage.put(key, raw).await
}

/// In-memory [`Storage`] backed by a `BTreeMap`.
///
/// Clones share the same underlying map, so a test can hand a clone to the
/// backend and inspect stored bytes through another.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    data: Arc<RwLock<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.data.read().get(key).cloned())
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        self.data.write().insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.data.write().remove(key);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        // BTreeMap iteration is already sorted.
        let keys = self
            .data
            .read()
            .keys()
            .filter_map(|key| key.strip_prefix(prefix))
            .map(str::to_string)
            .collect();
        Ok(keys)
    }
}
