use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::{validate_key, BlobStore, StoreError};

/// In-process store; contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, serde_json::Value>>,
}

impl MemoryBlobStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryBlobStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        validate_key(key)?;
        Ok(self.blobs.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: serde_json::Value) -> Result<(), StoreError> {
        validate_key(key)?;
        self.blobs.write().await.insert(key.to_owned(), value);
        Ok(())
    }
}
