//! Key/value blob storage for scrape results.
//!
//! Values are opaque JSON documents addressed by a short key. The scraper
//! persists exactly one blob (the last successful order scrape) and reads it
//! back when nothing is cached in memory.

mod error;
mod file;
mod memory;

use std::future::Future;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub use error::StoreError;
pub use file::FileBlobStore;
pub use memory::MemoryBlobStore;

/// Storage backend for JSON blobs.
///
/// `put` overwrites any previous value under the same key.
pub trait BlobStore: Send + Sync {
    fn get(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<serde_json::Value>, StoreError>> + Send;

    fn put(
        &self,
        key: &str,
        value: serde_json::Value,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Reads and deserializes the blob under `key`.
///
/// # Errors
///
/// Returns [`StoreError::Serialize`] when the stored blob does not match `T`,
/// or any backend error.
pub async fn get_json<T, B>(store: &B, key: &str) -> Result<Option<T>, StoreError>
where
    T: DeserializeOwned,
    B: BlobStore,
{
    match store.get(key).await? {
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|source| StoreError::Serialize {
                key: key.to_owned(),
                source,
            }),
        None => Ok(None),
    }
}

/// Serializes `value` and stores it under `key`.
///
/// # Errors
///
/// Returns [`StoreError::Serialize`] when `value` cannot be represented as
/// JSON, or any backend error.
pub async fn put_json<T, B>(store: &B, key: &str, value: &T) -> Result<(), StoreError>
where
    T: Serialize,
    B: BlobStore,
{
    let json = serde_json::to_value(value).map_err(|source| StoreError::Serialize {
        key: key.to_owned(),
        source,
    })?;
    store.put(key, json).await
}

/// Keys double as file names, so they are limited to `[A-Za-z0-9_-]+`.
pub(crate) fn validate_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_keys() {
        assert!(validate_key("orderHistory").is_ok());
        assert!(validate_key("order_history-2").is_ok());
    }

    #[test]
    fn rejects_path_like_keys() {
        for key in ["", "../etc", "a/b", "a.json", "spaced key"] {
            assert!(
                matches!(validate_key(key), Err(StoreError::InvalidKey(_))),
                "expected InvalidKey for {key:?}"
            );
        }
    }
}
