use std::path::{Path, PathBuf};

use crate::{validate_key, BlobStore, StoreError};

/// Stores each blob as `<dir>/<key>.json`.
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// reader never observes a half-written blob.
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    /// The directory is created lazily on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn blob_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

impl BlobStore for FileBlobStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        validate_key(key)?;
        let path = self.blob_path(key);

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(&path, e)),
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| StoreError::Serialize {
                key: key.to_owned(),
                source,
            })
    }

    async fn put(&self, key: &str, value: serde_json::Value) -> Result<(), StoreError> {
        validate_key(key)?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_error(&self.dir, e))?;

        let body = serde_json::to_vec_pretty(&value).map_err(|source| StoreError::Serialize {
            key: key.to_owned(),
            source,
        })?;

        let path = self.blob_path(key);
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        tokio::fs::write(&tmp, body)
            .await
            .map_err(|e| io_error(&tmp, e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| io_error(&path, e))?;

        tracing::debug!(path = %path.display(), "blob written");
        Ok(())
    }
}
