//! Project-directory storage backend
//!
//! Layout under the project root:
//! - `images/<key>` raw image blobs and the photo tray
//! - `spreads/<key>.json` spread records
//! - `state/<key>.json` key-value entries

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::types::*;

use super::backend::{BlobStore, Collection, KeyValueStore};

#[derive(Debug, Clone)]
pub struct FsStore {
    root: Arc<PathBuf>,
    image_quota: Option<u64>,
}

impl FsStore {
    /// Open (and create if needed) a project directory
    pub async fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_owned();
        for dir in [Collection::Images.name(), Collection::Spreads.name(), "state"] {
            tokio::fs::create_dir_all(root.join(dir)).await?;
        }
        Ok(Self {
            root: Arc::new(root),
            image_quota: None,
        })
    }

    /// Cap the total size of the image collection in bytes
    pub fn with_image_quota(mut self, bytes: u64) -> Self {
        self.image_quota = Some(bytes);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_path(&self, collection: Collection, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        let dir = self.root.join(collection.name());
        Ok(match collection {
            Collection::Images => dir.join(key),
            Collection::Spreads => dir.join(format!("{key}.json")),
        })
    }

    fn item_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join("state").join(format!("{key}.json")))
    }

    async fn collection_usage(&self, collection: Collection, except: &Path) -> Result<u64> {
        let mut total = 0;
        let mut entries = tokio::fs::read_dir(self.root.join(collection.name())).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.path() == except {
                continue;
            }
            let metadata = entry.metadata().await?;
            if metadata.is_file() {
                total += metadata.len();
            }
        }
        Ok(total)
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
        return Err(LayoutError::Storage(format!("invalid storage key: {key:?}")));
    }
    Ok(())
}

fn map_write_error(err: std::io::Error, collection: &str, key: &str) -> LayoutError {
    if err.kind() == ErrorKind::StorageFull {
        LayoutError::QuotaExceeded {
            collection: collection.to_string(),
            key: key.to_string(),
        }
    } else {
        LayoutError::Io(err)
    }
}

async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn remove_optional(path: &Path) -> Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

impl BlobStore for FsStore {
    async fn put(&self, collection: Collection, key: &str, value: Vec<u8>) -> Result<()> {
        let path = self.blob_path(collection, key)?;
        if let (Collection::Images, Some(quota)) = (collection, self.image_quota) {
            let used = self.collection_usage(collection, &path).await?;
            if used + value.len() as u64 > quota {
                return Err(LayoutError::QuotaExceeded {
                    collection: collection.to_string(),
                    key: key.to_string(),
                });
            }
        }
        tokio::fs::write(&path, value)
            .await
            .map_err(|e| map_write_error(e, collection.name(), key))
    }

    async fn get(&self, collection: Collection, key: &str) -> Result<Option<Vec<u8>>> {
        read_optional(&self.blob_path(collection, key)?).await
    }

    async fn delete(&self, collection: Collection, key: &str) -> Result<()> {
        remove_optional(&self.blob_path(collection, key)?).await
    }
}

impl KeyValueStore for FsStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        match read_optional(&self.item_path(key)?).await? {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| LayoutError::Storage(format!("state entry {key} is not UTF-8: {e}"))),
            None => Ok(None),
        }
    }

    async fn set_item(&self, key: &str, value: String) -> Result<()> {
        let path = self.item_path(key)?;
        tokio::fs::write(&path, value)
            .await
            .map_err(|e| map_write_error(e, "state", key))
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        remove_optional(&self.item_path(key)?).await
    }
}
