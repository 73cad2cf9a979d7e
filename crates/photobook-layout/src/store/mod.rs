//! Per-spread persistence
//!
//! Spread records live in the blob store under `spread_<index>`; a small
//! metadata index in the key-value store lists saved spreads without
//! loading their objects. Image bytes and the photo tray share the image
//! collection.

mod backend;
mod fs;
mod photos;
mod record;

pub use backend::{BlobStore, Collection, KeyValueStore, MemoryStore, Storage};
pub use fs::FsStore;
pub use photos::{Photo, PhotoSaveOutcome, PhotoTray, data_url};
pub use record::{SpreadMeta, SpreadMetadataIndex, SpreadRecord};

use chrono::Utc;
use tokio::task::JoinSet;

use crate::book::Book;
use crate::constants::{METADATA_INDEX_KEY, PHOTO_TRAY_KEY, PREFERENCES_KEY, spread_key};
use crate::options::Preferences;
use crate::scene::DrawableObject;
use crate::types::*;

/// What a reorder wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderReport {
    pub from: usize,
    pub to: usize,
    /// Keys whose write or delete failed; earlier writes are not rolled back
    pub failed_keys: Vec<String>,
}

impl ReorderReport {
    pub fn is_complete(&self) -> bool {
        self.failed_keys.is_empty()
    }
}

pub struct SpreadStore<S: Storage> {
    backend: S,
    metadata: SpreadMetadataIndex,
}

impl<S: Storage> SpreadStore<S> {
    /// Wrap a backend and read the metadata index
    pub async fn open(backend: S) -> Result<Self> {
        let metadata = match backend.get_item(METADATA_INDEX_KEY).await? {
            Some(json) => SpreadMetadataIndex::from_json(&json).unwrap_or_else(|e| {
                log::warn!("Ignoring unreadable spread metadata index: {e}");
                SpreadMetadataIndex::default()
            }),
            None => SpreadMetadataIndex::default(),
        };
        log::debug!("Opened spread store with {} saved spreads", metadata.len());
        Ok(Self { backend, metadata })
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn metadata(&self) -> &SpreadMetadataIndex {
        &self.metadata
    }

    /// Saved spreads ordered by index, for the thumbnail strip
    pub fn saved_spreads(&self) -> Vec<SpreadMeta> {
        self.metadata.list()
    }

    /// Overwrite the record of a spread and refresh its metadata entry
    pub async fn save(
        &mut self,
        spread_index: usize,
        page_range: Option<PageRange>,
        objects: &[DrawableObject],
    ) -> Result<SpreadMeta> {
        let record = SpreadRecord {
            spread_index,
            page_range,
            saved_at: Utc::now(),
            objects: objects.to_vec(),
        };
        let key = record.key();
        let json = serde_json::to_vec(&record)?;
        self.backend.put(Collection::Spreads, &key, json).await?;

        let meta = record.meta();
        self.metadata.insert(meta.clone());
        self.persist_metadata().await?;
        log::debug!("Saved {key} with {} objects", objects.len());
        Ok(meta)
    }

    /// Ok(None) when nothing was saved for the spread
    pub async fn load(&self, spread_index: usize) -> Result<Option<SpreadRecord>> {
        let key = spread_key(spread_index);
        match self.backend.get(Collection::Spreads, &key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Remove a record and its metadata entry
    pub async fn delete(&mut self, spread_index: usize) -> Result<()> {
        let key = spread_key(spread_index);
        self.backend.delete(Collection::Spreads, &key).await?;
        if self.metadata.remove(&key).is_some() {
            self.persist_metadata().await?;
        }
        Ok(())
    }

    /// Move the content spread at `from` to position `to`.
    ///
    /// Spreads 0 and 1 never move. All content records are loaded in
    /// parallel, rearranged, and written back under sequential keys. A
    /// failed write is logged and skipped; the metadata index is rebuilt
    /// from the new arrangement and written once at the end.
    ///
    /// Two reorders must not run concurrently against the same backend.
    pub async fn reorder(&mut self, from: usize, to: usize, book: &Book) -> Result<ReorderReport> {
        if from <= 1 || to <= 1 {
            return Err(LayoutError::ProtectedSpread(from.min(to)));
        }
        let count = book.spread_count();
        for index in [from, to] {
            if index > count {
                return Err(LayoutError::SpreadOutOfRange { index, count });
            }
        }
        let mut report = ReorderReport {
            from,
            to,
            failed_keys: Vec::new(),
        };
        if from == to {
            return Ok(report);
        }

        let mut records = self.load_content_records(count).await?;
        let moved = records.remove(from - 1);
        records.insert(to - 1, moved);

        let mut metadata = SpreadMetadataIndex::default();
        if let Some(cover) = self.metadata.get(&spread_key(0)) {
            metadata.insert(cover.clone());
        }

        for (position, record) in records.into_iter().enumerate() {
            let index = position + 1;
            let key = spread_key(index);
            let written = match record {
                Some(mut record) => {
                    record.spread_index = index;
                    record.page_range = book.page_range(index);
                    metadata.insert(record.meta());
                    self.write_record(&key, &record).await
                }
                None => self.backend.delete(Collection::Spreads, &key).await,
            };
            if let Err(e) = written {
                log::warn!("Reorder could not rewrite {key}: {e}");
                report.failed_keys.push(key);
            }
        }

        self.metadata = metadata;
        self.persist_metadata().await?;
        log::debug!(
            "Moved spread {from} to {to} ({} failed writes)",
            report.failed_keys.len()
        );
        Ok(report)
    }

    /// Content records `1..=count` by position; unreadable records count as empty
    async fn load_content_records(&self, count: usize) -> Result<Vec<Option<SpreadRecord>>> {
        let mut tasks = JoinSet::new();
        for index in 1..=count {
            let backend = self.backend.clone();
            tasks.spawn(async move {
                let key = spread_key(index);
                let raw = backend.get(Collection::Spreads, &key).await;
                (index, raw)
            });
        }

        let mut records = vec![None; count];
        while let Some(joined) = tasks.join_next().await {
            let (index, raw) = joined?;
            records[index - 1] = match raw? {
                Some(bytes) => match serde_json::from_slice::<SpreadRecord>(&bytes) {
                    Ok(record) => Some(record),
                    Err(e) => {
                        log::warn!("Treating malformed {} as empty: {e}", spread_key(index));
                        None
                    }
                },
                None => None,
            };
        }
        Ok(records)
    }

    async fn write_record(&self, key: &str, record: &SpreadRecord) -> Result<()> {
        let json = serde_json::to_vec(record)?;
        self.backend.put(Collection::Spreads, key, json).await
    }

    async fn persist_metadata(&self) -> Result<()> {
        self.backend
            .set_item(METADATA_INDEX_KEY, self.metadata.to_json()?)
            .await
    }

    pub async fn put_image(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        self.backend.put(Collection::Images, key, bytes).await
    }

    pub async fn get_image(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.backend.get(Collection::Images, key).await
    }

    /// Save the photo tray, degrading once when the image store is full.
    ///
    /// On a quota error, slots holding inline data are emptied in `tray` and
    /// the write is retried once. A second failure is returned to the caller.
    pub async fn save_photo_tray(&self, tray: &mut PhotoTray) -> Result<PhotoSaveOutcome> {
        match self.write_photo_tray(tray).await {
            Ok(()) => Ok(PhotoSaveOutcome::Saved),
            Err(e) if e.is_quota_exceeded() => {
                log::warn!("Image storage full, retrying photo tray without inline data");
                let stripped = tray.strip_inline_data();
                match self.write_photo_tray(tray).await {
                    Ok(()) => Ok(PhotoSaveOutcome::Degraded { stripped }),
                    Err(e) => {
                        log::error!("Photo tray save abandoned: {e}");
                        Err(e)
                    }
                }
            }
            Err(e) => Err(e),
        }
    }

    async fn write_photo_tray(&self, tray: &PhotoTray) -> Result<()> {
        let json = serde_json::to_vec(tray)?;
        self.backend.put(Collection::Images, PHOTO_TRAY_KEY, json).await
    }

    pub async fn load_photo_tray(&self) -> Result<PhotoTray> {
        match self.backend.get(Collection::Images, PHOTO_TRAY_KEY).await? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(PhotoTray::default()),
        }
    }

    pub async fn load_preferences(&self) -> Result<Option<Preferences>> {
        match self.backend.get_item(PREFERENCES_KEY).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    pub async fn save_preferences(&self, preferences: &Preferences) -> Result<()> {
        self.backend
            .set_item(PREFERENCES_KEY, serde_json::to_string(preferences)?)
            .await
    }
}
