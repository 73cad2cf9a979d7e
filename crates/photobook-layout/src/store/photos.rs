//! Photo tray: uploaded photos persisted next to the image blobs

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::constants::PHOTO_TRAY_SLOTS;

/// An uploaded photo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    pub name: String,
    /// Key of the image bytes in the blob store
    pub store_key: Option<String>,
    /// `data:` URL kept when the bytes could not be stored as a blob
    pub inline_data: Option<String>,
}

impl Photo {
    pub fn stored(name: impl Into<String>, store_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            store_key: Some(store_key.into()),
            inline_data: None,
        }
    }

    pub fn inline(name: impl Into<String>, mime: &str, bytes: &[u8]) -> Self {
        Self {
            name: name.into(),
            store_key: None,
            inline_data: Some(data_url(mime, bytes)),
        }
    }
}

/// Photo slots; an empty slot is None.
///
/// Holds at most [`PHOTO_TRAY_SLOTS`] slots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhotoTray {
    pub slots: Vec<Option<Photo>>,
}

impl PhotoTray {
    /// Put `photo` in the first empty slot, appending one while the tray has
    /// room. A full tray drops its oldest slot. Returns the slot index.
    pub fn push(&mut self, photo: Photo) -> usize {
        if let Some(index) = self.slots.iter().position(Option::is_none) {
            self.slots[index] = Some(photo);
            return index;
        }
        while self.slots.len() >= PHOTO_TRAY_SLOTS {
            let dropped = self.slots.remove(0);
            if let Some(old) = dropped {
                log::debug!("Photo tray full, dropping {}", old.name);
            }
        }
        self.slots.push(Some(photo));
        self.slots.len() - 1
    }

    /// Empty every slot that carries inline data. Returns how many were emptied.
    pub fn strip_inline_data(&mut self) -> usize {
        let mut stripped = 0;
        for slot in &mut self.slots {
            if slot.as_ref().is_some_and(|p| p.inline_data.is_some()) {
                *slot = None;
                stripped += 1;
            }
        }
        stripped
    }

    pub fn filled(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

/// How a photo tray save went
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhotoSaveOutcome {
    Saved,
    /// Saved after emptying slots with inline data
    Degraded { stripped: usize },
}

pub fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}
