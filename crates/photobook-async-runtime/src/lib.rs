use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

// Re-export types from library crates
pub use photobook_layout::{LayerItem, ObjectId, PhotoSaveOutcome, SpreadMeta, Theme};

/// Commands sent from UI to worker
///
/// Scripts carry one command per line as JSON, e.g.
/// `{"command":"goto_spread","index":3}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum EditorCommand {
    AddImage {
        path: PathBuf,
    },
    AddText {
        text: String,
    },
    MoveObject {
        id: ObjectId,
        left: f32,
        top: f32,
    },
    ScaleObject {
        id: ObjectId,
        scale_x: f32,
        scale_y: f32,
        /// Lock the aspect ratio (scale_y follows scale_x)
        #[serde(default)]
        uniform: bool,
    },
    RemoveObject {
        id: ObjectId,
    },
    Clear,
    SetTextColor {
        id: ObjectId,
        color: String,
    },
    Undo,
    Redo,
    MoveLayer {
        id: ObjectId,
        index: usize,
    },
    Save,
    GotoSpread {
        index: usize,
    },
    NextSpread,
    PrevSpread,
    AddSpread,
    ReorderSpreads {
        from: usize,
        to: usize,
    },
    DeleteSpread {
        index: usize,
    },
    SetZoom {
        zoom: f32,
    },
    ZoomIn,
    ZoomOut,
    ZoomReset,
    Resize {
        width: f32,
        height: f32,
    },
    SetTheme {
        theme: Theme,
    },
    ListSpreads,
}

/// Updates sent from worker to UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "update", rename_all = "snake_case")]
pub enum EditorUpdate {
    SpreadChanged {
        index: usize,
        label: String,
    },
    Layers {
        layers: Vec<LayerItem>,
    },
    SavedSpreads {
        spreads: Vec<SpreadMeta>,
    },
    Zoom {
        zoom: f32,
    },
    ImageAdded {
        id: ObjectId,
        /// False when the image was kept inline in the photo tray
        blob_stored: bool,
        /// None when the photo tray could not be saved
        tray: Option<PhotoSaveOutcome>,
    },
    TextAdded {
        id: ObjectId,
    },
    Saved {
        index: usize,
    },
    Notice {
        message: String,
    },
    Error {
        message: String,
    },
}

pub type CommandSender = mpsc::UnboundedSender<EditorCommand>;
pub type CommandReceiver = mpsc::UnboundedReceiver<EditorCommand>;
pub type UpdateSender = mpsc::UnboundedSender<EditorUpdate>;
pub type UpdateReceiver = mpsc::UnboundedReceiver<EditorUpdate>;

/// Command and update channels between a front end and the worker
pub fn channels() -> ((CommandSender, CommandReceiver), (UpdateSender, UpdateReceiver)) {
    (mpsc::unbounded_channel(), mpsc::unbounded_channel())
}
