mod book;
pub mod constants;
pub mod constraint;
mod editor;
mod history;
pub mod layers;
pub mod layout;
mod options;
pub mod scene;
pub mod store;
mod types;

pub use book::Book;
pub use editor::{AddImageReport, AutosaveDebounce, Editor, ImageSource};
pub use history::HistoryStack;
pub use layers::{LayerItem, LayerKind, layer_list};
pub use layout::{SpreadLayout, Viewport, layout_spread};
pub use options::*;
pub use scene::{DrawableObject, ObjectId, ObjectKind, Scene, Snapshot, Transform};
pub use store::{
    FsStore, MemoryStore, PhotoSaveOutcome, PhotoTray, ReorderReport, SpreadMeta, SpreadRecord,
    SpreadStore, Storage,
};
pub use types::*;
