//! Editing session over one book
//!
//! The editor owns the scene of the current spread, its undo history and
//! the autosave timer, and talks to the spread store. It is the boundary
//! towards the UI: store failures are logged and reported as `bool` or
//! status values instead of errors, so the session always stays usable.

mod autosave;
mod navigator;

pub use autosave::AutosaveDebounce;

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::book::Book;
use crate::constants::*;
use crate::history::HistoryStack;
use crate::layers::{self, LayerItem};
use crate::layout::{self, SpreadLayout, Viewport, layout_spread};
use crate::options::EditorOptions;
use crate::scene::{DrawableObject, ObjectId, RenderItem, Scene, Transform, is_valid_scale};
use crate::store::{Photo, PhotoSaveOutcome, PhotoTray, SpreadMeta, SpreadStore, Storage};
use crate::types::*;

static ID_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// `<prefix>_<millis>_<sequence>`, unique within the process
fn unique_key(prefix: &str) -> String {
    let seq = ID_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}_{}_{seq}", Utc::now().timestamp_millis())
}

/// Decoded image handed to [`Editor::add_image`]
#[derive(Debug, Clone)]
pub struct ImageSource {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Result of adding an image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddImageReport {
    pub id: ObjectId,
    /// False when the bytes were kept inline in the photo tray instead
    pub blob_stored: bool,
    /// None when the photo tray could not be saved at all
    pub tray: Option<PhotoSaveOutcome>,
}

pub struct Editor<S: Storage> {
    store: SpreadStore<S>,
    options: EditorOptions,
    book: Book,
    viewport: Viewport,
    current: usize,
    scene: Scene,
    history: HistoryStack,
    autosave: AutosaveDebounce,
    photos: PhotoTray,
}

impl<S: Storage> Editor<S> {
    /// Open a session on the cover spread.
    ///
    /// Stored preferences override the page count, zoom and theme of
    /// `options`. The cover's saved objects are loaded right away so the
    /// first save cannot overwrite them with an empty scene.
    pub async fn open(backend: S, mut options: EditorOptions, viewport: Viewport) -> Result<Self> {
        options.validate()?;
        let store = SpreadStore::open(backend).await?;

        match store.load_preferences().await {
            Ok(Some(preferences)) => options.apply_preferences(&preferences),
            Ok(None) => {}
            Err(e) => log::warn!("Ignoring unreadable preferences: {e}"),
        }
        let book = Book::new(options.total_pages)?;

        let photos = store.load_photo_tray().await.unwrap_or_else(|e| {
            log::warn!("Starting with an empty photo tray: {e}");
            PhotoTray::default()
        });

        let layout = compute_layout(&book, 0, viewport, &options)?;
        let mut editor = Self {
            store,
            history: HistoryStack::new(options.history_capacity),
            autosave: AutosaveDebounce::new(options.autosave_delay()),
            options,
            book,
            viewport,
            current: 0,
            scene: Scene::new(layout),
            photos,
        };
        editor.load_current().await;
        log::info!(
            "Opened book with {} pages ({} content spreads)",
            editor.book.total_pages(),
            editor.book.spread_count()
        );
        Ok(editor)
    }

    pub fn current_spread(&self) -> usize {
        self.current
    }

    pub fn spread_label(&self) -> String {
        self.book.spread_label(self.current)
    }

    pub fn book(&self) -> &Book {
        &self.book
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn layout(&self) -> &SpreadLayout {
        self.scene.layout()
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    pub fn store(&self) -> &SpreadStore<S> {
        &self.store
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn zoom(&self) -> f32 {
        self.options.zoom
    }

    pub fn theme(&self) -> Theme {
        self.options.theme
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    pub fn photo_tray(&self) -> &PhotoTray {
        &self.photos
    }

    pub fn layers(&self) -> Vec<LayerItem> {
        layers::layer_list(&self.scene)
    }

    pub fn saved_spreads(&self) -> Vec<SpreadMeta> {
        self.store.saved_spreads()
    }

    pub fn render_list(&self) -> Vec<RenderItem<'_>> {
        self.scene.render_list(self.options.theme)
    }

    /// When the pending autosave is due, if any
    pub fn autosave_deadline(&self) -> Option<Instant> {
        self.autosave.deadline()
    }

    /// Add an image at half scale in the middle of the canvas.
    ///
    /// On spread 1 the image goes to the middle of the right page. When the
    /// image blob cannot be stored the photo is kept inline in the photo
    /// tray; the object is added either way.
    pub async fn add_image(&mut self, source: ImageSource) -> AddImageReport {
        let ImageSource {
            name,
            mime,
            bytes,
            width,
            height,
        } = source;

        let key = unique_key("img");
        let (photo, store_key) = match self.store.put_image(&key, bytes.clone()).await {
            Ok(()) => (Photo::stored(name.clone(), key.clone()), Some(key)),
            Err(e) => {
                log::warn!("Keeping {name} inline, image store rejected it: {e}");
                (Photo::inline(name.clone(), &mime, &bytes), None)
            }
        };
        let blob_stored = store_key.is_some();
        self.photos.push(photo);
        let tray = match self.store.save_photo_tray(&mut self.photos).await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                log::error!("Could not save photo tray: {e}");
                None
            }
        };

        let (width, height) = (width.max(1) as f32, height.max(1) as f32);
        let (cx, cy) = self.insertion_center();
        let transform = Transform::at(
            cx - width * DEFAULT_IMAGE_SCALE / 2.0,
            cy - height * DEFAULT_IMAGE_SCALE / 2.0,
        )
        .with_scale(DEFAULT_IMAGE_SCALE);
        let id = ObjectId::new(unique_key("obj"));
        let obj = DrawableObject::image(id.clone(), transform, width, height, store_key, name);
        self.scene.place(obj);
        self.commit();

        AddImageReport {
            id,
            blob_stored,
            tray,
        }
    }

    /// Add a text block centred on the canvas (top-left of the right page on spread 1)
    pub fn add_text(&mut self, text: impl Into<String>) -> ObjectId {
        let fill = match self.options.theme {
            Theme::Light => TEXT_FILL_LIGHT,
            Theme::Dark => TEXT_FILL_DARK,
        };
        let id = ObjectId::new(unique_key("obj"));
        let mut obj = DrawableObject::text(
            id.clone(),
            Transform::at(0.0, 0.0),
            text,
            DEFAULT_FONT_SIZE,
            fill,
        );

        let layout = self.scene.layout();
        let (left, top) = if layout.spread.has_locked_page() {
            let right = layout.page(PageSide::Right).rect;
            (right.x + TEXT_PAGE_INSET_PX, right.y + TEXT_PAGE_INSET_PX)
        } else {
            let bounds = obj.bounding_box();
            (
                layout.center_x() - bounds.width / 2.0,
                layout.center_y() - bounds.height / 2.0,
            )
        };
        obj.set_position(left, top);
        self.scene.place(obj);
        self.commit();
        id
    }

    pub fn move_object(&mut self, id: &ObjectId, left: f32, top: f32) -> Result<()> {
        self.mutate(id, |obj| obj.set_position(left, top))
    }

    /// Scale an object; `uniform` forces the vertical scale to follow the horizontal one.
    ///
    /// Zero, negative and non-finite factors are rejected without touching the object.
    pub fn scale_object(&mut self, id: &ObjectId, scale_x: f32, scale_y: f32, uniform: bool) -> Result<()> {
        let scale_y = if uniform { scale_x } else { scale_y };
        if !is_valid_scale(scale_x) || !is_valid_scale(scale_y) {
            return Err(LayoutError::InvalidScale { scale_x, scale_y });
        }
        self.mutate(id, |obj| obj.set_scale(scale_x, scale_y, false))
    }

    pub fn remove_object(&mut self, id: &ObjectId) -> Result<DrawableObject> {
        let removed = self
            .scene
            .remove(id)
            .ok_or_else(|| LayoutError::ObjectNotFound(id.to_string()))?;
        self.commit();
        Ok(removed)
    }

    /// Remove every user object from the current spread
    pub fn clear(&mut self) {
        if self.scene.is_empty() {
            return;
        }
        self.scene.clear();
        self.commit();
    }

    /// Change the fill of a text object. Returns Ok(false) for images.
    pub fn set_text_color(&mut self, id: &ObjectId, color: &str) -> Result<bool> {
        let obj = self
            .scene
            .get_mut(id)
            .ok_or_else(|| LayoutError::ObjectNotFound(id.to_string()))?;
        if !obj.set_text_fill(color) {
            log::debug!("Ignoring colour change on image {id}");
            return Ok(false);
        }
        self.commit();
        Ok(true)
    }

    /// Change the stacking position of an object
    pub fn move_layer(&mut self, id: &ObjectId, new_index: usize) -> bool {
        if !layers::move_to_index(&mut self.scene, id, new_index) {
            return false;
        }
        self.commit();
        true
    }

    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo().cloned() else {
            return false;
        };
        self.scene.restore(&snapshot);
        self.autosave.schedule(Instant::now());
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo().cloned() else {
            return false;
        };
        self.scene.restore(&snapshot);
        self.autosave.schedule(Instant::now());
        true
    }

    /// Set the zoom factor (clamped) and store it as a preference
    pub async fn set_zoom(&mut self, zoom: f32) -> f32 {
        self.options.zoom = layout::clamp_zoom(zoom);
        self.relayout();
        self.save_preferences().await;
        self.options.zoom
    }

    pub async fn zoom_in(&mut self) -> f32 {
        self.set_zoom(layout::zoom_in(self.options.zoom)).await
    }

    pub async fn zoom_out(&mut self) -> f32 {
        self.set_zoom(layout::zoom_out(self.options.zoom)).await
    }

    pub async fn zoom_reset(&mut self) -> f32 {
        self.set_zoom(1.0).await
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.relayout();
    }

    pub async fn set_theme(&mut self, theme: Theme) {
        self.options.theme = theme;
        self.relayout();
        self.save_preferences().await;
    }

    /// Write the current spread. Returns false (and logs) on failure.
    pub async fn save(&mut self) -> bool {
        let page_range = self.book.page_range(self.current);
        match self
            .store
            .save(self.current, page_range, self.scene.objects())
            .await
        {
            Ok(_) => {
                self.autosave.clear();
                true
            }
            Err(e) => {
                log::warn!("Saving spread {} failed: {e}", self.current);
                false
            }
        }
    }

    /// Save when the autosave deadline has passed. None when nothing was due.
    pub async fn autosave_if_due(&mut self, now: Instant) -> Option<bool> {
        if !self.autosave.take_due(now) {
            return None;
        }
        Some(self.save().await)
    }

    /// Save a pending autosave right away
    pub async fn flush(&mut self) -> Option<bool> {
        if !self.autosave.is_pending() {
            return None;
        }
        Some(self.save().await)
    }

    /// Persist page count, zoom and theme
    pub async fn save_preferences(&self) -> bool {
        match self.store.save_preferences(&self.options.preferences()).await {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Saving preferences failed: {e}");
                false
            }
        }
    }

    fn mutate(&mut self, id: &ObjectId, f: impl FnOnce(&mut DrawableObject)) -> Result<()> {
        if !self.scene.modify(id, f) {
            return Err(LayoutError::ObjectNotFound(id.to_string()));
        }
        self.commit();
        Ok(())
    }

    /// Record a committed mutation and restart the autosave timer
    fn commit(&mut self) {
        self.history.push(self.scene.snapshot());
        self.autosave.schedule(Instant::now());
    }

    fn insertion_center(&self) -> (f32, f32) {
        let layout = self.scene.layout();
        if layout.spread.has_locked_page() {
            let right = layout.page(PageSide::Right).rect;
            (right.center_x(), right.center_y())
        } else {
            (layout.center_x(), layout.center_y())
        }
    }

    /// Recompute geometry for the current spread and re-clip every object
    fn relayout(&mut self) {
        match compute_layout(&self.book, self.current, self.viewport, &self.options) {
            Ok(layout) => self.scene.set_layout(layout),
            Err(e) => log::error!("Could not lay out spread {}: {e}", self.current),
        }
    }
}

fn compute_layout(
    book: &Book,
    index: usize,
    viewport: Viewport,
    options: &EditorOptions,
) -> Result<SpreadLayout> {
    let spread = book.spread(index).ok_or(LayoutError::SpreadOutOfRange {
        index,
        count: book.spread_count(),
    })?;
    Ok(layout_spread(
        spread,
        viewport,
        options.zoom,
        options.thumbnail_strip_height,
    ))
}
