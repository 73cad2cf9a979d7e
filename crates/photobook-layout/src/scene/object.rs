//! Drawable user objects

use serde::{Deserialize, Serialize};

use crate::constants::{TEXT_CHAR_WIDTH_RATIO, TEXT_LINE_HEIGHT};
use crate::layout::Rect;

/// Stable identity of a drawable object
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub String);

impl ObjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Position of the top-left corner and per-axis scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub left: f32,
    pub top: f32,
    pub scale_x: f32,
    pub scale_y: f32,
}

impl Transform {
    pub fn at(left: f32, top: f32) -> Self {
        Self {
            left,
            top,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale_x = scale;
        self.scale_y = scale;
        self
    }

    pub fn has_valid_scale(&self) -> bool {
        is_valid_scale(self.scale_x) && is_valid_scale(self.scale_y)
    }
}

/// Scales must be finite and positive, or the bounding box turns inside out
pub fn is_valid_scale(scale: f32) -> bool {
    scale.is_finite() && scale > 0.0
}

/// Clip region attached to an object.
///
/// The rectangle is in absolute canvas coordinates, not relative to the
/// object, and never receives pointer events.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipRegion {
    pub rect: Rect,
    pub absolute: bool,
    pub interactive: bool,
}

impl ClipRegion {
    pub fn page(rect: Rect) -> Self {
        Self {
            rect,
            absolute: true,
            interactive: false,
        }
    }
}

/// Kind-specific payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ObjectKind {
    Image {
        /// Key of the image bytes in the blob store, if they were stored
        store_key: Option<String>,
        /// Original file name
        source_name: String,
    },
    Text {
        text: String,
        font_size: f32,
        fill: String,
    },
}

/// A user-placed image or text object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawableObject {
    pub id: ObjectId,
    pub transform: Transform,
    /// Unscaled width in pixels
    pub width: f32,
    /// Unscaled height in pixels
    pub height: f32,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub clip: Option<ClipRegion>,
    #[serde(flatten)]
    pub kind: ObjectKind,
}

fn default_visible() -> bool {
    true
}

impl DrawableObject {
    pub fn image(
        id: ObjectId,
        transform: Transform,
        width: f32,
        height: f32,
        store_key: Option<String>,
        source_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            transform,
            width,
            height,
            visible: true,
            clip: None,
            kind: ObjectKind::Image {
                store_key,
                source_name: source_name.into(),
            },
        }
    }

    /// Text object sized from its content
    pub fn text(
        id: ObjectId,
        transform: Transform,
        text: impl Into<String>,
        font_size: f32,
        fill: impl Into<String>,
    ) -> Self {
        let text = text.into();
        let (width, height) = measure_text(&text, font_size);
        Self {
            id,
            transform,
            width,
            height,
            visible: true,
            clip: None,
            kind: ObjectKind::Text {
                text,
                font_size,
                fill: fill.into(),
            },
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, ObjectKind::Text { .. })
    }

    /// Display name for layer panels
    pub fn name(&self) -> &str {
        match &self.kind {
            ObjectKind::Image { source_name, .. } if !source_name.is_empty() => source_name,
            ObjectKind::Image { .. } => "image",
            ObjectKind::Text { .. } => "text",
        }
    }

    /// Axis-aligned bounding box in canvas coordinates
    pub fn bounding_box(&self) -> Rect {
        Rect::new(
            self.transform.left,
            self.transform.top,
            self.width * self.transform.scale_x,
            self.height * self.transform.scale_y,
        )
    }

    /// Part of the bounding box left visible by the clip region
    pub fn effective_bounds(&self) -> Option<Rect> {
        let bounds = self.bounding_box();
        match &self.clip {
            Some(clip) => bounds.intersection(&clip.rect),
            None => Some(bounds),
        }
    }

    /// Move the top-left corner
    pub fn set_position(&mut self, left: f32, top: f32) {
        self.transform.left = left;
        self.transform.top = top;
    }

    /// Scale the object; with `uniform` the vertical scale follows the horizontal one
    pub fn set_scale(&mut self, scale_x: f32, scale_y: f32, uniform: bool) {
        self.transform.scale_x = scale_x;
        self.transform.scale_y = if uniform { scale_x } else { scale_y };
    }

    /// Replace unusable scale factors (zero, negative, NaN) with 1.
    /// Returns true when anything changed.
    pub fn sanitize_scale(&mut self) -> bool {
        let mut changed = false;
        for scale in [&mut self.transform.scale_x, &mut self.transform.scale_y] {
            if !is_valid_scale(*scale) {
                *scale = 1.0;
                changed = true;
            }
        }
        changed
    }

    /// Replace the fill of a text object. Returns false for images.
    pub fn set_text_fill(&mut self, color: impl Into<String>) -> bool {
        match &mut self.kind {
            ObjectKind::Text { fill, .. } => {
                *fill = color.into();
                true
            }
            ObjectKind::Image { .. } => false,
        }
    }

    /// Same identity and placement, ignoring derived clip state
    pub fn same_placement(&self, other: &DrawableObject) -> bool {
        self.id == other.id && self.transform == other.transform
    }
}

/// Estimated unscaled size of a text block
pub fn measure_text(text: &str, font_size: f32) -> (f32, f32) {
    let lines: Vec<&str> = text.lines().collect();
    let line_count = lines.len().max(1);
    let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0).max(1);
    (
        longest as f32 * font_size * TEXT_CHAR_WIDTH_RATIO,
        line_count as f32 * font_size * TEXT_LINE_HEIGHT,
    )
}
