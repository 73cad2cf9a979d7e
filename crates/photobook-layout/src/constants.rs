//! Shared constants for the spread editor
//!
//! This module centralizes magic numbers used by geometry, placement,
//! history and persistence.

use std::time::Duration;

// =============================================================================
// Unit Conversion
// =============================================================================

/// Screen pixels per millimeter (96 dpi, 1 inch = 25.4mm)
pub const PX_PER_MM: f32 = 96.0 / 25.4; // ≈ 3.7795

/// Convert millimeters to screen pixels
#[inline]
pub fn mm_to_px(mm: f32) -> f32 {
    mm * PX_PER_MM
}

// =============================================================================
// Page Dimensions
// =============================================================================

/// A4 width in millimeters
pub const A4_WIDTH_MM: f32 = 210.0;

/// A4 height in millimeters
pub const A4_HEIGHT_MM: f32 = 297.0;

/// Minimum rendered page width (pixels)
pub const MIN_PAGE_WIDTH_PX: f32 = 120.0;

/// Minimum rendered page height (pixels)
pub const MIN_PAGE_HEIGHT_PX: f32 = 140.0;

// =============================================================================
// Viewport Layout
// =============================================================================

/// Viewports narrower than this are treated as mobile
pub const MOBILE_BREAKPOINT_PX: f32 = 768.0;

/// Padding kept clear around the spread (pixels)
pub const VIEWPORT_PADDING_PX: f32 = 40.0;

/// Smallest gutter between cover pages (pixels)
pub const MIN_COVER_GUTTER_PX: f32 = 24.0;

/// Gutter as a fraction of the viewport width
pub const GUTTER_WIDTH_RATIO: f32 = 0.02;

/// Smallest gutter between content pages (pixels)
pub const MIN_CONTENT_GUTTER_PX: f32 = 8.0;

/// Lower bound of the fit scale
pub const MIN_FIT_SCALE: f32 = 0.1;

/// Page scale multiplier on desktop
pub const DESKTOP_PAGE_SCALE: f32 = 0.6;

/// Page scale multiplier on mobile (pages render twice as large)
pub const MOBILE_PAGE_SCALE: f32 = 1.2;

/// Reserved height of the thumbnail strip on desktop (pixels)
pub const DESKTOP_THUMBNAIL_HEIGHT_PX: f32 = 180.0;

/// Reserved height of the thumbnail strip on mobile (pixels)
pub const MOBILE_THUMBNAIL_HEIGHT_PX: f32 = 150.0;

/// Minimum height budget for the spread (pixels)
pub const MIN_AVAILABLE_HEIGHT_PX: f32 = 200.0;

/// Minimum distance between the page tops and the viewport top (pixels)
pub const MIN_PAGE_TOP_PX: f32 = 20.0;

/// Width of the cover spine block relative to the page width
pub const SPINE_WIDTH_RATIO: f32 = 0.06;

/// Minimum width of the cover spine block (pixels)
pub const MIN_SPINE_WIDTH_PX: f32 = 16.0;

/// Distance of page-number labels above the pages (pixels)
pub const PAGE_LABEL_OFFSET_PX: f32 = 24.0;

// =============================================================================
// Zoom
// =============================================================================

pub const MIN_ZOOM: f32 = 0.5;
pub const MAX_ZOOM: f32 = 2.0;
pub const ZOOM_STEP: f32 = 0.1;

// =============================================================================
// Page Styling
// =============================================================================

pub const PAGE_FILL: &str = "#ffffff";
pub const PAGE_STROKE_LIGHT: &str = "#dddddd";
pub const PAGE_STROKE_DARK: &str = "#444444";
/// Fill of the locked page and the cover spine
pub const LOCKED_FILL: &str = "#424242";
pub const LABEL_FILL_LIGHT: &str = "#aaaaaa";
pub const LABEL_FILL_DARK: &str = "#999999";
pub const LOCKED_LABEL_FILL: &str = "#ffffff";
pub const LOCKED_PAGE_TEXT: &str = "This page cannot be edited";

// =============================================================================
// Objects
// =============================================================================

/// Scale applied to freshly added images
pub const DEFAULT_IMAGE_SCALE: f32 = 0.5;

/// Font size of freshly added text (pixels)
pub const DEFAULT_FONT_SIZE: f32 = 28.0;

/// Text offset from the page corner when text lands on the first content spread
pub const TEXT_PAGE_INSET_PX: f32 = 24.0;

/// Approximate glyph advance relative to the font size
pub const TEXT_CHAR_WIDTH_RATIO: f32 = 0.5;

/// Line height relative to the font size
pub const TEXT_LINE_HEIGHT: f32 = 1.16;

pub const TEXT_FILL_LIGHT: &str = "#111111";
pub const TEXT_FILL_DARK: &str = "#ffffff";

// =============================================================================
// Book
// =============================================================================

pub const MIN_TOTAL_PAGES: usize = 2;
pub const MAX_TOTAL_PAGES: usize = 70;
pub const DEFAULT_TOTAL_PAGES: usize = 30;
/// Ceiling on `total_pages / 2`
pub const MAX_SPREADS: usize = 35;

// =============================================================================
// History and Persistence
// =============================================================================

/// Maximum number of undo snapshots kept
pub const MAX_HISTORY: usize = 50;

/// Quiet period before an autosave fires
pub const AUTOSAVE_DELAY: Duration = Duration::from_millis(2000);

/// Key prefix of persisted spread records
pub const SPREAD_KEY_PREFIX: &str = "spread_";

/// Key-value entry holding the spread metadata index
pub const METADATA_INDEX_KEY: &str = "savedSpreadsMeta";

/// Key-value entry holding user preferences
pub const PREFERENCES_KEY: &str = "preferences";

/// Image-collection entry holding the photo tray
pub const PHOTO_TRAY_KEY: &str = "photo_tray";

/// Slots in the photo tray, one per page of the largest book
pub const PHOTO_TRAY_SLOTS: usize = MAX_TOTAL_PAGES;

/// Key of a persisted spread record
pub fn spread_key(index: usize) -> String {
    format!("{SPREAD_KEY_PREFIX}{index}")
}
