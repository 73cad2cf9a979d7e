//! Page geometry calculation
//!
//! Derives the pixel rectangles of a spread's two pages from the viewport
//! size, device class, zoom factor and spread kind.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::types::{DeviceClass, Spread};

use super::{Rect, SpreadGeometry, SpreadLayout};

/// Visible drawing area in screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn device_class(&self) -> DeviceClass {
        if self.width < MOBILE_BREAKPOINT_PX {
            DeviceClass::Mobile
        } else {
            DeviceClass::Desktop
        }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.width / 2.0, self.height / 2.0)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1440.0,
            height: 900.0,
        }
    }
}

/// Covers get the full gutter, content spreads half of it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadKind {
    Cover,
    Content,
}

impl From<&Spread> for SpreadKind {
    fn from(spread: &Spread) -> Self {
        if spread.is_cover {
            SpreadKind::Cover
        } else {
            SpreadKind::Content
        }
    }
}

/// A4 page size in whole pixels
pub fn a4_pixel_size() -> (f32, f32) {
    (
        mm_to_px(A4_WIDTH_MM).round(),
        mm_to_px(A4_HEIGHT_MM).round(),
    )
}

pub fn clamp_zoom(zoom: f32) -> f32 {
    if zoom.is_nan() {
        return 1.0;
    }
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}

/// One zoom step in, rounded to two decimals
pub fn zoom_in(zoom: f32) -> f32 {
    clamp_zoom(round_zoom(zoom + ZOOM_STEP))
}

/// One zoom step out, rounded to two decimals
pub fn zoom_out(zoom: f32) -> f32 {
    clamp_zoom(round_zoom(zoom - ZOOM_STEP))
}

fn round_zoom(zoom: f32) -> f32 {
    (zoom * 100.0).round() / 100.0
}

/// Calculate page rectangles for a spread.
///
/// The fit scale is the largest uniform scale at which two A4 pages and the
/// gutter fit the padded width and one page fits the height left over by the
/// thumbnail strip. The device base scale and the zoom factor apply on top.
///
/// # Arguments
/// * `viewport` - Drawing area size
/// * `zoom` - User zoom factor (clamped to 0.5..=2.0)
/// * `kind` - Cover or content spread
/// * `thumbnail_height` - Reserved strip height, or None for the device default
pub fn compute_geometry(
    viewport: Viewport,
    zoom: f32,
    kind: SpreadKind,
    thumbnail_height: Option<f32>,
) -> SpreadGeometry {
    let device = viewport.device_class();
    let (a4_w, a4_h) = a4_pixel_size();

    let gutter_base = (viewport.width * GUTTER_WIDTH_RATIO)
        .floor()
        .max(MIN_COVER_GUTTER_PX);
    let gutter = match kind {
        SpreadKind::Cover => gutter_base,
        SpreadKind::Content => (gutter_base / 2.0).floor().max(MIN_CONTENT_GUTTER_PX),
    };

    let thumbnail_height = thumbnail_height.unwrap_or(match device {
        DeviceClass::Mobile => MOBILE_THUMBNAIL_HEIGHT_PX,
        DeviceClass::Desktop => DESKTOP_THUMBNAIL_HEIGHT_PX,
    });
    let available_height =
        (viewport.height - thumbnail_height - VIEWPORT_PADDING_PX).max(MIN_AVAILABLE_HEIGHT_PX);

    let max_scale_by_width =
        (viewport.width - VIEWPORT_PADDING_PX * 2.0 - gutter_base) / (2.0 * a4_w);
    let max_scale_by_height = (available_height - VIEWPORT_PADDING_PX) / a4_h;
    let fit_scale = max_scale_by_width
        .min(max_scale_by_height)
        .max(MIN_FIT_SCALE);

    let base_scale = match device {
        DeviceClass::Mobile => MOBILE_PAGE_SCALE,
        DeviceClass::Desktop => DESKTOP_PAGE_SCALE,
    };
    let scale = fit_scale * base_scale * clamp_zoom(zoom);

    let page_w = (a4_w * scale).floor().max(MIN_PAGE_WIDTH_PX);
    let page_h = (a4_h * scale).floor().max(MIN_PAGE_HEIGHT_PX);

    let left_x = (viewport.width - (page_w * 2.0 + gutter)) / 2.0;
    let right_x = left_x + page_w + gutter;
    let top = ((available_height - page_h) / 2.0)
        .floor()
        .max(MIN_PAGE_TOP_PX);

    SpreadGeometry {
        left: Rect::new(left_x, top, page_w, page_h),
        right: Rect::new(right_x, top, page_w, page_h),
        gutter,
        scale,
        device,
    }
}

/// Compute geometry for `spread` and assign page roles
pub fn layout_spread(
    spread: Spread,
    viewport: Viewport,
    zoom: f32,
    thumbnail_height: Option<f32>,
) -> SpreadLayout {
    let geometry = compute_geometry(viewport, zoom, SpreadKind::from(&spread), thumbnail_height);
    SpreadLayout::new(spread, geometry)
}
