//! Layout data types for spreads
//!
//! These types are the derived, never-persisted result of a geometry pass:
//! page rectangles plus the decorative markers drawn beneath user objects.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::types::{CoverRole, DeviceClass, PageSide, Spread, Theme};

/// A rectangular area in screen pixels (y grows downwards)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// X position (left edge)
    pub x: f32,
    /// Y position (top edge)
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge x coordinate
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge y coordinate
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Center x coordinate
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Center y coordinate
    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    /// Whether `x` lies within the horizontal span (edges inclusive)
    pub fn spans_x(&self, x: f32) -> bool {
        x >= self.x && x <= self.right()
    }

    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        self.spans_x(x) && y >= self.y && y <= self.bottom()
    }

    /// Whether `other` lies entirely inside this rectangle, with a tolerance
    pub fn contains_rect(&self, other: &Rect, epsilon: f32) -> bool {
        other.x >= self.x - epsilon
            && other.y >= self.y - epsilon
            && other.right() <= self.right() + epsilon
            && other.bottom() <= self.bottom() + epsilon
    }

    /// Overlapping area, or None when the rectangles are disjoint
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right < x || bottom < y {
            return None;
        }
        Some(Rect::new(x, y, right - x, bottom - y))
    }

    /// Horizontal distance from `x` to the nearest edge (0 when inside)
    pub fn distance_x(&self, x: f32) -> f32 {
        if x < self.x {
            self.x - x
        } else if x > self.right() {
            x - self.right()
        } else {
            0.0
        }
    }
}

/// A page of the currently rendered spread
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub side: PageSide,
    pub rect: Rect,
    /// Locked pages never accept objects
    pub locked: bool,
    pub cover_role: CoverRole,
}

/// Result of the geometry pass, before pages are assigned roles
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpreadGeometry {
    pub left: Rect,
    pub right: Rect,
    pub gutter: f32,
    /// Uniform scale applied to the A4 pixel size
    pub scale: f32,
    pub device: DeviceClass,
}

/// What a marker depicts
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerKind {
    /// Page background
    Page { side: PageSide, locked: bool },
    /// Cover spine block between the cover pages
    Spine,
    /// Informational text centred on the locked page
    LockedLabel,
    /// Page number above a page (desktop only)
    PageNumber(usize),
}

/// A non-interactive drawable derived from the layout
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub kind: MarkerKind,
    pub rect: Rect,
    pub fill: &'static str,
    pub stroke: Option<&'static str>,
    pub text: Option<String>,
}

/// A rendered spread: its pages and the markers derived from them
#[derive(Debug, Clone, PartialEq)]
pub struct SpreadLayout {
    pub spread: Spread,
    pub geometry: SpreadGeometry,
    pub pages: [Page; 2],
}

impl SpreadLayout {
    pub fn new(spread: Spread, geometry: SpreadGeometry) -> Self {
        let (left_role, right_role) = if spread.is_cover {
            (CoverRole::Back, CoverRole::Front)
        } else {
            (CoverRole::None, CoverRole::None)
        };
        let pages = [
            Page {
                side: PageSide::Left,
                rect: geometry.left,
                locked: spread.has_locked_page(),
                cover_role: left_role,
            },
            Page {
                side: PageSide::Right,
                rect: geometry.right,
                locked: false,
                cover_role: right_role,
            },
        ];
        Self {
            spread,
            geometry,
            pages,
        }
    }

    pub fn page(&self, side: PageSide) -> &Page {
        match side {
            PageSide::Left => &self.pages[0],
            PageSide::Right => &self.pages[1],
        }
    }

    /// Pages that may own objects
    pub fn editable_pages(&self) -> impl Iterator<Item = &Page> {
        self.pages.iter().filter(|p| !p.locked)
    }

    /// Horizontal center of the whole spread (middle of the gutter)
    pub fn center_x(&self) -> f32 {
        (self.pages[0].rect.x + self.pages[1].rect.right()) / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.pages[0].rect.center_y()
    }

    /// Markers in back-to-front order
    pub fn markers(&self, theme: Theme) -> Vec<Marker> {
        let stroke = match theme {
            Theme::Light => PAGE_STROKE_LIGHT,
            Theme::Dark => PAGE_STROKE_DARK,
        };
        let label_fill = match theme {
            Theme::Light => LABEL_FILL_LIGHT,
            Theme::Dark => LABEL_FILL_DARK,
        };

        let mut markers: Vec<Marker> = self
            .pages
            .iter()
            .map(|page| Marker {
                kind: MarkerKind::Page {
                    side: page.side,
                    locked: page.locked,
                },
                rect: page.rect,
                fill: if page.locked { LOCKED_FILL } else { PAGE_FILL },
                stroke: Some(stroke),
                text: None,
            })
            .collect();

        if self.spread.is_cover {
            markers.push(Marker {
                kind: MarkerKind::Spine,
                rect: self.spine_rect(),
                fill: LOCKED_FILL,
                stroke: None,
                text: None,
            });
            return markers;
        }

        let left = self.pages[0];
        if left.locked {
            markers.push(Marker {
                kind: MarkerKind::LockedLabel,
                rect: left.rect,
                fill: LOCKED_LABEL_FILL,
                stroke: None,
                text: Some(LOCKED_PAGE_TEXT.to_string()),
            });
        }

        if self.geometry.device == DeviceClass::Desktop {
            if let Some(range) = self.spread.page_range {
                let mut numbered = Vec::with_capacity(2);
                if range.is_single() {
                    numbered.push((&self.pages[1], range.first));
                } else {
                    numbered.push((&self.pages[0], range.first));
                    numbered.push((&self.pages[1], range.last));
                }
                for (page, number) in numbered {
                    markers.push(Marker {
                        kind: MarkerKind::PageNumber(number),
                        rect: Rect::new(
                            page.rect.x,
                            page.rect.y - PAGE_LABEL_OFFSET_PX,
                            page.rect.width,
                            PAGE_LABEL_OFFSET_PX,
                        ),
                        fill: label_fill,
                        stroke: None,
                        text: Some(format!("Page {number}")),
                    });
                }
            }
        }

        markers
    }

    /// Spine block centred in the cover gutter
    pub fn spine_rect(&self) -> Rect {
        let left = self.pages[0].rect;
        let right = self.pages[1].rect;
        let spine_x = (left.right() + right.x) / 2.0;
        let spine_width = (left.width * SPINE_WIDTH_RATIO)
            .round()
            .max(MIN_SPINE_WIDTH_PX);
        Rect::new(
            spine_x - spine_width / 2.0,
            left.y,
            spine_width,
            left.height,
        )
    }
}
