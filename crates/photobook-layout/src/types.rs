use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Storage quota exceeded writing {key} to {collection}")]
    QuotaExceeded { collection: String, key: String },
    #[error("Serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Spread {0} is protected and cannot be reordered")]
    ProtectedSpread(usize),
    #[error("Spread {index} is out of range (book has {count} content spreads)")]
    SpreadOutOfRange { index: usize, count: usize },
    #[error("Invalid scale {scale_x} x {scale_y}: scales must be finite and positive")]
    InvalidScale { scale_x: f32, scale_y: f32 },
    #[error("Object not found: {0}")]
    ObjectNotFound(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl LayoutError {
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, LayoutError::QuotaExceeded { .. })
    }
}

pub type Result<T> = std::result::Result<T, LayoutError>;

/// Colour scheme of the workspace around the pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Device class, derived from the viewport width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceClass {
    /// Viewport narrower than the mobile breakpoint
    Mobile,
    Desktop,
}

/// Which half of a spread a page occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSide {
    Left,
    Right,
}

impl PageSide {
    pub fn sibling(self) -> Self {
        match self {
            PageSide::Left => PageSide::Right,
            PageSide::Right => PageSide::Left,
        }
    }
}

/// Role of a page on the cover spread
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CoverRole {
    /// Not a cover page
    #[default]
    None,
    /// Front cover (right half of the cover spread)
    Front,
    /// Back cover (left half of the cover spread)
    Back,
}

/// Inclusive range of printed page numbers shown on a spread
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    pub first: usize,
    pub last: usize,
}

impl PageRange {
    pub fn new(first: usize, last: usize) -> Self {
        Self { first, last }
    }

    pub fn single(page: usize) -> Self {
        Self {
            first: page,
            last: page,
        }
    }

    pub fn is_single(&self) -> bool {
        self.first == self.last
    }
}

/// A spread of the book: the unit of navigation and persistence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spread {
    pub index: usize,
    pub is_cover: bool,
    /// None for the cover
    pub page_range: Option<PageRange>,
}

impl Spread {
    /// The first content spread, whose left page is never editable
    pub fn has_locked_page(&self) -> bool {
        self.index == 1
    }

    /// Cover and first content spread never move
    pub fn is_reorder_protected(&self) -> bool {
        self.index <= 1
    }
}
