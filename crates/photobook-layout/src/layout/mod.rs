//! Layout calculation modules for spreads
//!
//! This module handles all the geometric calculations for a rendered spread:
//! - Page rectangles derived from viewport, device class and zoom
//! - Page roles (cover front/back, locked first content page)
//! - Decorative markers drawn beneath user objects

mod geometry;
mod types;

pub use geometry::*;
pub use types::*;
