//! Book pagination: page counts, spreads and their page ranges

use crate::constants::{MAX_SPREADS, MAX_TOTAL_PAGES, MIN_TOTAL_PAGES};
use crate::types::*;

/// Page count of a photo book.
///
/// The cover spread (index 0) is always two pages. Content spreads follow at
/// indices `1..=spread_count()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Book {
    total_pages: usize,
}

impl Book {
    pub fn new(total_pages: usize) -> Result<Self> {
        validate_total_pages(total_pages)?;
        Ok(Self { total_pages })
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// Number of content spreads (the cover is not counted)
    pub fn spread_count(&self) -> usize {
        (self.total_pages - MIN_TOTAL_PAGES) / 2
    }

    /// Add two pages. Returns false without changing anything at the ceiling.
    pub fn add_spread(&mut self) -> bool {
        if self.total_pages / 2 >= MAX_SPREADS {
            return false;
        }
        self.total_pages = (self.total_pages + 2).min(MAX_TOTAL_PAGES);
        true
    }

    /// Clamp an arbitrary navigation target into `[0, spread_count]`
    pub fn clamp_index(&self, index: usize) -> usize {
        index.min(self.spread_count())
    }

    pub fn spread(&self, index: usize) -> Option<Spread> {
        if index > self.spread_count() {
            return None;
        }
        Some(Spread {
            index,
            is_cover: index == 0,
            page_range: self.page_range(index),
        })
    }

    pub fn spreads(&self) -> impl Iterator<Item = Spread> + '_ {
        (0..=self.spread_count()).filter_map(|i| self.spread(i))
    }

    /// Printed page numbers on a spread.
    ///
    /// Spread 1 carries page 1 on its right page only. The last spread of a
    /// book with two or more content spreads carries a single page.
    ///
    /// Numbering is contiguous from that first page: spread i shows pages
    /// 2i-2 and 2i-1, and the last of N content spreads shows page 2N-2.
    /// Spread records and the metadata index store these numbers, so changing
    /// them would relabel every saved spread.
    pub fn page_range(&self, index: usize) -> Option<PageRange> {
        let count = self.spread_count();
        match index {
            0 => None,
            1 => Some(PageRange::single(1)),
            i if i > count => None,
            i if i == count => Some(PageRange::single(2 * i - 2)),
            i => Some(PageRange::new(2 * i - 2, 2 * i - 1)),
        }
    }

    /// Label shown next to the spread navigation controls
    pub fn spread_label(&self, index: usize) -> String {
        match self.page_range(index) {
            None if index == 0 => "Cover".to_string(),
            None => String::new(),
            Some(range) if range.is_single() => format!("Page {}", range.first),
            Some(range) => format!("Pages {}–{}", range.first, range.last),
        }
    }
}

impl Default for Book {
    fn default() -> Self {
        Self {
            total_pages: crate::constants::DEFAULT_TOTAL_PAGES,
        }
    }
}

pub(crate) fn validate_total_pages(total_pages: usize) -> Result<()> {
    if total_pages % 2 != 0 {
        return Err(LayoutError::Config(format!(
            "Total pages must be even, got {total_pages}"
        )));
    }
    if !(MIN_TOTAL_PAGES..=MAX_TOTAL_PAGES).contains(&total_pages) {
        return Err(LayoutError::Config(format!(
            "Total pages must be within {MIN_TOTAL_PAGES}..={MAX_TOTAL_PAGES}, got {total_pages}"
        )));
    }
    Ok(())
}
