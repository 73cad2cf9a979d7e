//! Moving between spreads
//!
//! Navigation saves the spread being left, lays out the target and loads
//! its record. A failed save never blocks navigation.

use crate::constants::spread_key;
use crate::constraint;
use crate::store::{ReorderReport, Storage};
use crate::types::*;

use super::{Editor, compute_layout};

impl<S: Storage> Editor<S> {
    /// Go to `target` (clamped to the book). Returns the new spread index.
    pub async fn goto_spread(&mut self, target: usize) -> usize {
        let target = self.book.clamp_index(target);

        if !self.save().await {
            log::warn!(
                "Leaving spread {} without saving it, navigation continues",
                self.current
            );
        }
        let settle = self.options.settle_delay();
        if !settle.is_zero() {
            tokio::time::sleep(settle).await;
        }

        self.show_spread(target).await;
        log::debug!("Now on spread {target} ({})", self.spread_label());
        target
    }

    pub async fn next_spread(&mut self) -> usize {
        self.goto_spread(self.current + 1).await
    }

    pub async fn prev_spread(&mut self) -> usize {
        self.goto_spread(self.current.saturating_sub(1)).await
    }

    /// Add two pages to the book. Returns false at the page ceiling.
    pub async fn add_spread(&mut self) -> bool {
        if !self.book.add_spread() {
            log::info!("Book already has the maximum of {} pages", self.book.total_pages());
            return false;
        }
        self.options.total_pages = self.book.total_pages();
        self.save_preferences().await;
        // The old last spread was single-paged; it now shows a full range
        self.relayout();
        true
    }

    /// Move the content spread at `from` to position `to` and show it there.
    ///
    /// Returns None when the move was rejected (spreads 0 and 1 are fixed)
    /// or the records could not be read. Individual write failures are
    /// listed in the report.
    pub async fn reorder_spreads(&mut self, from: usize, to: usize) -> Option<ReorderReport> {
        if !self.save().await {
            log::warn!("Reordering without saving spread {}", self.current);
        }
        match self.store.reorder(from, to, &self.book).await {
            Ok(report) => {
                if !report.is_complete() {
                    log::warn!(
                        "Reorder left {} spreads unwritten: {}",
                        report.failed_keys.len(),
                        report.failed_keys.join(", ")
                    );
                }
                self.show_spread(to).await;
                Some(report)
            }
            Err(e) => {
                log::warn!("Reorder {from} -> {to} rejected: {e}");
                None
            }
        }
    }

    /// Delete the saved record of a spread. The page count is unchanged.
    pub async fn delete_spread(&mut self, index: usize) -> bool {
        if let Err(e) = self.store.delete(index).await {
            log::warn!("Deleting {} failed: {e}", spread_key(index));
            return false;
        }
        if index == self.current {
            self.scene.clear();
            self.history.reset(self.scene.snapshot());
            self.autosave.clear();
        }
        true
    }

    /// Switch to `index` without saving the spread being left
    async fn show_spread(&mut self, index: usize) {
        self.current = self.book.clamp_index(index);
        self.relayout();
        self.load_current().await;
    }

    /// Replace the scene objects with the stored record of the current
    /// spread, or clear them when there is none. Resets undo history.
    pub(super) async fn load_current(&mut self) {
        let objects = match self.store.load(self.current).await {
            Ok(Some(record)) => record.objects,
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!("Spread {} could not be loaded, showing it empty: {e}", self.current);
                Vec::new()
            }
        };

        let layout = self.scene.layout().clone();
        let objects = objects
            .into_iter()
            .map(|mut obj| {
                if obj.sanitize_scale() {
                    log::warn!("Reset unusable scale of {} on spread {}", obj.id, self.current);
                }
                constraint::apply(&mut obj, &layout);
                obj
            })
            .collect();
        self.scene.replace_objects(objects);
        self.history.reset(self.scene.snapshot());
        self.autosave.clear();
    }

    /// Layout of `index` for the current viewport and zoom
    pub fn layout_for(&self, index: usize) -> Result<crate::layout::SpreadLayout> {
        compute_layout(&self.book, index, self.viewport, &self.options)
    }
}
