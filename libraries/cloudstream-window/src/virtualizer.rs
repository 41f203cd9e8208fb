//! Stateful windowing driven by scroll and resize events.

use crate::layout::WindowLayout;
use crate::range::{Viewport, VisibleRange};
use std::collections::HashMap;

/// Tracks the viewport of one scroll container and its current range.
///
/// Every event recomputes the range synchronously; callers read
/// [`range`](Self::range) right after.
#[derive(Debug, Clone)]
pub struct Virtualizer<L> {
    layout: L,
    total: usize,
    viewport: Viewport,
    range: VisibleRange,
}

impl<L: WindowLayout> Virtualizer<L> {
    pub fn new(layout: L, total: usize, viewport: Viewport) -> Self {
        let range = layout.visible_range(total, &viewport);
        Self {
            layout,
            total,
            viewport,
            range,
        }
    }

    pub fn layout(&self) -> &L {
        &self.layout
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn range(&self) -> VisibleRange {
        self.range
    }

    /// Returns `true` when the range changed
    pub fn scroll_to(&mut self, offset: f64) -> bool {
        self.viewport.scroll_offset = offset;
        self.recompute()
    }

    /// Returns `true` when the range changed
    pub fn resize(&mut self, width: f64, height: f64) -> bool {
        self.viewport.width = width;
        self.viewport.height = height;
        self.recompute()
    }

    /// New item count, e.g. after the filtered list changed
    pub fn set_total(&mut self, total: usize) -> bool {
        self.total = total;
        self.recompute()
    }

    /// Logical index of a click on the `rendered`-th materialized item
    pub fn logical_index(&self, rendered: usize) -> Option<usize> {
        self.range.logical_index(rendered)
    }

    fn recompute(&mut self) -> bool {
        let next = self.layout.visible_range(self.total, &self.viewport);
        let changed = next.start != self.range.start || next.end != self.range.end;
        self.range = next;
        changed
    }
}

/// Per-item UI state kept only for materialized items.
///
/// Memory stays proportional to the viewport no matter how long the
/// underlying sequence is.
#[derive(Debug, Clone)]
pub struct MaterializedRows<S> {
    range: VisibleRange,
    rows: HashMap<usize, S>,
}

impl<S> Default for MaterializedRows<S> {
    fn default() -> Self {
        Self {
            range: VisibleRange::empty(),
            rows: HashMap::new(),
        }
    }
}

impl<S> MaterializedRows<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt a new range, dropping state for items that left it.
    ///
    /// Returns how many entries were dropped.
    pub fn sync(&mut self, range: VisibleRange) -> usize {
        self.range = range;
        let before = self.rows.len();
        self.rows.retain(|index, _| range.contains(*index));
        before - self.rows.len()
    }

    /// State for a logical index, created on first use.
    ///
    /// `None` when the index is outside the current range.
    pub fn get_or_insert_with<F>(&mut self, index: usize, init: F) -> Option<&mut S>
    where
        F: FnOnce() -> S,
    {
        if !self.range.contains(index) {
            return None;
        }
        Some(self.rows.entry(index).or_insert_with(init))
    }

    pub fn get(&self, index: usize) -> Option<&S> {
        self.rows.get(&index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{GridWindow, ListWindow};

    #[test]
    fn scroll_recomputes_and_maps_clicks() {
        let mut v = Virtualizer::new(ListWindow::default(), 65_000, Viewport::new(800.0, 600.0, 0.0));
        assert_eq!((v.range().start, v.range().end), (0, 29));

        assert!(v.scroll_to(16_000.0));
        assert_eq!((v.range().start, v.range().end), (490, 529));

        // The 11th rendered row is the first one inside the viewport
        assert_eq!(v.logical_index(10), Some(500));
        assert!(!v.scroll_to(16_001.0));
    }

    #[test]
    fn resize_changes_grid_columns() {
        let mut v = Virtualizer::new(GridWindow::default(), 100, Viewport::new(1000.0, 600.0, 0.0));
        let narrow_end = {
            v.resize(300.0, 600.0);
            v.range().end
        };
        // 2 columns x (2 visible + 2 buffer rows)
        assert_eq!(narrow_end, 8);

        v.resize(1000.0, 600.0);
        assert_eq!(v.range().end, 16);
    }

    #[test]
    fn shrinking_total_clamps_range() {
        let mut v = Virtualizer::new(ListWindow::default(), 1000, Viewport::new(0.0, 600.0, 16_000.0));
        v.set_total(10);
        assert!(v.range().end <= 10);
        assert!(v.range().start <= v.range().end);
    }

    #[test]
    fn materialized_rows_are_pruned() {
        let mut v = Virtualizer::new(ListWindow::new(32.0, 2), 10_000, Viewport::new(0.0, 320.0, 0.0));
        let mut rows: MaterializedRows<String> = MaterializedRows::new();
        rows.sync(v.range());

        for i in v.range().indices() {
            rows.get_or_insert_with(i, || format!("row {}", i));
        }
        assert_eq!(rows.len(), 12);
        assert!(rows.get_or_insert_with(5_000, String::new).is_none());

        v.scroll_to(320_000.0 - 320.0);
        let dropped = rows.sync(v.range());
        assert_eq!(dropped, 12);
        assert!(rows.is_empty());
    }
}
