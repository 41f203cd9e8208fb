//! List and grid windowing maths.

use crate::range::{sanitize, Viewport, VisibleRange};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Anything that can turn a viewport into a visible range
pub trait WindowLayout {
    fn visible_range(&self, total: usize, viewport: &Viewport) -> VisibleRange;
}

/// Fixed-height rows
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ListWindow {
    /// Row height in pixels
    pub item_extent: f64,
    /// Extra rows materialized above and below the viewport
    pub buffer: usize,
}

impl Default for ListWindow {
    fn default() -> Self {
        Self {
            item_extent: 32.0,
            buffer: 10,
        }
    }
}

impl ListWindow {
    pub fn new(item_extent: f64, buffer: usize) -> Self {
        Self {
            item_extent,
            buffer,
        }
    }

    /// Rows intersecting the viewport plus `buffer` on each side.
    ///
    /// `start = max(0, floor(scroll / h) - buffer)`,
    /// `end = min(total, ceil((scroll + viewport) / h) + buffer)`.
    pub fn range(&self, total: usize, viewport_extent: f64, scroll_offset: f64) -> VisibleRange {
        let h = sanitize(self.item_extent);
        if h == 0.0 || total == 0 {
            return VisibleRange::empty();
        }

        let scroll = sanitize(scroll_offset);
        let bottom = scroll + sanitize(viewport_extent);

        let first = (scroll / h).floor() as usize;
        let last = (bottom / h).ceil() as usize;

        let end = last.saturating_add(self.buffer).min(total);
        let start = first.saturating_sub(self.buffer).min(end);

        VisibleRange {
            start,
            end,
            offset: start as f64 * h,
            total_extent: total as f64 * h,
        }
    }
}

impl WindowLayout for ListWindow {
    fn visible_range(&self, total: usize, viewport: &Viewport) -> VisibleRange {
        self.range(total, viewport.extent(), viewport.scroll())
    }
}

/// Fixed-size cards laid out in rows
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridWindow {
    pub item_width: f64,
    pub item_height: f64,
    /// Extra rows materialized above and below the viewport
    pub buffer_rows: usize,
}

impl Default for GridWindow {
    fn default() -> Self {
        Self {
            item_width: 220.0,
            item_height: 300.0,
            buffer_rows: 2,
        }
    }
}

/// Grid geometry for one viewport
#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    pub columns: usize,
    pub total_rows: usize,
    /// Materialized rows, half-open
    pub rows: Range<usize>,
    /// Materialized items, half-open
    pub range: VisibleRange,
}

impl GridLayout {
    /// `(row, column)` of a logical item index
    pub fn cell(&self, index: usize) -> (usize, usize) {
        (index / self.columns, index % self.columns)
    }
}

impl GridWindow {
    pub fn new(item_width: f64, item_height: f64, buffer_rows: usize) -> Self {
        Self {
            item_width,
            item_height,
            buffer_rows,
        }
    }

    /// `max(2, floor(width / item_width))`
    pub fn columns_per_row(&self, container_width: f64) -> usize {
        let w = sanitize(self.item_width);
        if w == 0.0 {
            return 2;
        }
        ((sanitize(container_width) / w).floor() as usize).max(2)
    }

    pub fn layout(&self, total: usize, viewport: &Viewport) -> GridLayout {
        let columns = self.columns_per_row(viewport.width);
        let total_rows = total.div_ceil(columns);
        let h = sanitize(self.item_height);

        if h == 0.0 || total == 0 {
            return GridLayout {
                columns,
                total_rows,
                rows: 0..0,
                range: VisibleRange::empty(),
            };
        }

        let scroll = viewport.scroll();
        let first_row = (scroll / h).floor() as usize;
        let last_row = ((scroll + viewport.extent()) / h).ceil() as usize;

        let end_row = last_row.saturating_add(self.buffer_rows).min(total_rows);
        let start_row = first_row.saturating_sub(self.buffer_rows).min(end_row);

        let end = (end_row * columns).min(total);
        let start = (start_row * columns).min(end);

        GridLayout {
            columns,
            total_rows,
            rows: start_row..end_row,
            range: VisibleRange {
                start,
                end,
                offset: start_row as f64 * h,
                total_extent: total_rows as f64 * h,
            },
        }
    }
}

impl WindowLayout for GridWindow {
    fn visible_range(&self, total: usize, viewport: &Viewport) -> VisibleRange {
        self.layout(total, viewport).range
    }
}
