//! Visible range and viewport types.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Scroll container geometry in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub scroll_offset: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, scroll_offset: f64) -> Self {
        Self {
            width,
            height,
            scroll_offset,
        }
    }

    /// Scroll offset with negative and non-finite values treated as 0
    pub(crate) fn scroll(&self) -> f64 {
        sanitize(self.scroll_offset)
    }

    pub(crate) fn extent(&self) -> f64 {
        sanitize(self.height)
    }
}

pub(crate) fn sanitize(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        0.0
    }
}

/// Slice of a sequence to materialize, including buffer items
///
/// `start..end` is half-open. `offset` is the pixel position of `start`
/// within the full scroll height `total_extent`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VisibleRange {
    pub start: usize,
    pub end: usize,
    pub offset: f64,
    pub total_extent: f64,
}

impl VisibleRange {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.start..self.end).contains(&index)
    }

    pub fn indices(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Map a position among the rendered items back to the full sequence.
    ///
    /// Rendered position 0 is `start`, not the first item inside the viewport.
    pub fn logical_index(&self, rendered: usize) -> Option<usize> {
        let logical = self.start.checked_add(rendered)?;
        (logical < self.end).then_some(logical)
    }

    /// Inverse of [`logical_index`](Self::logical_index)
    pub fn rendered_index(&self, logical: usize) -> Option<usize> {
        self.contains(logical).then(|| logical - self.start)
    }

    /// The materialized slice of `items`
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let end = self.end.min(items.len());
        let start = self.start.min(end);
        &items[start..end]
    }
}
