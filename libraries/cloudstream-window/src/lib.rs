//! Viewport windowing for Cloudstream Player lists and grids.
//!
//! Only the items intersecting the viewport, plus a small buffer on each
//! side, are materialized. This keeps rendering cost proportional to the
//! viewport for catalogs of 10^5 tracks and more.
//!
//! ```
//! use cloudstream_window::ListWindow;
//!
//! let range = ListWindow::new(32.0, 10).range(65_000, 600.0, 16_000.0);
//! assert_eq!((range.start, range.end), (490, 529));
//! assert_eq!(range.logical_index(10), Some(500));
//! ```

pub mod layout;
pub mod range;
pub mod virtualizer;

pub use layout::{GridLayout, GridWindow, ListWindow, WindowLayout};
pub use range::{Viewport, VisibleRange};
pub use virtualizer::{MaterializedRows, Virtualizer};
