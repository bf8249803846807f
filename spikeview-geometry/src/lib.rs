//! spikeview-geometry: Interactive classification geometry.
//!
//! This crate maps between metric and pixel space and implements the
//! shape-editing primitives used by the spike-sorting axes:
//! - **Mapper** - affine metric/pixel transform with pan and zoom
//! - **Boxes** - nine-zone handle hit-testing and drift-free drag editing
//! - **Polygons** - lasso capture with vertex decimation and commit
//! - **Emphasis** - selected/hovered/normal stroke weights
//!
#![warn(missing_docs)]

pub mod boxes;
mod emphasis;
pub mod mapper;
pub mod polygon;

pub use boxes::{apply_drag, hit_test, locate_box, BoxDrag, BoxHandle, BoxHit, ScreenSide};
pub use emphasis::Emphasis;
pub use mapper::{to_metric, to_screen, AxisRange, Mapper, PixelSize, VisibleRange, YAxis, Zoom};
pub use polygon::{locate_polygon, screen_outline, PolygonCapture, PolygonCommitError};

// Re-export the shape types these functions operate on
pub use spikeview_core::unit::{Polygon, SortBox};
