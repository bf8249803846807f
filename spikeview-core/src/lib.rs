//! spikeview-core: Data model for spike-sorting classification displays.
//!
//! This crate provides the foundational types shared by the geometry and
//! interaction layers: metric/screen points, spikes, classification boxes
//! and polygons, units, the active selection and the view configuration.
//!

pub mod config;
pub mod error;
pub mod point;
pub mod spike;
pub mod unit;

pub use config::SortViewConfig;
pub use error::{Error, Result};
pub use point::{MetricPoint, Rgb, ScreenDelta, ScreenPoint};
pub use spike::Spike;
pub use unit::{BoxUnit, Polygon, PolygonUnit, SelectionState, SortBox, UnitId};
