//! Error types for spikeview-core.

use thiserror::Error;

/// Result type alias for spikeview operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for spikeview operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Axis range with `min >= max` or a non-finite bound.
    #[error("invalid axis range: [{min}, {max}]")]
    InvalidRange { min: f64, max: f64 },

    /// Canvas with a non-positive or non-finite dimension.
    #[error("invalid canvas size: {width}x{height}")]
    InvalidCanvas { width: f64, height: f64 },

    /// Sample buffer that does not split evenly into channels.
    #[error("{samples} samples cannot be split across {channels} channel(s)")]
    SampleLayout { samples: usize, channels: usize },

    /// Polygon with fewer vertices than a closed shape needs.
    #[error("polygon needs at least {min} vertices, got {count}")]
    TooFewVertices { count: usize, min: usize },

    /// Unit identifier outside the positive range.
    #[error("invalid unit id: {0}")]
    InvalidUnitId(u32),

    /// Every unit identifier has been handed out.
    #[error("unit identifiers exhausted")]
    UnitIdsExhausted,

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}
