//! View and interaction configuration.

use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Samples per captured waveform.
pub const WAVEFORM_SAMPLES: usize = 40;
/// Acquisition sample rate in Hz.
pub const SAMPLE_RATE_HZ: f64 = 30_000.0;
/// Time covered by one captured waveform (≈ 1333 µs).
#[allow(clippy::cast_precision_loss)]
pub const WAVEFORM_TIME_SPAN_US: f64 = WAVEFORM_SAMPLES as f64 / SAMPLE_RATE_HZ * 1e6;

/// Tunables for the spike-sorting views.
///
/// Pixel quantities are screen pixels, voltages microvolts and times
/// microseconds.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SortViewConfig {
    /// Half-width of the grab band around box edges and corners.
    pub handle_tolerance_px: f64,
    /// Half-width of the grab band around the threshold line.
    pub threshold_tolerance_px: f64,
    /// Minimum spacing between captured lasso vertices.
    pub polygon_min_pixel_distance: f64,
    /// Polygons with fewer vertices are rejected on commit.
    pub min_polygon_vertices: usize,
    /// Spikes kept per waveform axis.
    pub waveform_buffer_capacity: usize,
    /// Spikes kept by the projection axis.
    pub projection_buffer_capacity: usize,
    /// Time covered by a waveform axis.
    pub waveform_time_span_us: f64,
    /// Voltage ranges a waveform axis cycles through; the first is the initial one.
    pub waveform_ranges_uv: Vec<f64>,
    /// Fraction of the span removed or added per side by one zoom step.
    pub zoom_step: f64,
}

impl Default for SortViewConfig {
    fn default() -> Self {
        Self {
            handle_tolerance_px: 10.0,
            threshold_tolerance_px: 10.0,
            polygon_min_pixel_distance: 6.0,
            min_polygon_vertices: crate::unit::MIN_POLYGON_VERTICES,
            waveform_buffer_capacity: 5,
            projection_buffer_capacity: 600,
            waveform_time_span_us: WAVEFORM_TIME_SPAN_US,
            waveform_ranges_uv: vec![250.0, 500.0, 100.0],
            zoom_step: 0.1,
        }
    }
}

impl SortViewConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the handle tolerance.
    pub fn with_handle_tolerance(mut self, px: f64) -> Self {
        self.handle_tolerance_px = px;
        self
    }

    /// Sets the lasso vertex spacing.
    pub fn with_polygon_min_pixel_distance(mut self, px: f64) -> Self {
        self.polygon_min_pixel_distance = px;
        self
    }

    /// Sets both ring buffer capacities.
    pub fn with_buffer_capacities(mut self, waveform: usize, projection: usize) -> Self {
        self.waveform_buffer_capacity = waveform;
        self.projection_buffer_capacity = projection;
        self
    }

    /// Sets the waveform time span.
    pub fn with_waveform_time_span(mut self, us: f64) -> Self {
        self.waveform_time_span_us = us;
        self
    }

    /// Sets the voltage range cycle.
    pub fn with_waveform_ranges(mut self, ranges: Vec<f64>) -> Self {
        self.waveform_ranges_uv = ranges;
        self
    }

    /// Initial voltage range of a waveform axis.
    pub fn initial_range_uv(&self) -> f64 {
        self.waveform_ranges_uv.first().copied().unwrap_or(250.0)
    }

    /// Range following `current` in the cycle; unknown ranges restart it.
    pub fn next_range_uv(&self, current: f64) -> f64 {
        let ranges = &self.waveform_ranges_uv;
        match ranges.iter().position(|&r| r == current) {
            Some(i) => ranges[(i + 1) % ranges.len()],
            None => self.initial_range_uv(),
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns [`Error::ConfigError`] describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        let positive = |name: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(Error::ConfigError(format!("{name} must be positive, got {v}")))
            }
        };
        positive("handle_tolerance_px", self.handle_tolerance_px)?;
        positive("threshold_tolerance_px", self.threshold_tolerance_px)?;
        positive("polygon_min_pixel_distance", self.polygon_min_pixel_distance)?;
        positive("waveform_time_span_us", self.waveform_time_span_us)?;
        if self.min_polygon_vertices < crate::unit::MIN_POLYGON_VERTICES {
            return Err(Error::ConfigError(format!(
                "min_polygon_vertices must be at least {}",
                crate::unit::MIN_POLYGON_VERTICES
            )));
        }
        if self.waveform_buffer_capacity == 0 || self.projection_buffer_capacity == 0 {
            return Err(Error::ConfigError(
                "buffer capacities must be non-zero".to_string(),
            ));
        }
        if self.waveform_ranges_uv.is_empty() {
            return Err(Error::ConfigError(
                "waveform_ranges_uv must not be empty".to_string(),
            ));
        }
        for &r in &self.waveform_ranges_uv {
            positive("waveform range", r)?;
        }
        if !(self.zoom_step > 0.0 && self.zoom_step < 0.5) {
            return Err(Error::ConfigError(format!(
                "zoom_step must be in (0, 0.5), got {}",
                self.zoom_step
            )));
        }
        Ok(())
    }
}
