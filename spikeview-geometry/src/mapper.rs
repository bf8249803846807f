//! Metric/pixel coordinate mapping.
//!
//! A [`Mapper`] is the affine transform between a [`VisibleRange`] in
//! metric space and a canvas of [`PixelSize`]. Waveform axes draw positive
//! voltage upwards ([`YAxis::Up`]); the projection axis grows downwards like
//! the screen ([`YAxis::Down`]).

use spikeview_core::{Error, MetricPoint, Result, ScreenDelta, ScreenPoint};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Orientation of the metric y axis on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum YAxis {
    /// Larger metric values are drawn higher up.
    Up,
    /// Larger metric values are drawn lower down.
    #[default]
    Down,
}

/// Zoom direction of a range step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zoom {
    /// Shrink the visible span.
    In,
    /// Grow the visible span.
    Out,
}

/// Visible interval of one axis, `min < max`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AxisRange {
    min: f64,
    max: f64,
}

impl AxisRange {
    /// Creates a range.
    ///
    /// # Errors
    /// Returns [`Error::InvalidRange`] unless both bounds are finite and
    /// `min < max`.
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if min.is_finite() && max.is_finite() && min < max {
            Ok(Self { min, max })
        } else {
            Err(Error::InvalidRange { min, max })
        }
    }

    /// Lower bound.
    #[inline]
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Upper bound.
    #[inline]
    pub fn max(&self) -> f64 {
        self.max
    }

    /// `max - min`, always positive.
    #[inline]
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Shifts both bounds by `delta`. Ignored if the result would be invalid.
    pub fn pan(&mut self, delta: f64) {
        if let Ok(shifted) = Self::new(self.min + delta, self.max + delta) {
            *self = shifted;
        }
    }

    /// Moves each bound by `step * span`, inwards or outwards.
    ///
    /// Returns false and leaves the range untouched if the step would
    /// collapse it.
    pub fn zoom(&mut self, zoom: Zoom, step: f64) -> bool {
        let amount = match zoom {
            Zoom::In => step * self.span(),
            Zoom::Out => -step * self.span(),
        };
        match Self::new(self.min + amount, self.max - amount) {
            Ok(zoomed) => {
                *self = zoomed;
                true
            }
            Err(_) => false,
        }
    }
}

/// Visible metric rectangle of an axis view.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VisibleRange {
    /// Horizontal range.
    pub x: AxisRange,
    /// Vertical range.
    pub y: AxisRange,
}

impl Default for VisibleRange {
    fn default() -> Self {
        Self::UNIT
    }
}

impl VisibleRange {
    /// The `[-1, 1] x [-1, 1]` square.
    pub const UNIT: Self = Self {
        x: AxisRange { min: -1.0, max: 1.0 },
        y: AxisRange { min: -1.0, max: 1.0 },
    };

    /// Creates a range from both axes' bounds.
    ///
    /// # Errors
    /// Returns [`Error::InvalidRange`] for the first invalid axis.
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Result<Self> {
        Ok(Self {
            x: AxisRange::new(x_min, x_max)?,
            y: AxisRange::new(y_min, y_max)?,
        })
    }

    /// Waveform view: `[0, time span]` by `±range/2`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidRange`] for non-positive spans.
    pub fn waveform(time_span_us: f64, range_uv: f64) -> Result<Self> {
        Self::new(0.0, time_span_us, -range_uv / 2.0, range_uv / 2.0)
    }

    /// Lower-left metric corner.
    pub fn min(&self) -> MetricPoint {
        MetricPoint::new(self.x.min(), self.y.min())
    }

    /// Upper-right metric corner.
    pub fn max(&self) -> MetricPoint {
        MetricPoint::new(self.x.max(), self.y.max())
    }

    /// Shifts the view by a metric displacement.
    pub fn pan(&mut self, delta: MetricPoint) {
        self.x.pan(delta.x);
        self.y.pan(delta.y);
    }

    /// Zooms both axes by the same step. Returns false if nothing changed.
    pub fn zoom(&mut self, zoom: Zoom, step: f64) -> bool {
        let (mut x, mut y) = (self.x, self.y);
        if x.zoom(zoom, step) && y.zoom(zoom, step) {
            self.x = x;
            self.y = y;
            true
        } else {
            false
        }
    }
}

/// Canvas size in pixels, both dimensions positive.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PixelSize {
    width: f64,
    height: f64,
}

impl PixelSize {
    /// Creates a canvas size.
    ///
    /// # Errors
    /// Returns [`Error::InvalidCanvas`] for non-positive or non-finite sizes.
    pub fn new(width: f64, height: f64) -> Result<Self> {
        if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
            Ok(Self { width, height })
        } else {
            Err(Error::InvalidCanvas { width, height })
        }
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Whether a screen point lies on the canvas.
    pub fn contains(&self, point: ScreenPoint) -> bool {
        point.x >= 0.0 && point.y >= 0.0 && point.x <= self.width && point.y <= self.height
    }
}

/// Maps a metric point to the screen.
pub fn to_screen(
    point: MetricPoint,
    range: &VisibleRange,
    size: PixelSize,
    y_axis: YAxis,
) -> ScreenPoint {
    let x = (point.x - range.x.min) / range.x.span() * size.width;
    let y = (point.y - range.y.min) / range.y.span() * size.height;
    let y = match y_axis {
        YAxis::Up => size.height - y,
        YAxis::Down => y,
    };
    ScreenPoint::new(x, y)
}

/// Maps a screen point back to metric space; inverse of [`to_screen`].
pub fn to_metric(
    point: ScreenPoint,
    range: &VisibleRange,
    size: PixelSize,
    y_axis: YAxis,
) -> MetricPoint {
    let sy = match y_axis {
        YAxis::Up => size.height - point.y,
        YAxis::Down => point.y,
    };
    MetricPoint::new(
        point.x / size.width * range.x.span() + range.x.min,
        sy / size.height * range.y.span() + range.y.min,
    )
}

/// Transform between one axis view's metric range and its canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mapper {
    range: VisibleRange,
    size: PixelSize,
    y_axis: YAxis,
}

impl Mapper {
    /// Creates a mapper.
    pub fn new(range: VisibleRange, size: PixelSize, y_axis: YAxis) -> Self {
        Self {
            range,
            size,
            y_axis,
        }
    }

    /// Visible metric range.
    #[inline]
    pub fn range(&self) -> &VisibleRange {
        &self.range
    }

    /// Mutable visible range, for pan and zoom.
    #[inline]
    pub fn range_mut(&mut self) -> &mut VisibleRange {
        &mut self.range
    }

    /// Canvas size.
    #[inline]
    pub fn size(&self) -> PixelSize {
        self.size
    }

    /// Replaces the canvas size.
    pub fn set_size(&mut self, size: PixelSize) {
        self.size = size;
    }

    /// Replaces the visible range.
    pub fn set_range(&mut self, range: VisibleRange) {
        self.range = range;
    }

    /// Y orientation.
    #[inline]
    pub fn y_axis(&self) -> YAxis {
        self.y_axis
    }

    /// Metric to screen.
    #[inline]
    pub fn to_screen(&self, point: MetricPoint) -> ScreenPoint {
        to_screen(point, &self.range, self.size, self.y_axis)
    }

    /// Screen to metric.
    #[inline]
    pub fn to_metric(&self, point: ScreenPoint) -> MetricPoint {
        to_metric(point, &self.range, self.size, self.y_axis)
    }

    /// Scales a pixel displacement to a metric displacement.
    pub fn delta_to_metric(&self, delta: ScreenDelta) -> MetricPoint {
        let dx = delta.dx / self.size.width * self.range.x.span();
        let dy = delta.dy / self.size.height * self.range.y.span();
        match self.y_axis {
            YAxis::Up => MetricPoint::new(dx, -dy),
            YAxis::Down => MetricPoint::new(dx, dy),
        }
    }
}
