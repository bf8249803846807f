//! Points in metric and screen space, plus display colours.

use std::ops::{Add, Sub};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A point in metric space.
///
/// For waveform axes `x` is microseconds and `y` is microvolts; for the
/// projection axis both are raw principal-component units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MetricPoint {
    pub x: f64,
    pub y: f64,
}

impl MetricPoint {
    /// Creates a new metric point.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The origin.
    pub const ORIGIN: Self = Self::new(0.0, 0.0);
}

impl Add for MetricPoint {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for MetricPoint {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// A point in pixel space, origin at the top-left of the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    /// Creates a new screen point.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point, in pixels².
    #[inline]
    pub fn distance_squared(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// A pixel displacement between two screen points.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScreenDelta {
    pub dx: f64,
    pub dy: f64,
}

impl ScreenDelta {
    /// Creates a new screen displacement.
    #[inline]
    pub const fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }
}

impl Sub for ScreenPoint {
    type Output = ScreenDelta;

    #[inline]
    fn sub(self, rhs: Self) -> ScreenDelta {
        ScreenDelta::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Add<ScreenDelta> for ScreenPoint {
    type Output = Self;

    #[inline]
    fn add(self, rhs: ScreenDelta) -> Self {
        Self::new(self.x + rhs.dx, self.y + rhs.dy)
    }
}

/// RGB display colour assigned to units and spikes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Creates a new colour.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(0xff, 0xff, 0xff);
    pub const GREY: Self = Self::new(0x80, 0x80, 0x80);
}
