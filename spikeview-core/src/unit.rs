//! Classification units and the shapes that define them.

use std::fmt;

use crate::{Error, MetricPoint, Result, Rgb};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Minimum number of vertices for a closed polygon.
pub const MIN_POLYGON_VERTICES: usize = 3;

/// Identifier of a sorted unit, always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u32", into = "u32"))]
pub struct UnitId(u32);

impl UnitId {
    /// The first identifier handed out by an engine.
    pub const FIRST: Self = Self(1);

    /// Creates a unit id, `None` for zero.
    #[inline]
    pub fn new(id: u32) -> Option<Self> {
        (id > 0).then_some(Self(id))
    }

    /// Interprets a legacy signed id where anything `<= 0` means "no unit".
    #[inline]
    pub fn from_raw(raw: i64) -> Option<Self> {
        u32::try_from(raw).ok().and_then(Self::new)
    }

    /// Returns the raw id.
    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }

    /// The identifier following this one, `None` past `u32::MAX`.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl TryFrom<u32> for UnitId {
    type Error = Error;

    fn try_from(id: u32) -> Result<Self> {
        Self::new(id).ok_or(Error::InvalidUnitId(id))
    }
}

impl From<UnitId> for u32 {
    fn from(id: UnitId) -> Self {
        id.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Rectangular classification region in waveform space.
///
/// `x`/`w` are microseconds and `y`/`h` microvolts. Width and height may
/// go negative while a handle is dragged past the opposite edge; use
/// [`SortBox::normalized`] before hit-testing or drawing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SortBox {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl SortBox {
    /// Creates a new box.
    #[inline]
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Equivalent box with non-negative width and height.
    ///
    /// Fields of an already normalized box are returned unchanged.
    pub fn normalized(&self) -> Self {
        let (x, w) = if self.w < 0.0 {
            (self.x + self.w, -self.w)
        } else {
            (self.x, self.w)
        };
        let (y, h) = if self.h < 0.0 {
            (self.y + self.h, -self.h)
        } else {
            (self.y, self.h)
        };
        Self { x, y, w, h }
    }

    /// Metric corner with the smallest coordinates.
    pub fn min_corner(&self) -> MetricPoint {
        let b = self.normalized();
        MetricPoint::new(b.x, b.y)
    }

    /// Metric corner with the largest coordinates.
    pub fn max_corner(&self) -> MetricPoint {
        let b = self.normalized();
        MetricPoint::new(b.x + b.w, b.y + b.h)
    }

    /// Whether a metric point lies inside the box (edges inclusive).
    pub fn contains(&self, point: MetricPoint) -> bool {
        let min = self.min_corner();
        let max = self.max_corner();
        point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
    }
}

/// Closed polygon in projection space, moved by its offset.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Polygon {
    pub points: Vec<MetricPoint>,
    pub offset: MetricPoint,
}

impl Polygon {
    /// Creates a polygon with zero offset.
    ///
    /// # Errors
    /// Returns [`Error::TooFewVertices`] for fewer than three points.
    pub fn new(points: Vec<MetricPoint>) -> Result<Self> {
        if points.len() < MIN_POLYGON_VERTICES {
            return Err(Error::TooFewVertices {
                count: points.len(),
                min: MIN_POLYGON_VERTICES,
            });
        }
        Ok(Self {
            points,
            offset: MetricPoint::ORIGIN,
        })
    }

    /// Whether the polygon can be drawn and hit-tested.
    pub fn is_valid(&self) -> bool {
        self.points.len() >= MIN_POLYGON_VERTICES
    }

    /// Vertices with the offset applied.
    pub fn vertices(&self) -> impl Iterator<Item = MetricPoint> + '_ {
        self.points.iter().map(move |&p| p + self.offset)
    }

    /// Even-odd ray casting test; always false for invalid polygons.
    pub fn contains(&self, point: MetricPoint) -> bool {
        if !self.is_valid() {
            return false;
        }
        let p = point - self.offset;
        let n = self.points.len();
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[j];
            if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    /// Moves the polygon by adding to its offset; vertices are untouched.
    pub fn pan(&mut self, delta: MetricPoint) {
        self.offset = self.offset + delta;
    }
}

/// Unit classified by one or more boxes on the waveform axes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoxUnit {
    pub id: UnitId,
    pub color: Rgb,
    pub boxes: Vec<SortBox>,
}

impl BoxUnit {
    /// Creates a box unit without boxes.
    pub fn new(id: UnitId, color: Rgb) -> Self {
        Self {
            id,
            color,
            boxes: Vec::new(),
        }
    }
}

/// Unit classified by a polygon on the projection axis.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PolygonUnit {
    pub id: UnitId,
    pub color: Rgb,
    pub polygon: Polygon,
}

/// The active `(unit, box)` selection of an electrode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SelectionState {
    pub unit: Option<UnitId>,
    pub box_index: Option<usize>,
}

impl SelectionState {
    /// Nothing selected.
    pub const NONE: Self = Self {
        unit: None,
        box_index: None,
    };

    /// Selects a unit and optionally one of its boxes.
    pub fn new(unit: UnitId, box_index: Option<usize>) -> Self {
        Self {
            unit: Some(unit),
            box_index,
        }
    }

    /// Builds a selection from the legacy `-1` sentinel pair.
    pub fn from_raw(unit: i64, box_index: i64) -> Self {
        match UnitId::from_raw(unit) {
            Some(id) => Self::new(id, usize::try_from(box_index).ok()),
            None => Self::NONE,
        }
    }

    /// Legacy `(unit, box)` pair with `-1` for "none".
    pub fn to_raw(self) -> (i64, i64) {
        let unit = self.unit.map_or(-1, |id| i64::from(id.get()));
        let box_index = self
            .box_index
            .and_then(|b| i64::try_from(b).ok())
            .unwrap_or(-1);
        (unit, box_index)
    }

    /// Returns true if `unit` is the selected unit.
    pub fn is_unit(&self, unit: UnitId) -> bool {
        self.unit == Some(unit)
    }

    /// Returns true if the given box of `unit` is selected.
    pub fn is_box(&self, unit: UnitId, box_index: usize) -> bool {
        self.unit == Some(unit) && self.box_index == Some(box_index)
    }
}
