//! Box unit hit-testing and handle dragging.
//!
//! Hit-testing runs in screen space so the grab band is a fixed number of
//! pixels at every zoom level. Dragging runs in metric space from the box
//! as it was at grab time, so repeated pointer updates never accumulate
//! rounding drift and the attributes a handle does not control are written
//! back untouched.

use spikeview_core::{BoxUnit, MetricPoint, ScreenDelta, ScreenPoint, SortBox, UnitId};

use crate::mapper::{Mapper, YAxis};

/// Interactive zone of a box, named by its screen-space position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoxHandle {
    /// Top-left corner.
    TopLeft,
    /// Top-right corner.
    TopRight,
    /// Bottom-left corner.
    BottomLeft,
    /// Bottom-right corner.
    BottomRight,
    /// Left edge.
    Left,
    /// Right edge.
    Right,
    /// Top edge.
    Top,
    /// Bottom edge.
    Bottom,
    /// Anywhere else inside the grab area; moves the whole box.
    Inside,
}

/// Which side of an axis a handle sits on, in screen order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenSide {
    /// Left or top.
    Start,
    /// Right or bottom.
    End,
}

impl BoxHandle {
    /// Horizontal edge controlled by the handle.
    pub fn horizontal(self) -> Option<ScreenSide> {
        match self {
            Self::TopLeft | Self::BottomLeft | Self::Left => Some(ScreenSide::Start),
            Self::TopRight | Self::BottomRight | Self::Right => Some(ScreenSide::End),
            Self::Top | Self::Bottom | Self::Inside => None,
        }
    }

    /// Vertical edge controlled by the handle.
    pub fn vertical(self) -> Option<ScreenSide> {
        match self {
            Self::TopLeft | Self::TopRight | Self::Top => Some(ScreenSide::Start),
            Self::BottomLeft | Self::BottomRight | Self::Bottom => Some(ScreenSide::End),
            Self::Left | Self::Right | Self::Inside => None,
        }
    }

    /// Returns true for the four corner handles.
    pub fn is_corner(self) -> bool {
        self.horizontal().is_some() && self.vertical().is_some()
    }
}

/// Classifies a screen point against a box.
///
/// The box corners are mapped to the screen and normalized, then the point
/// is tested against a band of `tolerance_px` around them. Corners win over
/// edges and edges over the interior; `None` means the point is outside the
/// expanded rectangle.
pub fn hit_test(
    point: ScreenPoint,
    sort_box: &SortBox,
    mapper: &Mapper,
    tolerance_px: f64,
) -> Option<BoxHandle> {
    let a = mapper.to_screen(MetricPoint::new(sort_box.x, sort_box.y));
    let b = mapper.to_screen(MetricPoint::new(sort_box.x + sort_box.w, sort_box.y + sort_box.h));
    let (left, right) = (a.x.min(b.x), a.x.max(b.x));
    let (top, bottom) = (a.y.min(b.y), a.y.max(b.y));

    let inside_band = point.x >= left - tolerance_px
        && point.x <= right + tolerance_px
        && point.y >= top - tolerance_px
        && point.y <= bottom + tolerance_px;
    if !inside_band {
        return None;
    }

    let near = |value: f64, edge: f64| (value - edge).abs() <= tolerance_px;
    let near_left = near(point.x, left);
    let near_right = near(point.x, right);
    let near_top = near(point.y, top);
    let near_bottom = near(point.y, bottom);

    let handle = if near_left && near_top {
        BoxHandle::TopLeft
    } else if near_right && near_top {
        BoxHandle::TopRight
    } else if near_left && near_bottom {
        BoxHandle::BottomLeft
    } else if near_right && near_bottom {
        BoxHandle::BottomRight
    } else if near_left {
        BoxHandle::Left
    } else if near_right {
        BoxHandle::Right
    } else if near_top {
        BoxHandle::Top
    } else if near_bottom {
        BoxHandle::Bottom
    } else {
        BoxHandle::Inside
    };
    Some(handle)
}

/// Applies a handle drag to the box as it was when grabbed.
///
/// `delta` is the total pointer displacement since the grab. Each handle
/// moves the edge it names on screen and leaves the other fields alone: with
/// a non-negative width, left edges move `x` and shrink `w` by the same
/// amount while right edges only change `w`. With a negative width the raw
/// `x` is the right edge, so the roles swap. Vertical handles map to the
/// metric min/max `y` edge according to the mapper's orientation. Width and
/// height may turn negative when an edge crosses its opposite.
pub fn apply_drag(
    original: &SortBox,
    handle: BoxHandle,
    delta: ScreenDelta,
    mapper: &Mapper,
) -> SortBox {
    let mut b = *original;
    let d = mapper.delta_to_metric(delta);

    if handle == BoxHandle::Inside {
        b.x += d.x;
        b.y += d.y;
        return b;
    }

    // Screen left is always the metric min x edge.
    match handle.horizontal() {
        Some(ScreenSide::Start) => move_edge(&mut b.x, &mut b.w, d.x, false),
        Some(ScreenSide::End) => move_edge(&mut b.x, &mut b.w, d.x, true),
        None => {}
    }

    // Screen top is the metric max edge when y grows upwards.
    let moves_max_y = match (handle.vertical(), mapper.y_axis()) {
        (None, _) => None,
        (Some(ScreenSide::Start), YAxis::Up) | (Some(ScreenSide::End), YAxis::Down) => Some(true),
        (Some(ScreenSide::End), YAxis::Up) | (Some(ScreenSide::Start), YAxis::Down) => Some(false),
    };
    if let Some(max_edge) = moves_max_y {
        move_edge(&mut b.y, &mut b.h, d.y, max_edge);
    }
    b
}

/// Moves the min or max edge of the span `start..start + len` by `d`.
///
/// The raw `start` is the max edge when `len` is negative.
fn move_edge(start: &mut f64, len: &mut f64, d: f64, max_edge: bool) {
    if (*len < 0.0) == max_edge {
        *start += d;
        *len -= d;
    } else {
        *len += d;
    }
}

/// First box under a screen point across a list of units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxHit {
    /// Unit owning the box.
    pub unit: UnitId,
    /// Index of the box within the unit.
    pub box_index: usize,
    /// Zone of the box under the point.
    pub handle: BoxHandle,
}

/// Scans units and their boxes in order and returns the first hit.
pub fn locate_box(
    units: &[BoxUnit],
    point: ScreenPoint,
    mapper: &Mapper,
    tolerance_px: f64,
) -> Option<BoxHit> {
    units.iter().find_map(|unit| {
        unit.boxes.iter().enumerate().find_map(|(box_index, b)| {
            hit_test(point, b, mapper, tolerance_px).map(|handle| BoxHit {
                unit: unit.id,
                box_index,
                handle,
            })
        })
    })
}

/// An in-progress box drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxDrag {
    /// Unit owning the dragged box.
    pub unit: UnitId,
    /// Index of the dragged box.
    pub box_index: usize,
    /// Handle that was grabbed.
    pub handle: BoxHandle,
    /// Box at grab time.
    pub origin: SortBox,
    /// Pointer position at grab time.
    pub grab: ScreenPoint,
}

impl BoxDrag {
    /// Starts a drag from a hit.
    pub fn start(hit: BoxHit, origin: SortBox, grab: ScreenPoint) -> Self {
        Self {
            unit: hit.unit,
            box_index: hit.box_index,
            handle: hit.handle,
            origin,
            grab,
        }
    }

    /// Box for the current pointer position.
    pub fn update(&self, current: ScreenPoint, mapper: &Mapper) -> SortBox {
        apply_drag(&self.origin, self.handle, current - self.grab, mapper)
    }
}
