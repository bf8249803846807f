//! Outline emphasis of boxes and polygons from selection and hover.

use spikeview_core::{SelectionState, UnitId};

/// Visual weight of a shape outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Emphasis {
    /// Not selected, not under the pointer.
    Normal,
    /// Under the pointer.
    Hovered,
    /// Part of the active selection.
    Selected,
}

impl Emphasis {
    /// Emphasis of one box of a box unit.
    pub fn for_box(
        selection: SelectionState,
        hover: Option<(UnitId, usize)>,
        unit: UnitId,
        box_index: usize,
    ) -> Self {
        if selection.is_box(unit, box_index) {
            Self::Selected
        } else if hover == Some((unit, box_index)) {
            Self::Hovered
        } else {
            Self::Normal
        }
    }

    /// Emphasis of a polygon unit.
    pub fn for_unit(selection: SelectionState, hover: Option<UnitId>, unit: UnitId) -> Self {
        if selection.is_unit(unit) {
            Self::Selected
        } else if hover == Some(unit) {
            Self::Hovered
        } else {
            Self::Normal
        }
    }

    /// Outline thickness in pixels.
    pub fn stroke_width(self) -> f32 {
        match self {
            Self::Normal => 1.0,
            Self::Hovered => 2.0,
            Self::Selected => 3.0,
        }
    }
}
