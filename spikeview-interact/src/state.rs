//! Pointer events, per-axis interaction states and their outcomes.

use spikeview_core::{Polygon, ScreenPoint, SelectionState, UnitId};
use spikeview_geometry::{BoxDrag, BoxHit, PolygonCapture};

use crate::cursor::CursorGlyph;

/// Phase of a pointer gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    /// Moved with no button held.
    Move,
    /// Button pressed.
    Down,
    /// Moved with a button held.
    Drag,
    /// Button released.
    Up,
    /// Left the axis.
    Exit,
}

/// Button driving a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerButton {
    #[default]
    Primary,
    Secondary,
}

/// Pointer input in axis-local pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub position: ScreenPoint,
    pub button: PointerButton,
}

impl PointerEvent {
    /// Creates a primary-button event.
    pub fn new(kind: PointerKind, position: ScreenPoint) -> Self {
        Self {
            kind,
            position,
            button: PointerButton::Primary,
        }
    }

    pub fn moved(position: ScreenPoint) -> Self {
        Self::new(PointerKind::Move, position)
    }

    pub fn down(position: ScreenPoint) -> Self {
        Self::new(PointerKind::Down, position)
    }

    pub fn drag(position: ScreenPoint) -> Self {
        Self::new(PointerKind::Drag, position)
    }

    pub fn up(position: ScreenPoint) -> Self {
        Self::new(PointerKind::Up, position)
    }

    pub fn exit() -> Self {
        Self::new(PointerKind::Exit, ScreenPoint::new(-1.0, -1.0))
    }

    /// Same event with a different button.
    #[must_use]
    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }
}

/// What an axis is doing with the pointer.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    /// Pointer within the grab band of the threshold line.
    HoveringThreshold,
    /// Pointer over a box zone.
    HoveringHandle(BoxHit),
    /// Pointer over a polygon unit.
    HoveringPolygon { unit: UnitId },
    /// A box handle is being dragged.
    DraggingBox(BoxDrag),
    /// The threshold line is being dragged.
    DraggingThresholdSlider,
    /// The selected polygon unit is being moved.
    MovingPolygon { unit: UnitId, last: ScreenPoint },
    /// A lasso is being drawn.
    DrawingPolygon(PolygonCapture),
    /// The projection view is being panned.
    PanningView { last: ScreenPoint },
}

impl InteractionState {
    /// Returns true while a button-held gesture is in progress.
    pub fn is_dragging(&self) -> bool {
        matches!(
            self,
            Self::DraggingBox(_)
                | Self::DraggingThresholdSlider
                | Self::MovingPolygon { .. }
                | Self::DrawingPolygon(_)
                | Self::PanningView { .. }
        )
    }

    /// Short name for log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::HoveringThreshold => "hovering-threshold",
            Self::HoveringHandle(_) => "hovering-handle",
            Self::HoveringPolygon { .. } => "hovering-polygon",
            Self::DraggingBox(_) => "dragging-box",
            Self::DraggingThresholdSlider => "dragging-threshold",
            Self::MovingPolygon { .. } => "moving-polygon",
            Self::DrawingPolygon(_) => "drawing-polygon",
            Self::PanningView { .. } => "panning-view",
        }
    }
}

/// Side effect an axis asks the plot to carry out.
#[derive(Debug, Clone, PartialEq)]
pub enum AxisEffect {
    /// Replace the electrode selection.
    Select(SelectionState),
    /// Hand the edited box units to the engine.
    CommitBoxUnits,
    /// Hand the edited polygon units to the engine.
    CommitPolygonUnits,
    /// Register a new polygon unit.
    CommitPolygon(Polygon),
    /// Forward a dragged threshold.
    SetThreshold { channel: usize, threshold_uv: f64 },
}

/// Result of routing one pointer event to an axis.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AxisResponse {
    pub cursor: CursorGlyph,
    pub repaint: bool,
    pub effect: Option<AxisEffect>,
}

impl AxisResponse {
    pub(crate) fn new(cursor: CursorGlyph, repaint: bool) -> Self {
        Self {
            cursor,
            repaint,
            effect: None,
        }
    }

    #[must_use]
    pub(crate) fn with_effect(mut self, effect: AxisEffect) -> Self {
        self.effect = Some(effect);
        self
    }
}
