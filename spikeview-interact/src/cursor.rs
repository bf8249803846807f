//! Cursor glyphs requested by the axes.

use spikeview_geometry::BoxHandle;

/// Mouse cursor an axis wants shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CursorGlyph {
    #[default]
    Normal,
    DraggingHand,
    Crosshair,
    TopLeftCornerResize,
    TopRightCornerResize,
    BottomLeftCornerResize,
    BottomRightCornerResize,
    LeftEdgeResize,
    RightEdgeResize,
    TopEdgeResize,
    BottomEdgeResize,
}

/// Cursor shown over a box handle.
pub trait HandleCursor {
    fn cursor(self) -> CursorGlyph;
}

impl HandleCursor for BoxHandle {
    fn cursor(self) -> CursorGlyph {
        match self {
            Self::TopLeft => CursorGlyph::TopLeftCornerResize,
            Self::TopRight => CursorGlyph::TopRightCornerResize,
            Self::BottomLeft => CursorGlyph::BottomLeftCornerResize,
            Self::BottomRight => CursorGlyph::BottomRightCornerResize,
            Self::Left => CursorGlyph::LeftEdgeResize,
            Self::Right => CursorGlyph::RightEdgeResize,
            Self::Top => CursorGlyph::TopEdgeResize,
            Self::Bottom => CursorGlyph::BottomEdgeResize,
            Self::Inside => CursorGlyph::DraggingHand,
        }
    }
}

#[cfg(feature = "egui")]
impl From<CursorGlyph> for egui::CursorIcon {
    fn from(glyph: CursorGlyph) -> Self {
        match glyph {
            CursorGlyph::Normal => Self::Default,
            CursorGlyph::DraggingHand => Self::Grabbing,
            CursorGlyph::Crosshair => Self::Crosshair,
            CursorGlyph::TopLeftCornerResize => Self::ResizeNorthWest,
            CursorGlyph::TopRightCornerResize => Self::ResizeNorthEast,
            CursorGlyph::BottomLeftCornerResize => Self::ResizeSouthWest,
            CursorGlyph::BottomRightCornerResize => Self::ResizeSouthEast,
            CursorGlyph::LeftEdgeResize => Self::ResizeWest,
            CursorGlyph::RightEdgeResize => Self::ResizeEast,
            CursorGlyph::TopEdgeResize => Self::ResizeNorth,
            CursorGlyph::BottomEdgeResize => Self::ResizeSouth,
        }
    }
}
