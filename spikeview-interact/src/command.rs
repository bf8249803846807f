//! Button and keyboard commands of an electrode plot.

use std::fmt;

/// An action triggered by a button or key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Create a box unit with one default box and select it.
    AddBoxUnit,
    /// Arm polygon drawing on the projection axis.
    AddPolygonUnit,
    /// Remove the selected unit.
    DeleteUnit,
    /// Append a box to the selected unit.
    AddBox,
    /// Remove the selected box.
    DeleteBox,
    /// Recompute the principal components.
    RePca,
    /// Shrink the projection view.
    ZoomIn,
    /// Grow the projection view.
    ZoomOut,
    /// Step a waveform axis to the next voltage range.
    CycleRange(usize),
    /// Drop every buffered spike.
    ClearPlots,
    /// Leave polygon drawing mode without creating a unit.
    CancelPolygon,
}

const BUTTONS: [(&str, Command); 9] = [
    ("Add box unit", Command::AddBoxUnit),
    ("Add polygon unit", Command::AddPolygonUnit),
    ("Del unit", Command::DeleteUnit),
    ("Add box", Command::AddBox),
    ("Del box", Command::DeleteBox),
    ("Re-PCA", Command::RePca),
    ("+", Command::ZoomIn),
    ("-", Command::ZoomOut),
    ("\u{2212}", Command::ZoomOut),
];

impl Command {
    /// Command bound to a button label.
    pub fn from_label(label: &str) -> Option<Self> {
        BUTTONS
            .iter()
            .find(|(text, _)| *text == label)
            .map(|&(_, command)| command)
    }

    /// Label of the button bound to this command, if any.
    pub fn label(self) -> Option<&'static str> {
        BUTTONS
            .iter()
            .find(|(_, command)| *command == self)
            .map(|&(text, _)| text)
    }
}

/// A key press routed to a plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Escape,
}

const KEYS: [(Key, Command); 2] = [
    (Key::Char('c'), Command::ClearPlots),
    (Key::Escape, Command::CancelPolygon),
];

impl Key {
    /// Command bound to this key.
    pub fn command(self) -> Option<Command> {
        KEYS.iter()
            .find(|(key, _)| *key == self)
            .map(|&(_, command)| command)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Char(c) => write!(f, "{c}"),
            Self::Escape => f.write_str("Escape"),
        }
    }
}
