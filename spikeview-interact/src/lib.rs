//! spikeview-interact: Pointer-driven spike-sorting axes.
//!
//! This crate turns pointer and keyboard input into edits of box and
//! polygon units and keeps the recent spikes needed to redraw:
//! - [`SpikeRing`] - fixed-capacity spike history per axis
//! - [`WaveformAxis`] / [`ProjectionAxis`] - per-axis interaction state machines
//! - [`SpikePlot`] - electrode-level controller shared with the spike producer
//! - [`SortingEngine`] - the sorting engine the edits are committed to
//!

pub mod command;
pub mod cursor;
pub mod engine;
pub mod plot;
pub mod projection;
pub mod ring;
pub mod state;
pub mod waveform;

pub use command::{Command, Key};
pub use cursor::{CursorGlyph, HandleCursor};
pub use engine::{MemoryEngine, NetworkEvent, SortingEngine, DEFAULT_BOX, DEFAULT_THRESHOLD_UV};
pub use plot::{
    AxisTarget, PlotKind, PlotLayout, PlotSnapshot, SpikeFeed, SpikePlot, BOX_CHANNEL,
};
pub use projection::{PolygonOutline, ProjectedSpike, ProjectionAxis, ProjectionView};
pub use ring::{RedrawKind, SpikeRing};
pub use state::{
    AxisEffect, AxisResponse, InteractionState, PointerButton, PointerEvent, PointerKind,
};
pub use waveform::{BoxOutline, Trace, WaveformAxis, WaveformView};
