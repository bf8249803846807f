//! Scripted interaction sessions and their replay.

use log::debug;
use serde::{Deserialize, Serialize};
use spikeview_core::{
    BoxUnit, MetricPoint, PolygonUnit, Rgb, ScreenPoint, SelectionState, SortViewConfig, Spike,
};
use spikeview_geometry::{PixelSize, VisibleRange};
use spikeview_interact::{
    AxisTarget, Command, Key, MemoryEngine, PlotLayout, PointerButton, PointerEvent, PointerKind,
    SortingEngine, SpikePlot,
};

use crate::{CliError, Result};

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
}

impl Canvas {
    fn pixels(self) -> Result<PixelSize> {
        Ok(PixelSize::new(self.width, self.height)?)
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RangeSpec {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisName {
    Waveform,
    Projection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseName {
    Move,
    Down,
    Drag,
    Up,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonName {
    #[default]
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PointerStep {
    pub axis: AxisName,
    #[serde(default)]
    pub channel: usize,
    pub kind: PhaseName,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub button: ButtonName,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpikeStep {
    pub samples: Vec<u16>,
    pub channels: usize,
    pub gain: f64,
    pub projection: Option<MetricPoint>,
    pub color: Option<Rgb>,
}

/// One scripted input.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Press the button with this label.
    Button(String),
    /// Cycle the voltage range of a channel.
    CycleRange(usize),
    /// Press a key: a single character or `Escape`.
    Key(String),
    Pointer(PointerStep),
    Spike(SpikeStep),
}

/// A recorded electrode session.
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub electrode: u32,
    pub channels: usize,
    pub waveform_canvas: Canvas,
    pub projection_canvas: Canvas,
    pub projection_range: Option<RangeSpec>,
    #[serde(default)]
    pub thresholds_uv: Vec<f64>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Outcome of a replay.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub electrode: u32,
    pub steps: usize,
    pub selection: SelectionState,
    pub box_units: Vec<BoxUnit>,
    pub polygon_units: Vec<PolygonUnit>,
    pub thresholds_uv: Vec<f64>,
    pub ranges_uv: Vec<f64>,
    pub projection_range: VisibleRange,
    pub network_events: Vec<String>,
}

fn parse_key(text: &str) -> Option<Key> {
    if text == "Escape" {
        return Some(Key::Escape);
    }
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(Key::Char(c)),
        _ => None,
    }
}

fn pointer_event(step: &PointerStep) -> PointerEvent {
    let kind = match step.kind {
        PhaseName::Move => PointerKind::Move,
        PhaseName::Down => PointerKind::Down,
        PhaseName::Drag => PointerKind::Drag,
        PhaseName::Up => PointerKind::Up,
        PhaseName::Exit => PointerKind::Exit,
    };
    let button = match step.button {
        ButtonName::Primary => PointerButton::Primary,
        ButtonName::Secondary => PointerButton::Secondary,
    };
    PointerEvent::new(kind, ScreenPoint::new(step.x, step.y)).with_button(button)
}

fn session_error(step: usize, message: impl Into<String>) -> CliError {
    CliError::Session {
        step,
        message: message.into(),
    }
}

/// Replays a session against an in-memory engine.
///
/// # Errors
/// Returns an error for invalid canvases, ranges or configuration, and for
/// steps naming unknown buttons, keys, channels or malformed spikes.
pub fn replay(session: &Session, config: SortViewConfig) -> Result<Report> {
    let mut engine = MemoryEngine::new().with_thresholds(session.thresholds_uv.clone());
    if let Some(r) = session.projection_range {
        engine = engine.with_projection_range(VisibleRange::new(r.x_min, r.x_max, r.y_min, r.y_max)?);
    }
    let layout = PlotLayout {
        waveform: session.waveform_canvas.pixels()?,
        projection: session.projection_canvas.pixels()?,
    };
    let plot = SpikePlot::new(session.electrode, session.channels, engine, layout, config)?;
    let feed = plot.feed();
    let axes = plot.kind().channels();

    for (index, step) in session.steps.iter().enumerate() {
        match step {
            Step::Button(label) => {
                let command = Command::from_label(label)
                    .ok_or_else(|| session_error(index, format!("unknown button {label:?}")))?;
                plot.execute(command);
            }
            Step::CycleRange(channel) => {
                if *channel >= axes {
                    return Err(session_error(index, format!("no channel {channel}")));
                }
                plot.execute(Command::CycleRange(*channel));
            }
            Step::Key(text) => {
                let key = parse_key(text)
                    .ok_or_else(|| session_error(index, format!("unknown key {text:?}")))?;
                plot.key(key);
            }
            Step::Pointer(pointer) => {
                let target = match pointer.axis {
                    AxisName::Waveform if pointer.channel < axes => {
                        AxisTarget::Waveform(pointer.channel)
                    }
                    AxisName::Waveform => {
                        return Err(session_error(index, format!("no channel {}", pointer.channel)))
                    }
                    AxisName::Projection => AxisTarget::Projection,
                };
                let response = plot.pointer(target, pointer_event(pointer));
                debug!("step {index}: {:?} -> {:?}", pointer.kind, response.effect);
            }
            Step::Spike(spike) => {
                let spike = Spike::new(
                    spike.samples.clone(),
                    spike.channels,
                    spike.gain,
                    spike.projection.unwrap_or_default(),
                    spike.color.unwrap_or(Rgb::WHITE),
                )
                .map_err(|e| session_error(index, e.to_string()))?;
                feed.push(spike);
            }
        }
    }

    let (box_units, polygon_units, network_events) = plot.with_engine(|engine| {
        (
            engine.box_units(),
            engine.polygon_units(),
            engine.events().iter().map(ToString::to_string).collect(),
        )
    });
    Ok(Report {
        electrode: session.electrode,
        steps: session.steps.len(),
        selection: plot.selection(),
        box_units,
        polygon_units,
        thresholds_uv: (0..axes).filter_map(|c| plot.threshold_uv(c)).collect(),
        ranges_uv: (0..axes).filter_map(|c| plot.range_uv(c)).collect(),
        projection_range: plot.projection_range(),
        network_events,
    })
}
