//! Electrode-level controller tying the axes to a sorting engine.
//!
//! A [`SpikePlot`] owns one waveform axis per channel, the projection axis,
//! the selection and local copies of the unit lists, all behind a single
//! mutex. The UI thread routes input and takes snapshots through it while a
//! producer thread pushes spikes through a [`SpikeFeed`].

use std::sync::Arc;

use log::{debug, info, warn};
use parking_lot::Mutex;
use spikeview_core::{
    BoxUnit, Polygon, PolygonUnit, Result, SelectionState, SortViewConfig, Spike,
};
use spikeview_geometry::{PixelSize, VisibleRange, Zoom};

use crate::command::{Command, Key};
use crate::engine::{NetworkEvent, SortingEngine};
use crate::projection::{ProjectionAxis, ProjectionView};
use crate::state::{AxisEffect, AxisResponse, PointerEvent};
use crate::waveform::{WaveformAxis, WaveformView};

/// Channel whose waveform axis shows and edits box units.
pub const BOX_CHANNEL: usize = 0;

/// Electrode geometry, by channel count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotKind {
    Single,
    Stereo,
    Tetrode,
}

impl PlotKind {
    /// Kind for a channel count; unsupported counts fall back to a single channel.
    pub fn from_channels(channels: usize) -> Self {
        match channels {
            1 => Self::Single,
            2 => Self::Stereo,
            4 => Self::Tetrode,
            n => {
                warn!("unsupported channel count {n}, showing a single channel");
                Self::Single
            }
        }
    }

    /// Number of waveform axes.
    pub fn channels(self) -> usize {
        match self {
            Self::Single => 1,
            Self::Stereo => 2,
            Self::Tetrode => 4,
        }
    }
}

/// Canvas sizes of the axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotLayout {
    pub waveform: PixelSize,
    pub projection: PixelSize,
}

/// Axis a pointer event is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisTarget {
    Waveform(usize),
    Projection,
}

/// Paint description of a whole electrode plot.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSnapshot {
    pub electrode: u32,
    pub selection: SelectionState,
    pub waveforms: Vec<WaveformView>,
    pub projection: ProjectionView,
}

struct PlotState<E> {
    electrode: u32,
    config: SortViewConfig,
    engine: E,
    selection: SelectionState,
    box_units: Vec<BoxUnit>,
    polygon_units: Vec<PolygonUnit>,
    waveforms: Vec<WaveformAxis>,
    projection: ProjectionAxis,
}

impl<E: SortingEngine> PlotState<E> {
    fn sync_units(&mut self) {
        self.box_units = self.engine.box_units();
        self.polygon_units = self.engine.polygon_units();
    }

    fn select(&mut self, selection: SelectionState) {
        if selection != self.selection {
            debug!(
                "electrode {}: selection {:?} -> {:?}",
                self.electrode,
                self.selection.to_raw(),
                selection.to_raw()
            );
        }
        self.selection = selection;
        self.engine.set_selection(selection);
    }

    fn emit(&mut self, event: NetworkEvent) {
        info!("{event}");
        self.engine.add_network_event(event);
    }

    fn pointer(&mut self, target: AxisTarget, event: PointerEvent) -> AxisResponse {
        let response = match target {
            AxisTarget::Waveform(channel) => {
                let mut no_units: [BoxUnit; 0] = [];
                let units: &mut [BoxUnit] = if channel == BOX_CHANNEL {
                    &mut self.box_units
                } else {
                    &mut no_units
                };
                match self.waveforms.get_mut(channel) {
                    Some(axis) => axis.on_pointer(event, units, self.selection),
                    None => return AxisResponse::default(),
                }
            }
            AxisTarget::Projection => {
                self.projection
                    .on_pointer(event, &mut self.polygon_units, self.selection)
            }
        };
        if let Some(effect) = &response.effect {
            self.apply(effect.clone());
        }
        response
    }

    fn apply(&mut self, effect: AxisEffect) {
        match effect {
            AxisEffect::Select(selection) => self.select(selection),
            AxisEffect::CommitBoxUnits => {
                debug!("electrode {}: committing box units", self.electrode);
                self.engine.update_box_units(&self.box_units);
            }
            AxisEffect::CommitPolygonUnits => {
                debug!("electrode {}: committing polygon units", self.electrode);
                self.engine.update_polygon_units(&self.polygon_units);
            }
            AxisEffect::CommitPolygon(polygon) => self.register_polygon(polygon),
            AxisEffect::SetThreshold {
                channel,
                threshold_uv,
            } => self.engine.set_channel_threshold(channel, threshold_uv),
        }
    }

    fn register_polygon(&mut self, polygon: Polygon) {
        let id = match self.engine.generate_unit_id() {
            Ok(id) => id,
            Err(e) => {
                warn!("electrode {}: dropping polygon: {e}", self.electrode);
                return;
            }
        };
        let color = self.engine.unit_color(id);
        self.engine.add_polygon_unit(PolygonUnit { id, color, polygon });
        self.sync_units();
        self.emit(NetworkEvent::NewUnit {
            electrode: self.electrode,
            unit: id,
            color,
        });
    }

    fn execute(&mut self, command: Command) -> bool {
        match command {
            Command::AddBoxUnit => {
                let id = match self.engine.add_box_unit(BOX_CHANNEL) {
                    Ok(id) => id,
                    Err(e) => {
                        warn!("electrode {}: {e}", self.electrode);
                        return false;
                    }
                };
                let color = self.engine.unit_color(id);
                self.sync_units();
                self.select(SelectionState::new(id, Some(0)));
                self.emit(NetworkEvent::NewUnit {
                    electrode: self.electrode,
                    unit: id,
                    color,
                });
                true
            }
            Command::AddPolygonUnit => {
                self.projection.arm_polygon();
                true
            }
            Command::DeleteUnit => {
                let Some(unit) = self.selection.unit else {
                    return false;
                };
                self.engine.remove_unit(unit);
                self.sync_units();
                self.emit(NetworkEvent::RemoveUnit {
                    electrode: self.electrode,
                    unit,
                });
                let fallback = self
                    .box_units
                    .last()
                    .map_or(SelectionState::NONE, |u| SelectionState::new(u.id, Some(0)));
                self.select(fallback);
                true
            }
            Command::AddBox => {
                let Some(unit) = self.selection.unit else {
                    return false;
                };
                self.engine.add_box_to_unit(BOX_CHANNEL, unit);
                self.sync_units();
                true
            }
            Command::DeleteBox => {
                let (Some(unit), Some(box_index)) = (self.selection.unit, self.selection.box_index)
                else {
                    return false;
                };
                self.engine.remove_box_from_unit(unit, box_index);
                self.sync_units();
                self.select(SelectionState::new(unit, None));
                true
            }
            Command::RePca => {
                self.engine.re_pca();
                true
            }
            Command::ZoomIn => self.projection.zoom(Zoom::In),
            Command::ZoomOut => self.projection.zoom(Zoom::Out),
            Command::CycleRange(channel) => match self.waveforms.get_mut(channel) {
                Some(axis) => match axis.cycle_range(&self.config) {
                    Ok(_) => true,
                    Err(e) => {
                        warn!("channel {channel}: {e}");
                        false
                    }
                },
                None => false,
            },
            Command::ClearPlots => {
                for axis in &mut self.waveforms {
                    axis.clear();
                }
                self.projection.clear();
                true
            }
            Command::CancelPolygon => self.projection.cancel_polygon(),
        }
    }

    fn push(&mut self, spike: Spike) {
        for axis in &mut self.waveforms {
            axis.push_spike(spike.clone());
        }
        self.projection.push_spike(spike);
    }

    fn snapshot(&mut self) -> PlotSnapshot {
        let selection = self.selection;
        let box_units = &self.box_units;
        let waveforms = self
            .waveforms
            .iter_mut()
            .map(|axis| {
                let units: &[BoxUnit] = if axis.channel() == BOX_CHANNEL {
                    box_units
                } else {
                    &[]
                };
                axis.view(units, selection)
            })
            .collect();
        PlotSnapshot {
            electrode: self.electrode,
            selection,
            waveforms,
            projection: self.projection.view(&self.polygon_units, selection),
        }
    }
}

/// Spike display and unit editor of one electrode.
pub struct SpikePlot<E> {
    shared: Arc<Mutex<PlotState<E>>>,
    kind: PlotKind,
}

impl<E> Clone for SpikePlot<E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            kind: self.kind,
        }
    }
}

impl<E: SortingEngine> SpikePlot<E> {
    /// Builds the axes for `channels` and loads units, thresholds and the
    /// PCA range from the engine.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn new(
        electrode: u32,
        channels: usize,
        engine: E,
        layout: PlotLayout,
        config: SortViewConfig,
    ) -> Result<Self> {
        config.validate()?;
        let kind = PlotKind::from_channels(channels);
        let waveforms = (0..kind.channels())
            .map(|channel| {
                WaveformAxis::new(
                    channel,
                    layout.waveform,
                    engine.channel_threshold(channel),
                    &config,
                )
            })
            .collect::<Result<Vec<_>>>()?;
        let projection = ProjectionAxis::new(layout.projection, engine.projection_range(), &config);
        let state = PlotState {
            electrode,
            selection: engine.selection(),
            box_units: engine.box_units(),
            polygon_units: engine.polygon_units(),
            config,
            engine,
            waveforms,
            projection,
        };
        debug!("electrode {electrode}: {kind:?} plot ready");
        Ok(Self {
            shared: Arc::new(Mutex::new(state)),
            kind,
        })
    }

    pub fn kind(&self) -> PlotKind {
        self.kind
    }

    pub fn electrode(&self) -> u32 {
        self.shared.lock().electrode
    }

    /// Handle for the thread delivering spikes.
    pub fn feed(&self) -> SpikeFeed<E> {
        SpikeFeed {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Routes a pointer event to an axis and applies its outcome.
    pub fn pointer(&self, target: AxisTarget, event: PointerEvent) -> AxisResponse {
        self.shared.lock().pointer(target, event)
    }

    /// Runs a command. Returns false if it had nothing to act on.
    pub fn execute(&self, command: Command) -> bool {
        debug!("command {command:?}");
        self.shared.lock().execute(command)
    }

    /// Runs the command bound to a button label.
    pub fn press_button(&self, label: &str) -> bool {
        match Command::from_label(label) {
            Some(command) => self.execute(command),
            None => {
                warn!("no command bound to button {label:?}");
                false
            }
        }
    }

    /// Runs the command bound to a key. Returns false for unbound keys.
    pub fn key(&self, key: Key) -> bool {
        key.command().is_some_and(|command| self.execute(command))
    }

    /// Reloads the PCA extent from the engine, dropping pan and zoom.
    pub fn reset_projection_range(&self) {
        let mut state = self.shared.lock();
        let range = state.engine.projection_range();
        state.projection.set_range(range);
    }

    pub fn resize(&self, layout: PlotLayout) {
        let mut state = self.shared.lock();
        for axis in &mut state.waveforms {
            axis.resize(layout.waveform);
        }
        state.projection.resize(layout.projection);
    }

    /// Paint description of every axis; consumes pending redraws.
    pub fn snapshot(&self) -> PlotSnapshot {
        self.shared.lock().snapshot()
    }

    pub fn selection(&self) -> SelectionState {
        self.shared.lock().selection
    }

    pub fn box_units(&self) -> Vec<BoxUnit> {
        self.shared.lock().box_units.clone()
    }

    pub fn polygon_units(&self) -> Vec<PolygonUnit> {
        self.shared.lock().polygon_units.clone()
    }

    pub fn threshold_uv(&self, channel: usize) -> Option<f64> {
        self.shared
            .lock()
            .waveforms
            .get(channel)
            .map(WaveformAxis::threshold_uv)
    }

    pub fn range_uv(&self, channel: usize) -> Option<f64> {
        self.shared
            .lock()
            .waveforms
            .get(channel)
            .map(WaveformAxis::range_uv)
    }

    pub fn projection_range(&self) -> VisibleRange {
        self.shared.lock().projection.range()
    }

    pub fn is_polygon_armed(&self) -> bool {
        self.shared.lock().projection.is_polygon_armed()
    }

    /// Runs `f` against the engine while holding the plot lock.
    pub fn with_engine<R>(&self, f: impl FnOnce(&E) -> R) -> R {
        f(&self.shared.lock().engine)
    }
}

/// Producer-side handle of a [`SpikePlot`].
pub struct SpikeFeed<E> {
    shared: Arc<Mutex<PlotState<E>>>,
}

impl<E> Clone for SpikeFeed<E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<E: SortingEngine> SpikeFeed<E> {
    /// Adds a spike to every axis of the plot.
    pub fn push(&self, spike: Spike) {
        self.shared.lock().push(spike);
    }
}
