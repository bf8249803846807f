//! The sorting engine the plot commits its edits to.
//!
//! The engine owns the authoritative unit model of an electrode. The plot
//! keeps local copies of the unit lists for hit-testing and painting,
//! mutates them while the pointer is down and hands them back on release.

use std::fmt;

use spikeview_core::{BoxUnit, Error, PolygonUnit, Result, Rgb, SelectionState, SortBox, UnitId};
use spikeview_geometry::VisibleRange;

/// Threshold reported for channels the engine knows nothing about.
pub const DEFAULT_THRESHOLD_UV: f64 = 50.0;

/// Box added by [`MemoryEngine`] to new box units and on "add box".
pub const DEFAULT_BOX: SortBox = SortBox::new(50.0, -50.0, 300.0, 100.0);

/// Message broadcast to the acquisition network when units change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkEvent {
    /// A unit was created on an electrode.
    NewUnit {
        electrode: u32,
        unit: UnitId,
        color: Rgb,
    },
    /// A unit was removed from an electrode.
    RemoveUnit { electrode: u32, unit: UnitId },
}

impl fmt::Display for NetworkEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NewUnit {
                electrode,
                unit,
                color,
            } => write!(
                f,
                "NewUnit {electrode} {unit} {} {} {}",
                color.r, color.g, color.b
            ),
            Self::RemoveUnit { electrode, unit } => write!(f, "RemoveUnit {electrode} {unit}"),
        }
    }
}

/// Unit, threshold and PCA model of one electrode.
pub trait SortingEngine {
    /// Selection as last mirrored to the engine.
    fn selection(&self) -> SelectionState;

    /// Mirrors the plot's selection.
    fn set_selection(&mut self, selection: SelectionState);

    /// Current box units.
    fn box_units(&self) -> Vec<BoxUnit>;

    /// Current polygon units.
    fn polygon_units(&self) -> Vec<PolygonUnit>;

    /// Replaces the box units after an interactive edit.
    fn update_box_units(&mut self, units: &[BoxUnit]);

    /// Replaces the polygon units after an interactive edit.
    fn update_polygon_units(&mut self, units: &[PolygonUnit]);

    /// Reserves a fresh unit identifier.
    ///
    /// # Errors
    /// Returns [`Error::UnitIdsExhausted`] when no identifier is left.
    fn generate_unit_id(&mut self) -> Result<UnitId>;

    /// Display colour assigned to a unit identifier.
    fn unit_color(&self, unit: UnitId) -> Rgb;

    /// Registers a polygon unit built by the plot.
    fn add_polygon_unit(&mut self, unit: PolygonUnit);

    /// Creates a box unit with one default box and returns its identifier.
    ///
    /// # Errors
    /// Fails like [`SortingEngine::generate_unit_id`].
    fn add_box_unit(&mut self, channel: usize) -> Result<UnitId>;

    /// Removes a unit of either shape.
    fn remove_unit(&mut self, unit: UnitId);

    /// Appends a default box to a box unit.
    fn add_box_to_unit(&mut self, channel: usize, unit: UnitId);

    /// Removes one box of a box unit.
    fn remove_box_from_unit(&mut self, unit: UnitId, box_index: usize);

    /// Recomputes the principal components.
    fn re_pca(&mut self);

    /// Extent of the projected spikes.
    fn projection_range(&self) -> VisibleRange;

    /// Detection threshold of a channel in µV.
    fn channel_threshold(&self, channel: usize) -> f64;

    /// Sets the detection threshold of a channel in µV.
    fn set_channel_threshold(&mut self, channel: usize, threshold_uv: f64);

    /// Queues a message for the acquisition network.
    fn add_network_event(&mut self, event: NetworkEvent);
}

fn palette_color(index: usize) -> Rgb {
    const PALETTE: [Rgb; 10] = [
        Rgb::new(0x4a, 0x9e, 0xff),
        Rgb::new(0xef, 0x44, 0x44),
        Rgb::new(0x10, 0xb9, 0x81),
        Rgb::new(0xf5, 0x9e, 0x0b),
        Rgb::new(0x8b, 0x5c, 0xff),
        Rgb::new(0xf4, 0x72, 0xb6),
        Rgb::new(0x22, 0xc5, 0xe5),
        Rgb::new(0x84, 0xcc, 0x16),
        Rgb::new(0xf9, 0x73, 0x16),
        Rgb::new(0x06, 0xb6, 0xd4),
    ];
    PALETTE[index % PALETTE.len()]
}

/// In-process [`SortingEngine`] with sequential identifiers.
#[derive(Debug, Clone)]
pub struct MemoryEngine {
    next_id: Option<UnitId>,
    selection: SelectionState,
    box_units: Vec<BoxUnit>,
    polygon_units: Vec<PolygonUnit>,
    thresholds: Vec<f64>,
    projection_range: VisibleRange,
    events: Vec<NetworkEvent>,
    pca_runs: usize,
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryEngine {
    /// Creates an engine without units.
    pub fn new() -> Self {
        Self {
            next_id: Some(UnitId::FIRST),
            selection: SelectionState::NONE,
            box_units: Vec::new(),
            polygon_units: Vec::new(),
            thresholds: Vec::new(),
            projection_range: VisibleRange::UNIT,
            events: Vec::new(),
            pca_runs: 0,
        }
    }

    /// Sets the PCA extent reported to the projection axis.
    #[must_use]
    pub fn with_projection_range(mut self, range: VisibleRange) -> Self {
        self.projection_range = range;
        self
    }

    /// Sets per-channel thresholds in µV.
    #[must_use]
    pub fn with_thresholds(mut self, thresholds: Vec<f64>) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Network events emitted so far, oldest first.
    pub fn events(&self) -> &[NetworkEvent] {
        &self.events
    }

    /// Number of PCA recomputations requested.
    pub fn pca_runs(&self) -> usize {
        self.pca_runs
    }

    fn box_unit_mut(&mut self, unit: UnitId) -> Option<&mut BoxUnit> {
        self.box_units.iter_mut().find(|u| u.id == unit)
    }
}

impl SortingEngine for MemoryEngine {
    fn selection(&self) -> SelectionState {
        self.selection
    }

    fn set_selection(&mut self, selection: SelectionState) {
        self.selection = selection;
    }

    fn box_units(&self) -> Vec<BoxUnit> {
        self.box_units.clone()
    }

    fn polygon_units(&self) -> Vec<PolygonUnit> {
        self.polygon_units.clone()
    }

    fn update_box_units(&mut self, units: &[BoxUnit]) {
        self.box_units = units.to_vec();
    }

    fn update_polygon_units(&mut self, units: &[PolygonUnit]) {
        self.polygon_units = units.to_vec();
    }

    fn generate_unit_id(&mut self) -> Result<UnitId> {
        let id = self.next_id.ok_or(Error::UnitIdsExhausted)?;
        self.next_id = id.next();
        Ok(id)
    }

    fn unit_color(&self, unit: UnitId) -> Rgb {
        palette_color(unit.get().saturating_sub(1) as usize)
    }

    fn add_polygon_unit(&mut self, unit: PolygonUnit) {
        self.polygon_units.push(unit);
    }

    fn add_box_unit(&mut self, _channel: usize) -> Result<UnitId> {
        let id = self.generate_unit_id()?;
        let mut unit = BoxUnit::new(id, self.unit_color(id));
        unit.boxes.push(DEFAULT_BOX);
        self.box_units.push(unit);
        Ok(id)
    }

    fn remove_unit(&mut self, unit: UnitId) {
        self.box_units.retain(|u| u.id != unit);
        self.polygon_units.retain(|u| u.id != unit);
        if self.selection.is_unit(unit) {
            self.selection = SelectionState::NONE;
        }
    }

    fn add_box_to_unit(&mut self, _channel: usize, unit: UnitId) {
        if let Some(u) = self.box_unit_mut(unit) {
            u.boxes.push(DEFAULT_BOX);
        }
    }

    fn remove_box_from_unit(&mut self, unit: UnitId, box_index: usize) {
        if let Some(u) = self.box_unit_mut(unit) {
            if box_index < u.boxes.len() {
                u.boxes.remove(box_index);
            }
        }
    }

    fn re_pca(&mut self) {
        self.pca_runs += 1;
    }

    fn projection_range(&self) -> VisibleRange {
        self.projection_range
    }

    fn channel_threshold(&self, channel: usize) -> f64 {
        self.thresholds
            .get(channel)
            .copied()
            .unwrap_or(DEFAULT_THRESHOLD_UV)
    }

    fn set_channel_threshold(&mut self, channel: usize, threshold_uv: f64) {
        if self.thresholds.len() <= channel {
            self.thresholds.resize(channel + 1, DEFAULT_THRESHOLD_UV);
        }
        self.thresholds[channel] = threshold_uv;
    }

    fn add_network_event(&mut self, event: NetworkEvent) {
        self.events.push(event);
    }
}
