//! PCA projection axis: projected spikes, polygon units and lasso drawing.

use log::{debug, warn};
use spikeview_core::{
    MetricPoint, PolygonUnit, Rgb, ScreenPoint, SelectionState, SortViewConfig, Spike, UnitId,
};
use spikeview_geometry::{
    locate_polygon, screen_outline, Emphasis, Mapper, PixelSize, PolygonCapture, VisibleRange,
    YAxis, Zoom,
};

use crate::cursor::CursorGlyph;
use crate::ring::{RedrawKind, SpikeRing};
use crate::state::{AxisEffect, AxisResponse, InteractionState, PointerButton, PointerEvent, PointerKind};

/// A spike's projection in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedSpike {
    pub point: ScreenPoint,
    pub color: Rgb,
}

/// A polygon unit in screen space.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonOutline {
    pub unit: UnitId,
    pub color: Rgb,
    /// Closed outline, first vertex repeated last.
    pub outline: Vec<ScreenPoint>,
    pub emphasis: Emphasis,
}

/// Everything needed to paint the projection axis.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionView {
    pub range: VisibleRange,
    pub points: Vec<ProjectedSpike>,
    pub polygons: Vec<PolygonOutline>,
    /// Vertices of the lasso being drawn.
    pub lasso: Vec<ScreenPoint>,
    pub polygon_armed: bool,
    pub redraw: RedrawKind,
}

/// Pointer state machine and spike history of the PCA projection.
#[derive(Debug, Clone)]
pub struct ProjectionAxis {
    mapper: Mapper,
    ring: SpikeRing,
    state: InteractionState,
    polygon_armed: bool,
    last_pointer: ScreenPoint,
    min_pixel_distance: f64,
    min_vertices: usize,
    zoom_step: f64,
}

impl ProjectionAxis {
    pub fn new(size: PixelSize, range: VisibleRange, config: &SortViewConfig) -> Self {
        Self {
            mapper: Mapper::new(range, size, YAxis::Down),
            ring: SpikeRing::with_capacity(config.projection_buffer_capacity),
            state: InteractionState::Idle,
            polygon_armed: false,
            last_pointer: ScreenPoint::new(0.0, 0.0),
            min_pixel_distance: config.polygon_min_pixel_distance,
            min_vertices: config.min_polygon_vertices,
            zoom_step: config.zoom_step,
        }
    }

    pub fn mapper(&self) -> &Mapper {
        &self.mapper
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn ring(&self) -> &SpikeRing {
        &self.ring
    }

    pub fn range(&self) -> VisibleRange {
        *self.mapper.range()
    }

    pub fn set_range(&mut self, range: VisibleRange) {
        self.mapper.set_range(range);
    }

    pub fn resize(&mut self, size: PixelSize) {
        self.mapper.set_size(size);
    }

    pub fn push_spike(&mut self, spike: Spike) {
        self.ring.push(spike);
    }

    pub fn clear(&mut self) {
        self.ring.clear();
    }

    /// Next primary press starts a lasso.
    pub fn arm_polygon(&mut self) {
        debug!("polygon mode armed");
        self.polygon_armed = true;
    }

    pub fn is_polygon_armed(&self) -> bool {
        self.polygon_armed
    }

    /// Leaves polygon mode, dropping any lasso in progress.
    ///
    /// Returns true if there was anything to cancel.
    pub fn cancel_polygon(&mut self) -> bool {
        let drawing = matches!(self.state, InteractionState::DrawingPolygon(_));
        if drawing {
            self.state = InteractionState::Idle;
        }
        let cancelled = drawing || self.polygon_armed;
        self.polygon_armed = false;
        if cancelled {
            debug!("polygon mode cancelled");
        }
        cancelled
    }

    /// Zooms the view by the configured step. Returns false if refused.
    pub fn zoom(&mut self, zoom: Zoom) -> bool {
        self.mapper.range_mut().zoom(zoom, self.zoom_step)
    }

    fn cursor(&self) -> CursorGlyph {
        match self.state {
            InteractionState::DrawingPolygon(_) => CursorGlyph::Crosshair,
            InteractionState::MovingPolygon { .. } | InteractionState::PanningView { .. } => {
                CursorGlyph::DraggingHand
            }
            _ if self.polygon_armed => CursorGlyph::Crosshair,
            _ => CursorGlyph::Normal,
        }
    }

    fn respond(&self, repaint: bool) -> AxisResponse {
        AxisResponse::new(self.cursor(), repaint)
    }

    fn hover_state(&self, pos: ScreenPoint, units: &[PolygonUnit]) -> InteractionState {
        locate_polygon(units, pos, &self.mapper)
            .map_or(InteractionState::Idle, |unit| InteractionState::HoveringPolygon { unit })
    }

    /// Routes one pointer event.
    ///
    /// `units` are the polygon units of the electrode; a polygon is only
    /// moved while its unit is the `selection`.
    pub fn on_pointer(
        &mut self,
        event: PointerEvent,
        units: &mut [PolygonUnit],
        selection: SelectionState,
    ) -> AxisResponse {
        let pos = event.position;
        match event.kind {
            PointerKind::Move => {
                if self.state.is_dragging() {
                    return self.respond(false);
                }
                let next = self.hover_state(pos, units);
                let changed = next != self.state;
                self.state = next;
                self.respond(changed)
            }
            PointerKind::Down if event.button == PointerButton::Secondary => {
                self.last_pointer = pos;
                self.ring.clear();
                self.respond(true)
            }
            PointerKind::Down => self.press(pos, units),
            PointerKind::Drag => self.drag(pos, units, selection),
            PointerKind::Up => self.release(),
            PointerKind::Exit => {
                let hovering = matches!(self.state, InteractionState::HoveringPolygon { .. });
                if hovering {
                    self.state = InteractionState::Idle;
                }
                self.respond(hovering)
            }
        }
    }

    fn press(&mut self, pos: ScreenPoint, units: &[PolygonUnit]) -> AxisResponse {
        self.last_pointer = pos;
        if self.polygon_armed {
            let mut capture = PolygonCapture::begin();
            capture.add_if_far_enough(pos, self.min_pixel_distance);
            self.state = InteractionState::DrawingPolygon(capture);
            return self.respond(true);
        }
        self.state = self.hover_state(pos, units);
        let selection = match self.state {
            InteractionState::HoveringPolygon { unit } => SelectionState::new(unit, None),
            _ => SelectionState::NONE,
        };
        self.respond(true).with_effect(AxisEffect::Select(selection))
    }

    fn drag(
        &mut self,
        pos: ScreenPoint,
        units: &mut [PolygonUnit],
        selection: SelectionState,
    ) -> AxisResponse {
        if let InteractionState::DrawingPolygon(capture) = &mut self.state {
            let added = capture.add_if_far_enough(pos, self.min_pixel_distance);
            return self.respond(added);
        }

        let last = self.last_pointer;
        let started = match self.state {
            InteractionState::HoveringPolygon { unit } if selection.is_unit(unit) => {
                Some(InteractionState::MovingPolygon { unit, last })
            }
            InteractionState::Idle | InteractionState::HoveringPolygon { .. } => {
                Some(InteractionState::PanningView { last })
            }
            _ => None,
        };
        if let Some(started) = started {
            self.state = started;
        }

        match self.state {
            InteractionState::MovingPolygon { unit, last } if selection.is_unit(unit) => {
                let delta = self.mapper.delta_to_metric(pos - last);
                if let Some(target) = units.iter_mut().find(|u| u.id == unit) {
                    target.polygon.pan(delta);
                }
                self.state = InteractionState::MovingPolygon { unit, last: pos };
                self.respond(true)
            }
            InteractionState::PanningView { last } => {
                let delta = self.mapper.delta_to_metric(pos - last);
                self.mapper
                    .range_mut()
                    .pan(MetricPoint::ORIGIN - delta);
                self.state = InteractionState::PanningView { last: pos };
                self.respond(true)
            }
            _ => self.respond(false),
        }
    }

    fn release(&mut self) -> AxisResponse {
        let state = std::mem::take(&mut self.state);
        match state {
            InteractionState::DrawingPolygon(capture) => {
                self.polygon_armed = false;
                match capture.commit(&self.mapper, self.min_vertices) {
                    Ok(polygon) => {
                        debug!("lasso closed with {} vertices", polygon.points.len());
                        self.respond(true)
                            .with_effect(AxisEffect::CommitPolygon(polygon))
                    }
                    Err(e) => {
                        warn!("discarding lasso: {e}");
                        self.respond(true)
                    }
                }
            }
            InteractionState::MovingPolygon { unit, .. } => {
                debug!("polygon unit {unit} released");
                self.respond(true)
                    .with_effect(AxisEffect::CommitPolygonUnits)
            }
            InteractionState::PanningView { .. } => self.respond(false),
            other => {
                self.state = other;
                self.respond(false)
            }
        }
    }

    /// Paint description of the axis; consumes the pending redraw.
    pub fn view(&mut self, units: &[PolygonUnit], selection: SelectionState) -> ProjectionView {
        let size = self.mapper.size();
        let points = self
            .ring
            .iter()
            .map(|spike| ProjectedSpike {
                point: self.mapper.to_screen(spike.projection),
                color: spike.color,
            })
            .filter(|p| size.contains(p.point))
            .collect();

        let hover = match self.state {
            InteractionState::HoveringPolygon { unit } | InteractionState::MovingPolygon { unit, .. } => {
                Some(unit)
            }
            _ => None,
        };
        let polygons = units
            .iter()
            .map(|unit| PolygonOutline {
                unit: unit.id,
                color: unit.color,
                outline: screen_outline(&unit.polygon, &self.mapper),
                emphasis: Emphasis::for_unit(selection, hover, unit.id),
            })
            .collect();

        let lasso = match &self.state {
            InteractionState::DrawingPolygon(capture) => capture.points().to_vec(),
            _ => Vec::new(),
        };

        ProjectionView {
            range: self.range(),
            points,
            polygons,
            lasso,
            polygon_armed: self.polygon_armed,
            redraw: self.ring.take_redraw(),
        }
    }
}
