//! Waveform axis: one channel's spike traces, threshold line and boxes.

use log::debug;
use spikeview_core::{
    BoxUnit, MetricPoint, Result, Rgb, ScreenPoint, SelectionState, SortBox, SortViewConfig,
    Spike, UnitId,
};
use spikeview_geometry::{locate_box, BoxDrag, Emphasis, Mapper, PixelSize, VisibleRange, YAxis};

use crate::cursor::{CursorGlyph, HandleCursor};
use crate::ring::{RedrawKind, SpikeRing};
use crate::state::{AxisEffect, AxisResponse, InteractionState, PointerButton, PointerEvent, PointerKind};

/// One spike drawn on a waveform axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub points: Vec<ScreenPoint>,
    pub color: Rgb,
    /// Newest spike in the buffer.
    pub latest: bool,
}

/// One box of a box unit in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxOutline {
    pub unit: UnitId,
    pub box_index: usize,
    pub color: Rgb,
    /// Top-left pixel.
    pub min: ScreenPoint,
    /// Bottom-right pixel.
    pub max: ScreenPoint,
    pub emphasis: Emphasis,
}

/// Everything needed to paint a waveform axis.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformView {
    pub channel: usize,
    pub range_uv: f64,
    pub threshold_uv: f64,
    /// Pixel row of the threshold line.
    pub threshold_y: f64,
    /// Threshold line is hovered or dragged.
    pub threshold_active: bool,
    pub traces: Vec<Trace>,
    pub boxes: Vec<BoxOutline>,
    pub redraw: RedrawKind,
}

/// Pointer state machine and spike history of one channel.
#[derive(Debug, Clone)]
pub struct WaveformAxis {
    channel: usize,
    mapper: Mapper,
    range_uv: f64,
    threshold_uv: f64,
    time_span_us: f64,
    handle_tolerance_px: f64,
    threshold_tolerance_px: f64,
    ring: SpikeRing,
    state: InteractionState,
}

impl WaveformAxis {
    /// Creates an axis at the configured initial voltage range.
    ///
    /// # Errors
    /// Returns an error if the configured time span or range is not positive.
    pub fn new(
        channel: usize,
        size: PixelSize,
        threshold_uv: f64,
        config: &SortViewConfig,
    ) -> Result<Self> {
        let range_uv = config.initial_range_uv();
        let range = VisibleRange::waveform(config.waveform_time_span_us, range_uv)?;
        Ok(Self {
            channel,
            mapper: Mapper::new(range, size, YAxis::Up),
            range_uv,
            threshold_uv,
            time_span_us: config.waveform_time_span_us,
            handle_tolerance_px: config.handle_tolerance_px,
            threshold_tolerance_px: config.threshold_tolerance_px,
            ring: SpikeRing::with_capacity(config.waveform_buffer_capacity),
            state: InteractionState::Idle,
        })
    }

    pub fn channel(&self) -> usize {
        self.channel
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

    /// Peak-to-peak voltage range shown, in µV.
    pub fn range_uv(&self) -> f64 {
        self.range_uv
    }

    pub fn threshold_uv(&self) -> f64 {
        self.threshold_uv
    }

    /// Moves the threshold line without notifying anyone.
    pub fn set_threshold_uv(&mut self, threshold_uv: f64) {
        self.threshold_uv = threshold_uv;
    }

    /// Shows `±range_uv / 2` vertically.
    ///
    /// # Errors
    /// Returns [`spikeview_core::Error::InvalidRange`] for a non-positive range.
    pub fn set_range_uv(&mut self, range_uv: f64) -> Result<()> {
        self.mapper
            .set_range(VisibleRange::waveform(self.time_span_us, range_uv)?);
        self.range_uv = range_uv;
        Ok(())
    }

    /// Steps to the next range of the configured cycle and returns it.
    ///
    /// # Errors
    /// Returns an error if the cycle contains a non-positive range.
    pub fn cycle_range(&mut self, config: &SortViewConfig) -> Result<f64> {
        let next = config.next_range_uv(self.range_uv);
        self.set_range_uv(next)?;
        debug!("channel {} range -> {next} uV", self.channel);
        Ok(next)
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

    /// Pixel row of the threshold line.
    pub fn threshold_y(&self) -> f64 {
        self.mapper
            .to_screen(MetricPoint::new(0.0, self.threshold_uv))
            .y
    }

    fn near_threshold(&self, y: f64) -> bool {
        (y - self.threshold_y()).abs() < self.threshold_tolerance_px
    }

    fn cursor(&self) -> CursorGlyph {
        match &self.state {
            InteractionState::HoveringThreshold | InteractionState::DraggingThresholdSlider => {
                CursorGlyph::DraggingHand
            }
            InteractionState::HoveringHandle(hit) => hit.handle.cursor(),
            InteractionState::DraggingBox(drag) => drag.handle.cursor(),
            _ => CursorGlyph::Normal,
        }
    }

    fn respond(&self, repaint: bool) -> AxisResponse {
        AxisResponse::new(self.cursor(), repaint)
    }

    /// Routes one pointer event.
    ///
    /// `units` are the box units editable on this axis; a dragged box is
    /// only written while its unit is the `selection`.
    pub fn on_pointer(
        &mut self,
        event: PointerEvent,
        units: &mut [BoxUnit],
        selection: SelectionState,
    ) -> AxisResponse {
        let pos = event.position;
        match event.kind {
            PointerKind::Move => self.hover(pos, units),
            PointerKind::Down if event.button == PointerButton::Secondary => {
                self.ring.clear();
                self.respond(true)
            }
            PointerKind::Down => {
                self.hover(pos, units);
                self.press(pos, units)
            }
            PointerKind::Drag => self.drag(pos, units, selection),
            PointerKind::Up => self.release(units),
            PointerKind::Exit => {
                let hovering = !self.state.is_dragging() && self.state != InteractionState::Idle;
                if hovering {
                    self.state = InteractionState::Idle;
                }
                self.respond(hovering)
            }
        }
    }

    fn hover(&mut self, pos: ScreenPoint, units: &[BoxUnit]) -> AxisResponse {
        if self.state.is_dragging() {
            return self.respond(false);
        }
        let next = if self.near_threshold(pos.y) {
            InteractionState::HoveringThreshold
        } else {
            locate_box(units, pos, &self.mapper, self.handle_tolerance_px)
                .map_or(InteractionState::Idle, InteractionState::HoveringHandle)
        };
        let changed = next != self.state;
        self.state = next;
        self.respond(changed)
    }

    fn press(&mut self, pos: ScreenPoint, units: &[BoxUnit]) -> AxisResponse {
        match self.state {
            InteractionState::HoveringThreshold => {
                self.state = InteractionState::DraggingThresholdSlider;
                self.respond(true)
            }
            InteractionState::HoveringHandle(hit) => {
                let origin = box_at(units, hit.unit, hit.box_index);
                match origin {
                    Some(origin) => {
                        debug!(
                            "channel {}: grab unit {} box {} at {:?}",
                            self.channel, hit.unit, hit.box_index, hit.handle
                        );
                        self.state = InteractionState::DraggingBox(BoxDrag::start(hit, origin, pos));
                        self.respond(true).with_effect(AxisEffect::Select(SelectionState::new(
                            hit.unit,
                            Some(hit.box_index),
                        )))
                    }
                    None => self.deselect(),
                }
            }
            _ => self.deselect(),
        }
    }

    fn deselect(&mut self) -> AxisResponse {
        self.state = InteractionState::Idle;
        self.respond(true)
            .with_effect(AxisEffect::Select(SelectionState::NONE))
    }

    fn drag(&mut self, pos: ScreenPoint, units: &mut [BoxUnit], selection: SelectionState) -> AxisResponse {
        if self.state == InteractionState::HoveringThreshold {
            self.state = InteractionState::DraggingThresholdSlider;
        }
        match self.state {
            InteractionState::DraggingBox(drag) if selection.is_unit(drag.unit) => {
                let moved = drag.update(pos, &self.mapper);
                let slot = units
                    .iter_mut()
                    .find(|u| u.id == drag.unit)
                    .and_then(|u| u.boxes.get_mut(drag.box_index));
                match slot {
                    Some(slot) => {
                        *slot = moved;
                        self.respond(true)
                    }
                    None => self.respond(false),
                }
            }
            InteractionState::DraggingThresholdSlider => {
                let height = self.mapper.size().height();
                let fraction = (pos.y / height).clamp(-1.0, 1.0);
                self.threshold_uv = (0.5 - fraction) * self.range_uv;
                self.respond(true).with_effect(AxisEffect::SetThreshold {
                    channel: self.channel,
                    threshold_uv: self.threshold_uv,
                })
            }
            _ => self.respond(false),
        }
    }

    fn release(&mut self, units: &[BoxUnit]) -> AxisResponse {
        let state = std::mem::take(&mut self.state);
        match state {
            InteractionState::DraggingBox(drag) => {
                let moved = box_at(units, drag.unit, drag.box_index) != Some(drag.origin);
                if moved {
                    debug!(
                        "channel {}: unit {} box {} released",
                        self.channel, drag.unit, drag.box_index
                    );
                    self.respond(true).with_effect(AxisEffect::CommitBoxUnits)
                } else {
                    self.respond(true)
                }
            }
            InteractionState::DraggingThresholdSlider => {
                debug!(
                    "channel {}: threshold set to {:.1} uV",
                    self.channel, self.threshold_uv
                );
                self.respond(true)
            }
            other => {
                self.state = other;
                self.respond(false)
            }
        }
    }

    fn hovered_box(&self) -> Option<(UnitId, usize)> {
        match &self.state {
            InteractionState::HoveringHandle(hit) => Some((hit.unit, hit.box_index)),
            InteractionState::DraggingBox(drag) => Some((drag.unit, drag.box_index)),
            _ => None,
        }
    }

    /// Screen-space outline of a box.
    pub fn box_outline(&self, b: &SortBox) -> (ScreenPoint, ScreenPoint) {
        let a = self.mapper.to_screen(b.min_corner());
        let c = self.mapper.to_screen(b.max_corner());
        (
            ScreenPoint::new(a.x.min(c.x), a.y.min(c.y)),
            ScreenPoint::new(a.x.max(c.x), a.y.max(c.y)),
        )
    }

    fn trace(&self, spike: &Spike, latest: bool) -> Trace {
        #[allow(clippy::cast_precision_loss)]
        let n = spike.samples_per_channel().max(1) as f64;
        let dt = self.time_span_us / n;
        let points = spike
            .channel_microvolts(self.channel)
            .enumerate()
            .map(|(i, uv)| {
                #[allow(clippy::cast_precision_loss)]
                let t = i as f64 * dt;
                self.mapper.to_screen(MetricPoint::new(t, uv))
            })
            .collect();
        Trace {
            points,
            color: spike.color,
            latest,
        }
    }

    /// Paint description of the axis; consumes the pending redraw.
    pub fn view(&mut self, units: &[BoxUnit], selection: SelectionState) -> WaveformView {
        let newest = self.ring.len().saturating_sub(1);
        let traces = self
            .ring
            .iter()
            .enumerate()
            .map(|(i, spike)| self.trace(spike, i == newest))
            .filter(|trace| !trace.points.is_empty())
            .collect();

        let hover = self.hovered_box();
        let boxes = units
            .iter()
            .flat_map(|unit| {
                unit.boxes.iter().enumerate().map(move |(box_index, b)| (unit, box_index, b))
            })
            .map(|(unit, box_index, b)| {
                let (min, max) = self.box_outline(b);
                BoxOutline {
                    unit: unit.id,
                    box_index,
                    color: unit.color,
                    min,
                    max,
                    emphasis: Emphasis::for_box(selection, hover, unit.id, box_index),
                }
            })
            .collect();

        WaveformView {
            channel: self.channel,
            range_uv: self.range_uv,
            threshold_uv: self.threshold_uv,
            threshold_y: self.threshold_y(),
            threshold_active: matches!(
                self.state,
                InteractionState::HoveringThreshold | InteractionState::DraggingThresholdSlider
            ),
            traces,
            boxes,
            redraw: self.ring.take_redraw(),
        }
    }
}

fn box_at(units: &[BoxUnit], unit: UnitId, box_index: usize) -> Option<SortBox> {
    units
        .iter()
        .find(|u| u.id == unit)
        .and_then(|u| u.boxes.get(box_index))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use spikeview_geometry::BoxHandle;

    // 300x200 canvas over [0, 1300] us; 500 uV range puts +-250 at the edges.
    fn axis() -> WaveformAxis {
        let config = SortViewConfig::new()
            .with_waveform_time_span(1300.0)
            .with_waveform_ranges(vec![500.0, 250.0]);
        WaveformAxis::new(0, PixelSize::new(300.0, 200.0).unwrap(), 200.0, &config).unwrap()
    }

    fn units() -> Vec<BoxUnit> {
        let mut unit = BoxUnit::new(UnitId::new(1).unwrap(), Rgb::WHITE);
        unit.boxes.push(SortBox::new(0.0, -50.0, 500.0, 100.0));
        vec![unit]
    }

    #[test]
    fn test_threshold_line_position() {
        let axis = axis();
        // 200 uV of a 500 uV range: 0.1 of the height from the top.
        assert_relative_eq!(axis.threshold_y(), 20.0, epsilon = 1e-9);
    }

    #[test]
    fn test_threshold_beats_box() {
        let mut axis = axis();
        axis.set_threshold_uv(0.0);
        let mut units = units();
        let response = axis.on_pointer(
            PointerEvent::moved(ScreenPoint::new(50.0, 101.0)),
            &mut units,
            SelectionState::NONE,
        );
        assert_eq!(axis.state(), &InteractionState::HoveringThreshold);
        assert!(response.repaint);
    }

    #[test]
    fn test_threshold_drag() {
        let mut axis = axis();
        let mut units = units();
        let sel = SelectionState::NONE;
        axis.on_pointer(PointerEvent::down(ScreenPoint::new(250.0, 22.0)), &mut units, sel);
        assert_eq!(axis.state(), &InteractionState::DraggingThresholdSlider);

        let response =
            axis.on_pointer(PointerEvent::drag(ScreenPoint::new(250.0, 50.0)), &mut units, sel);
        assert_eq!(
            response.effect,
            Some(AxisEffect::SetThreshold {
                channel: 0,
                threshold_uv: 125.0
            })
        );

        // Far above the canvas the fraction clamps to -1.
        axis.on_pointer(PointerEvent::drag(ScreenPoint::new(250.0, -900.0)), &mut units, sel);
        assert_relative_eq!(axis.threshold_uv(), 750.0);

        axis.on_pointer(PointerEvent::up(ScreenPoint::new(250.0, -900.0)), &mut units, sel);
        assert_eq!(axis.state(), &InteractionState::Idle);
    }

    #[test]
    fn test_hover_handle_cursor() {
        let mut axis = axis();
        let mut units = units();
        let response = axis.on_pointer(
            PointerEvent::moved(ScreenPoint::new(115.0, 100.0)),
            &mut units,
            SelectionState::NONE,
        );
        assert_eq!(response.cursor, CursorGlyph::RightEdgeResize);
        match axis.state() {
            InteractionState::HoveringHandle(hit) => assert_eq!(hit.handle, BoxHandle::Right),
            other => panic!("unexpected state {other:?}"),
        }

        let response = axis.on_pointer(PointerEvent::exit(), &mut units, SelectionState::NONE);
        assert_eq!(response.cursor, CursorGlyph::Normal);
        assert_eq!(axis.state(), &InteractionState::Idle);
    }

    #[test]
    fn test_drag_requires_selection() {
        let mut axis = axis();
        let mut units = units();
        let id = units[0].id;
        let original = units[0].boxes[0];

        let down = axis.on_pointer(
            PointerEvent::down(ScreenPoint::new(50.0, 100.0)),
            &mut units,
            SelectionState::NONE,
        );
        assert_eq!(
            down.effect,
            Some(AxisEffect::Select(SelectionState::new(id, Some(0))))
        );

        // Without the selection applied the box stays put.
        axis.on_pointer(
            PointerEvent::drag(ScreenPoint::new(80.0, 100.0)),
            &mut units,
            SelectionState::NONE,
        );
        assert_eq!(units[0].boxes[0], original);

        let selected = SelectionState::new(id, Some(0));
        axis.on_pointer(PointerEvent::drag(ScreenPoint::new(80.0, 100.0)), &mut units, selected);
        assert_relative_eq!(units[0].boxes[0].x, 130.0, epsilon = 1e-9);
        assert_eq!(units[0].boxes[0].w, original.w);

        let up = axis.on_pointer(PointerEvent::up(ScreenPoint::new(80.0, 100.0)), &mut units, selected);
        assert_eq!(up.effect, Some(AxisEffect::CommitBoxUnits));
    }

    #[test]
    fn test_click_without_move_commits_nothing() {
        let mut axis = axis();
        let mut units = units();
        let selected = SelectionState::new(units[0].id, Some(0));
        axis.on_pointer(PointerEvent::down(ScreenPoint::new(50.0, 100.0)), &mut units, selected);
        let up = axis.on_pointer(PointerEvent::up(ScreenPoint::new(50.0, 100.0)), &mut units, selected);
        assert_eq!(up.effect, None);
    }

    #[test]
    fn test_click_on_empty_space_deselects() {
        let mut axis = axis();
        let mut units = units();
        let selected = SelectionState::new(units[0].id, Some(0));
        let response = axis.on_pointer(
            PointerEvent::down(ScreenPoint::new(250.0, 180.0)),
            &mut units,
            selected,
        );
        assert_eq!(response.effect, Some(AxisEffect::Select(SelectionState::NONE)));
    }

    #[test]
    fn test_range_cycle() {
        let mut axis = axis();
        let config = SortViewConfig::new();
        // Starts at 500, so the default cycle continues with 100.
        assert_relative_eq!(axis.cycle_range(&config).unwrap(), 100.0);
        assert_relative_eq!(axis.mapper().range().y.max(), 50.0);
        assert_relative_eq!(axis.cycle_range(&config).unwrap(), 250.0);
        assert_relative_eq!(axis.cycle_range(&config).unwrap(), 500.0);
    }

    #[test]
    fn test_secondary_click_clears_buffer() {
        let mut axis = axis();
        axis.push_spike(Spike::new(
            vec![32768; 40],
            1,
            1.0,
            MetricPoint::ORIGIN,
            Rgb::WHITE,
        )
        .unwrap());
        let event = PointerEvent::down(ScreenPoint::new(10.0, 10.0)).with_button(PointerButton::Secondary);
        let response = axis.on_pointer(event, &mut [], SelectionState::NONE);
        assert!(response.repaint);
        assert!(axis.ring().is_empty());
    }

    #[test]
    fn test_view_traces_and_boxes() {
        let mut axis = axis();
        for gain in [1000.0, 500.0] {
            axis.push_spike(
                Spike::new(
                    vec![32768 + 100; 10],
                    1,
                    gain,
                    MetricPoint::ORIGIN,
                    Rgb::new(1, 2, 3),
                )
                .unwrap(),
            );
        }
        let units = units();
        let view = axis.view(&units, SelectionState::new(units[0].id, Some(0)));

        assert_eq!(view.traces.len(), 2);
        assert!(view.traces[1].latest && !view.traces[0].latest);
        // 100 uV sits 0.3 of the height from the top.
        assert_relative_eq!(view.traces[0].points[0].y, 60.0, epsilon = 1e-9);
        assert_relative_eq!(view.traces[0].points[1].x, 30.0, epsilon = 1e-9);
        assert_eq!(view.redraw, RedrawKind::Incremental(2));

        let outline = view.boxes[0];
        assert_eq!(outline.emphasis, Emphasis::Selected);
        assert_relative_eq!(outline.min.y, 80.0, epsilon = 1e-9);
        assert_relative_eq!(outline.max.y, 120.0, epsilon = 1e-9);
        assert_eq!(axis.view(&units, SelectionState::NONE).redraw, RedrawKind::Nothing);
    }
}
