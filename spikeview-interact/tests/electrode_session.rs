#![allow(clippy::float_cmp)]
use std::thread;

use approx::assert_relative_eq;
use spikeview_core::config::WAVEFORM_TIME_SPAN_US;
use spikeview_core::{MetricPoint, Rgb, ScreenPoint, SelectionState, SortViewConfig, Spike};
use spikeview_geometry::{Emphasis, PixelSize, VisibleRange};
use spikeview_interact::{
    AxisEffect, AxisTarget, Command, CursorGlyph, Key, MemoryEngine, NetworkEvent, PlotLayout,
    PointerButton, PointerEvent, RedrawKind, SortingEngine, SpikePlot, DEFAULT_BOX,
};

const ELECTRODE: u32 = 3;
const WAVE: AxisTarget = AxisTarget::Waveform(0);
const PCA: AxisTarget = AxisTarget::Projection;

fn layout() -> PlotLayout {
    PlotLayout {
        waveform: PixelSize::new(300.0, 200.0).unwrap(),
        projection: PixelSize::new(200.0, 200.0).unwrap(),
    }
}

// Projection canvas shows [-10, 10]^2 at 10 px per unit.
fn plot(channels: usize) -> SpikePlot<MemoryEngine> {
    let engine = MemoryEngine::new()
        .with_projection_range(VisibleRange::new(-10.0, 10.0, -10.0, 10.0).unwrap());
    SpikePlot::new(ELECTRODE, channels, engine, layout(), SortViewConfig::new()).unwrap()
}

fn events(plot: &SpikePlot<MemoryEngine>) -> Vec<String> {
    plot.with_engine(|e| e.events().iter().map(ToString::to_string).collect())
}

fn pt(x: f64, y: f64) -> ScreenPoint {
    ScreenPoint::new(x, y)
}

fn draw_lasso(plot: &SpikePlot<MemoryEngine>, points: &[ScreenPoint]) {
    plot.execute(Command::AddPolygonUnit);
    plot.pointer(PCA, PointerEvent::down(points[0]));
    for &p in &points[1..] {
        plot.pointer(PCA, PointerEvent::drag(p));
    }
    plot.pointer(PCA, PointerEvent::up(points[points.len() - 1]));
}

#[test]
fn test_add_box_unit_selects_and_announces() {
    let plot = plot(1);
    assert!(plot.press_button("Add box unit"));

    let units = plot.box_units();
    assert_eq!(units.len(), 1);
    assert_eq!(units[0].boxes, vec![DEFAULT_BOX]);
    assert_eq!(plot.selection(), SelectionState::new(units[0].id, Some(0)));
    assert_eq!(plot.with_engine(|e| e.selection()), plot.selection());
    assert_eq!(events(&plot), vec!["NewUnit 3 1 74 158 255"]);
}

#[test]
fn test_box_drag_commits_on_release() {
    let plot = plot(1);
    plot.execute(Command::AddBoxUnit);
    plot.execute(Command::AddBox);
    assert_eq!(plot.box_units()[0].boxes.len(), 2);

    // Default box spans x 11.25..78.75 px and y 60..140 px.
    let hover = plot.pointer(WAVE, PointerEvent::moved(pt(45.0, 100.0)));
    assert_eq!(hover.cursor, CursorGlyph::DraggingHand);

    let down = plot.pointer(WAVE, PointerEvent::down(pt(45.0, 100.0)));
    let unit = plot.box_units()[0].id;
    assert_eq!(down.effect, Some(AxisEffect::Select(SelectionState::new(unit, Some(0)))));

    plot.pointer(WAVE, PointerEvent::drag(pt(60.0, 100.0)));
    plot.pointer(WAVE, PointerEvent::drag(pt(75.0, 100.0)));
    let dx = 30.0 / 300.0 * WAVEFORM_TIME_SPAN_US;
    assert_relative_eq!(plot.box_units()[0].boxes[0].x, DEFAULT_BOX.x + dx, epsilon = 1e-9);
    // Not committed while the pointer is down.
    assert_eq!(plot.with_engine(|e| e.box_units()[0].boxes[0]), DEFAULT_BOX);

    let up = plot.pointer(WAVE, PointerEvent::up(pt(75.0, 100.0)));
    assert_eq!(up.effect, Some(AxisEffect::CommitBoxUnits));
    let committed = plot.with_engine(|e| e.box_units()[0].boxes[0]);
    assert_relative_eq!(committed.x, DEFAULT_BOX.x + dx, epsilon = 1e-9);
    assert_eq!(committed.w, DEFAULT_BOX.w);
    assert_eq!(plot.with_engine(|e| e.box_units()[0].boxes[1]), DEFAULT_BOX);

    let snapshot = plot.snapshot();
    let outlines = &snapshot.waveforms[0].boxes;
    assert_eq!(outlines.len(), 2);
    assert_eq!(outlines[0].emphasis, Emphasis::Selected);
    assert_eq!(outlines[1].emphasis, Emphasis::Normal);
}

#[test]
fn test_delete_unit_falls_back_to_last_box_unit() {
    let plot = plot(1);
    plot.execute(Command::AddBoxUnit);
    plot.execute(Command::AddBoxUnit);
    plot.execute(Command::AddBoxUnit);
    let ids: Vec<_> = plot.box_units().iter().map(|u| u.id).collect();

    // Select the first unit by clicking its box.
    plot.pointer(WAVE, PointerEvent::down(pt(45.0, 100.0)));
    plot.pointer(WAVE, PointerEvent::up(pt(45.0, 100.0)));
    assert_eq!(plot.selection(), SelectionState::new(ids[0], Some(0)));

    assert!(plot.press_button("Del unit"));
    assert_eq!(plot.selection(), SelectionState::new(ids[2], Some(0)));
    assert_eq!(events(&plot).last().map(String::as_str), Some("RemoveUnit 3 1"));

    plot.execute(Command::DeleteUnit);
    plot.execute(Command::DeleteUnit);
    assert!(plot.box_units().is_empty());
    assert_eq!(plot.selection(), SelectionState::NONE);
    assert!(!plot.execute(Command::DeleteUnit));
}

#[test]
fn test_delete_box_keeps_unit_selected() {
    let plot = plot(1);
    plot.execute(Command::AddBoxUnit);
    let unit = plot.box_units()[0].id;
    assert!(plot.press_button("Del box"));
    assert!(plot.box_units()[0].boxes.is_empty());
    assert_eq!(plot.selection(), SelectionState::new(unit, None));
    assert!(!plot.execute(Command::DeleteBox));
}

#[test]
fn test_polygon_lasso_creates_unit() {
    let plot = plot(1);
    draw_lasso(&plot, &[pt(50.0, 50.0), pt(150.0, 50.0), pt(150.0, 150.0), pt(50.0, 150.0)]);

    let units = plot.polygon_units();
    assert_eq!(units.len(), 1);
    assert!(units[0].polygon.contains(MetricPoint::ORIGIN));
    assert!(!plot.is_polygon_armed());
    // A new polygon unit is announced but not selected.
    assert_eq!(plot.selection(), SelectionState::NONE);
    assert_eq!(events(&plot), vec!["NewUnit 3 1 74 158 255"]);
}

#[test]
fn test_short_lasso_registers_nothing() {
    let plot = plot(1);
    draw_lasso(&plot, &[pt(50.0, 50.0), pt(52.0, 52.0), pt(120.0, 50.0)]);
    assert!(plot.polygon_units().is_empty());
    assert!(events(&plot).is_empty());
    assert!(!plot.is_polygon_armed());
    // The identifier sequence is untouched.
    plot.execute(Command::AddBoxUnit);
    assert_eq!(plot.box_units()[0].id.get(), 1);
}

#[test]
fn test_escape_cancels_lasso() {
    let plot = plot(1);
    plot.execute(Command::AddPolygonUnit);
    plot.pointer(PCA, PointerEvent::down(pt(50.0, 50.0)));
    plot.pointer(PCA, PointerEvent::drag(pt(150.0, 50.0)));
    plot.pointer(PCA, PointerEvent::drag(pt(150.0, 150.0)));
    assert_eq!(plot.snapshot().projection.lasso.len(), 3);

    assert!(plot.key(Key::Escape));
    plot.pointer(PCA, PointerEvent::up(pt(150.0, 150.0)));
    assert!(plot.polygon_units().is_empty());
    assert!(plot.snapshot().projection.lasso.is_empty());
}

#[test]
fn test_move_selected_polygon() {
    let plot = plot(1);
    draw_lasso(&plot, &[pt(50.0, 50.0), pt(150.0, 50.0), pt(150.0, 150.0), pt(50.0, 150.0)]);
    let id = plot.polygon_units()[0].id;

    plot.pointer(PCA, PointerEvent::down(pt(100.0, 100.0)));
    assert_eq!(plot.selection(), SelectionState::new(id, None));
    plot.pointer(PCA, PointerEvent::drag(pt(110.0, 100.0)));
    plot.pointer(PCA, PointerEvent::drag(pt(120.0, 130.0)));
    assert_eq!(plot.with_engine(|e| e.polygon_units()[0].polygon.offset), MetricPoint::ORIGIN);

    let up = plot.pointer(PCA, PointerEvent::up(pt(120.0, 130.0)));
    assert_eq!(up.effect, Some(AxisEffect::CommitPolygonUnits));
    let offset = plot.with_engine(|e| e.polygon_units()[0].polygon.offset);
    assert_relative_eq!(offset.x, 2.0, epsilon = 1e-9);
    assert_relative_eq!(offset.y, 3.0, epsilon = 1e-9);
    assert_eq!(plot.projection_range(), VisibleRange::new(-10.0, 10.0, -10.0, 10.0).unwrap());
}

#[test]
fn test_pan_and_zoom_projection() {
    let plot = plot(1);
    plot.pointer(PCA, PointerEvent::down(pt(100.0, 100.0)));
    plot.pointer(PCA, PointerEvent::drag(pt(100.0, 80.0)));
    plot.pointer(PCA, PointerEvent::up(pt(100.0, 80.0)));
    let range = plot.projection_range();
    assert_relative_eq!(range.y.min(), -8.0, epsilon = 1e-9);
    assert_relative_eq!(range.y.max(), 12.0, epsilon = 1e-9);

    assert!(plot.press_button("+"));
    assert_relative_eq!(plot.projection_range().x.max(), 8.0, epsilon = 1e-9);
    assert!(plot.press_button("-"));

    plot.reset_projection_range();
    assert_eq!(plot.projection_range(), VisibleRange::new(-10.0, 10.0, -10.0, 10.0).unwrap());
}

#[test]
fn test_threshold_drag_reaches_engine() {
    let plot = plot(2);
    let target = AxisTarget::Waveform(1);
    // 50 uV on a 250 uV range sits at y = 60.
    plot.pointer(target, PointerEvent::moved(pt(200.0, 62.0)));
    plot.pointer(target, PointerEvent::down(pt(200.0, 62.0)));
    plot.pointer(target, PointerEvent::drag(pt(200.0, 150.0)));
    plot.pointer(target, PointerEvent::up(pt(200.0, 150.0)));

    let expected = (0.5 - 150.0 / 200.0) * 250.0;
    assert_relative_eq!(plot.threshold_uv(1).unwrap(), expected);
    assert_relative_eq!(plot.with_engine(|e| e.channel_threshold(1)), expected);
    assert_relative_eq!(plot.threshold_uv(0).unwrap(), 50.0);
}

#[test]
fn test_range_cycle_per_channel() {
    let plot = plot(4);
    assert_eq!(plot.range_uv(2), Some(250.0));
    plot.execute(Command::CycleRange(2));
    assert_eq!(plot.range_uv(2), Some(500.0));
    plot.execute(Command::CycleRange(2));
    plot.execute(Command::CycleRange(2));
    assert_eq!(plot.range_uv(2), Some(250.0));
    assert_eq!(plot.range_uv(0), Some(250.0));
}

#[test]
fn test_boxes_only_on_first_channel() {
    let plot = plot(2);
    plot.execute(Command::AddBoxUnit);
    let second = plot.pointer(AxisTarget::Waveform(1), PointerEvent::moved(pt(45.0, 100.0)));
    assert_eq!(second.cursor, CursorGlyph::Normal);
    let snapshot = plot.snapshot();
    assert_eq!(snapshot.waveforms[0].boxes.len(), 1);
    assert!(snapshot.waveforms[1].boxes.is_empty());
}

#[test]
fn test_feed_from_producer_thread() {
    let plot = plot(4);
    let feed = plot.feed();
    let producer = thread::spawn(move || {
        for i in 0..8u16 {
            let samples = vec![32768 + i; 4 * 40];
            let spike = Spike::new(samples, 4, 1.0, MetricPoint::new(0.0, 0.0), Rgb::WHITE).unwrap();
            feed.push(spike);
        }
    });
    producer.join().unwrap();

    let snapshot = plot.snapshot();
    for view in &snapshot.waveforms {
        assert_eq!(view.traces.len(), 5);
        assert_eq!(view.redraw, RedrawKind::Full);
        assert!(view.traces[4].latest);
    }
    assert_eq!(snapshot.projection.points.len(), 8);
    assert_eq!(snapshot.projection.redraw, RedrawKind::Incremental(8));

    assert!(plot.key(Key::Char('c')));
    let cleared = plot.snapshot();
    assert!(cleared.waveforms[0].traces.is_empty());
    assert_eq!(cleared.projection.redraw, RedrawKind::Full);
}

#[test]
fn test_secondary_click_clears_one_axis() {
    let plot = plot(1);
    let feed = plot.feed();
    let spike = Spike::new(vec![32800; 40], 1, 1.0, MetricPoint::ORIGIN, Rgb::WHITE).unwrap();
    feed.push(spike);
    let event = PointerEvent::down(pt(10.0, 10.0))
        .with_button(PointerButton::Secondary);
    plot.pointer(PCA, event);

    let snapshot = plot.snapshot();
    assert!(snapshot.projection.points.is_empty());
    assert_eq!(snapshot.waveforms[0].traces.len(), 1);
}

#[test]
fn test_pointer_exit_drops_hover() {
    let plot = plot(1);
    plot.execute(Command::AddBoxUnit);
    plot.pointer(WAVE, PointerEvent::moved(pt(45.0, 100.0)));
    let exit = plot.pointer(WAVE, PointerEvent::exit());
    assert!(exit.repaint);
    assert_eq!(exit.cursor, CursorGlyph::Normal);
    assert_eq!(plot.snapshot().waveforms[0].boxes[0].emphasis, Emphasis::Selected);
}

#[test]
fn test_network_event_tokens() {
    let unit = spikeview_core::UnitId::new(12).unwrap();
    let created = NetworkEvent::NewUnit {
        electrode: 0,
        unit,
        color: Rgb::new(1, 2, 3),
    };
    assert_eq!(created.to_string(), "NewUnit 0 12 1 2 3");
    assert_eq!(
        NetworkEvent::RemoveUnit { electrode: 7, unit }.to_string(),
        "RemoveUnit 7 12"
    );
}
