//! Polygon lasso capture and projection-space polygon helpers.

use spikeview_core::{MetricPoint, Polygon, PolygonUnit, ScreenPoint, UnitId};
use thiserror::Error;

use crate::mapper::Mapper;

/// Reasons a captured lasso cannot become a polygon.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolygonCommitError {
    /// Not enough vertices were captured to enclose an area.
    #[error("polygon needs at least {min} vertices, captured {count}")]
    TooFewPoints {
        /// Captured vertex count.
        count: usize,
        /// Required vertex count.
        min: usize,
    },
}

/// Screen-space vertices captured while the user draws a lasso.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolygonCapture {
    points: Vec<ScreenPoint>,
}

impl PolygonCapture {
    /// Starts an empty capture.
    pub fn begin() -> Self {
        Self::default()
    }

    /// Appends `point` if it is the first vertex or lies further than
    /// `min_px` from the last captured vertex. Returns true if appended.
    pub fn add_if_far_enough(&mut self, point: ScreenPoint, min_px: f64) -> bool {
        let far_enough = self
            .points
            .last()
            .is_none_or(|last| last.distance_squared(&point) > min_px * min_px);
        if far_enough {
            self.points.push(point);
        }
        far_enough
    }

    /// Captured vertices.
    pub fn points(&self) -> &[ScreenPoint] {
        &self.points
    }

    /// Number of captured vertices.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Converts the capture to a metric polygon with zero offset.
    ///
    /// # Errors
    /// Returns [`PolygonCommitError::TooFewPoints`] when fewer than
    /// `min_vertices` (and never fewer than three) were captured.
    pub fn commit(&self, mapper: &Mapper, min_vertices: usize) -> Result<Polygon, PolygonCommitError> {
        let min = min_vertices.max(spikeview_core::unit::MIN_POLYGON_VERTICES);
        if self.points.len() < min {
            return Err(PolygonCommitError::TooFewPoints {
                count: self.points.len(),
                min,
            });
        }
        Ok(Polygon {
            points: self.points.iter().map(|&p| mapper.to_metric(p)).collect(),
            offset: MetricPoint::ORIGIN,
        })
    }
}

/// Closed screen outline of a polygon (first vertex repeated at the end).
///
/// Empty for polygons that are not drawable.
pub fn screen_outline(polygon: &Polygon, mapper: &Mapper) -> Vec<ScreenPoint> {
    if !polygon.is_valid() {
        return Vec::new();
    }
    let mut outline: Vec<ScreenPoint> = polygon.vertices().map(|p| mapper.to_screen(p)).collect();
    outline.push(outline[0]);
    outline
}

/// First polygon unit containing the screen point.
pub fn locate_polygon(units: &[PolygonUnit], point: ScreenPoint, mapper: &Mapper) -> Option<UnitId> {
    let metric = mapper.to_metric(point);
    units
        .iter()
        .find(|unit| unit.polygon.contains(metric))
        .map(|unit| unit.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::{PixelSize, VisibleRange, YAxis};
    use approx::assert_relative_eq;
    use spikeview_core::Rgb;

    fn mapper() -> Mapper {
        Mapper::new(
            VisibleRange::new(-10.0, 10.0, -10.0, 10.0).unwrap(),
            PixelSize::new(200.0, 200.0).unwrap(),
            YAxis::Down,
        )
    }

    fn triangle_capture() -> PolygonCapture {
        let mut capture = PolygonCapture::begin();
        for p in [(100.0, 50.0), (150.0, 150.0), (50.0, 150.0)] {
            assert!(capture.add_if_far_enough(ScreenPoint::new(p.0, p.1), 6.0));
        }
        capture
    }

    #[test]
    fn test_decimation() {
        let mut capture = PolygonCapture::begin();
        assert!(capture.add_if_far_enough(ScreenPoint::new(10.0, 10.0), 6.0));
        assert!(!capture.add_if_far_enough(ScreenPoint::new(13.0, 13.0), 6.0));
        // Exactly 6px away is not far enough.
        assert!(!capture.add_if_far_enough(ScreenPoint::new(16.0, 10.0), 6.0));
        assert!(capture.add_if_far_enough(ScreenPoint::new(16.5, 10.0), 6.0));
        assert_eq!(capture.len(), 2);
    }

    #[test]
    fn test_commit_maps_to_metric() {
        let polygon = triangle_capture().commit(&mapper(), 3).unwrap();
        assert_eq!(polygon.offset, MetricPoint::ORIGIN);
        assert_eq!(polygon.points.len(), 3);
        assert_relative_eq!(polygon.points[0].x, 0.0);
        assert_relative_eq!(polygon.points[0].y, -5.0);
        assert!(polygon.contains(MetricPoint::new(0.0, 1.0)));
    }

    #[test]
    fn test_commit_rejects_short_capture() {
        let mut capture = PolygonCapture::begin();
        capture.add_if_far_enough(ScreenPoint::new(0.0, 0.0), 6.0);
        capture.add_if_far_enough(ScreenPoint::new(50.0, 50.0), 6.0);
        assert_eq!(
            capture.commit(&mapper(), 3),
            Err(PolygonCommitError::TooFewPoints { count: 2, min: 3 })
        );
        // A lower configured minimum never admits degenerate polygons.
        assert!(capture.commit(&mapper(), 1).is_err());
    }

    #[test]
    fn test_outline_and_locate() {
        let m = mapper();
        let mut polygon = triangle_capture().commit(&m, 3).unwrap();
        let outline = screen_outline(&polygon, &m);
        assert_eq!(outline.len(), 4);
        assert_eq!(outline.first(), outline.last());
        assert_relative_eq!(outline[1].x, 150.0, epsilon = 1e-9);

        let unit = PolygonUnit {
            id: UnitId::new(9).unwrap(),
            color: Rgb::WHITE,
            polygon: polygon.clone(),
        };
        let center = ScreenPoint::new(100.0, 120.0);
        assert_eq!(locate_polygon(std::slice::from_ref(&unit), center, &m), Some(unit.id));
        assert_eq!(locate_polygon(&[unit], ScreenPoint::new(5.0, 5.0), &m), None);

        polygon.pan(MetricPoint::new(2.0, 0.0));
        let moved = screen_outline(&polygon, &m);
        assert_relative_eq!(moved[0].x, 120.0, epsilon = 1e-9);
    }

    #[test]
    fn test_outline_of_degenerate_polygon_is_empty() {
        let polygon = Polygon {
            points: vec![MetricPoint::ORIGIN],
            offset: MetricPoint::ORIGIN,
        };
        assert!(screen_outline(&polygon, &mapper()).is_empty());
    }
}
