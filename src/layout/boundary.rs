//! Column walls.
//!
//! A wall is a polyline normalized into segments `x = a·y + b`, each valid
//! over its own y-range. Walls are immutable once built and shared by
//! reference count, so duplicated fitters probe the same segments.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};
use crate::model::Rect;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallSegment {
    pub min_y: f64,
    pub max_y: f64,
    pub a: f64,
    pub b: f64,
}

impl WallSegment {
    pub fn contains(&self, y: f64) -> bool {
        y >= self.min_y && y <= self.max_y
    }

    pub fn x_at(&self, y: f64) -> f64 {
        self.a * y + self.b
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Wall {
    segments: Arc<[WallSegment]>,
    min_y: f64,
    max_y: f64,
}

/// Result of intersecting a wall with a horizontal line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WallHit {
    At(f64),
    /// The y lies outside the column's vertical extent.
    OffLimits,
    /// The y is inside the extent but no segment of this wall covers it.
    NoLine,
}

impl Wall {
    /// Build a wall from a flat `[x1, y1, x2, y2, ...]` point list.
    ///
    /// Horizontal segments are skipped. A trailing odd number is ignored.
    pub fn from_points(points: &[f64]) -> Result<Self> {
        if points.len() < 4 {
            return Err(LayoutError::InvalidColumnLine(format!(
                "a column line needs at least 4 numbers, got {}",
                points.len()
            )));
        }

        let mut segments = Vec::new();
        let mut min_y = f64::MAX;
        let mut max_y = f64::MIN;
        for pair in points.windows(4).step_by(2) {
            let (x1, y1, x2, y2) = (pair[0], pair[1], pair[2], pair[3]);
            if y1 == y2 {
                continue;
            }
            let a = (x1 - x2) / (y1 - y2);
            let b = x1 - a * y1;
            let segment = WallSegment {
                min_y: y1.min(y2),
                max_y: y1.max(y2),
                a,
                b,
            };
            min_y = min_y.min(segment.min_y);
            max_y = max_y.max(segment.max_y);
            segments.push(segment);
        }

        if segments.is_empty() {
            return Err(LayoutError::InvalidColumnLine(
                "no valid column line found".to_string(),
            ));
        }
        log::trace!("column wall with {} segments", segments.len());

        Ok(Self {
            segments: segments.into(),
            min_y,
            max_y,
        })
    }

    /// A vertical wall at `x` from `y1` to `y2`.
    pub fn vertical(x: f64, y1: f64, y2: f64) -> Result<Self> {
        Self::from_points(&[x, y1, x, y2])
    }

    pub fn segments(&self) -> &[WallSegment] {
        &self.segments
    }

    pub fn min_y(&self) -> f64 {
        self.min_y
    }

    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    /// Intersect with the horizontal line at `y`, given the vertical
    /// extent of the whole column.
    pub fn hit(&self, y: f64, column_min_y: f64, column_max_y: f64) -> WallHit {
        if y < column_min_y || y > column_max_y {
            return WallHit::OffLimits;
        }
        self.segments
            .iter()
            .find(|s| s.contains(y))
            .map_or(WallHit::NoLine, |s| WallHit::At(s.x_at(y)))
    }
}

/// Declarative column description, e.g. from a JSON layout file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnSpec {
    Rect(Rect),
    Walls { left: Vec<f64>, right: Vec<f64> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertical_wall() {
        let wall = Wall::vertical(36.0, 36.0, 800.0).unwrap();
        assert_eq!(wall.hit(400.0, 36.0, 800.0), WallHit::At(36.0));
        assert_eq!(wall.hit(900.0, 36.0, 800.0), WallHit::OffLimits);
    }

    #[test]
    fn test_slanted_segment() {
        // From (0, 0) to (100, 100): x == y.
        let wall = Wall::from_points(&[0.0, 0.0, 100.0, 100.0]).unwrap();
        match wall.hit(40.0, 0.0, 100.0) {
            WallHit::At(x) => assert!((x - 40.0).abs() < 1e-9),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_multi_segment_polyline() {
        let wall = Wall::from_points(&[
            0.0, 0.0, 0.0, 10.0, 50.0, 10.0, 50.0, 20.0, 0.0, 40.0, 0.0, 50.0,
        ])
        .unwrap();
        assert_eq!(wall.segments().len(), 4);
        match wall.hit(30.0, 0.0, 50.0) {
            WallHit::At(x) => assert!((x - 25.0).abs() < 1e-9),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_uncovered_y_is_no_line() {
        // The column spans 0..50 but this wall only starts at 20.
        let wall = Wall::vertical(100.0, 20.0, 50.0).unwrap();
        assert_eq!(wall.hit(10.0, 0.0, 50.0), WallHit::NoLine);
    }

    #[test]
    fn test_order_agnostic() {
        let up = Wall::from_points(&[10.0, 0.0, 10.0, 100.0]).unwrap();
        let down = Wall::from_points(&[10.0, 100.0, 10.0, 0.0]).unwrap();
        assert_eq!(up.min_y(), down.min_y());
        assert_eq!(up.max_y(), down.max_y());
    }

    #[test]
    fn test_too_few_numbers() {
        assert!(matches!(
            Wall::from_points(&[1.0, 2.0, 3.0]),
            Err(LayoutError::InvalidColumnLine(_))
        ));
    }

    #[test]
    fn test_only_horizontal_segments() {
        assert!(matches!(
            Wall::from_points(&[0.0, 10.0, 50.0, 10.0, 90.0, 10.0]),
            Err(LayoutError::InvalidColumnLine(_))
        ));
    }

    #[test]
    fn test_odd_tail_ignored() {
        let wall = Wall::from_points(&[0.0, 0.0, 0.0, 10.0, 99.0]).unwrap();
        assert_eq!(wall.segments().len(), 1);
    }

    #[test]
    fn test_column_spec_json() {
        let spec: ColumnSpec =
            serde_json::from_str(r#"{"walls": {"left": [0, 0, 0, 100], "right": [50, 0, 50, 100]}}"#)
                .unwrap();
        assert!(matches!(spec, ColumnSpec::Walls { .. }));
        let rect: ColumnSpec =
            serde_json::from_str(r#"{"rect": {"llx": 0, "lly": 0, "urx": 10, "ury": 10}}"#).unwrap();
        assert!(matches!(rect, ColumnSpec::Rect(_)));
    }
}
