//! Snap functionality for aligning element edges to the slide and to each other.

use crate::model::{ElementId, PlacementElement, SlideDimensions};
use kurbo::Point;

/// Distance threshold for edge snapping (centimetres).
pub const SNAP_THRESHOLD_CM: f64 = 0.3;

/// Candidate alignment coordinates, one list per axis.
///
/// Order matters: resolution picks the first candidate within tolerance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapPoints {
    /// Vertical guide positions (x coordinates).
    pub xs: Vec<f64>,
    /// Horizontal guide positions (y coordinates).
    pub ys: Vec<f64>,
}

/// Result of a snap operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResult {
    /// The query point with snapped axes replaced.
    pub point: Point,
    /// The x guide that was hit, if any.
    pub snapped_x: Option<f64>,
    /// The y guide that was hit, if any.
    pub snapped_y: Option<f64>,
}

impl SnapResult {
    /// Create a result with no snapping.
    pub fn none(point: Point) -> Self {
        Self {
            point,
            snapped_x: None,
            snapped_y: None,
        }
    }

    /// Check if any snapping occurred.
    pub fn is_snapped(&self) -> bool {
        self.snapped_x.is_some() || self.snapped_y.is_some()
    }
}

/// Collect snap candidates: the slide edges, then the edges of every
/// element except `exclude`.
pub fn get_snap_points(
    elements: &[PlacementElement],
    dimensions: SlideDimensions,
    exclude: Option<ElementId>,
) -> SnapPoints {
    let mut points = SnapPoints {
        xs: Vec::with_capacity(2 + elements.len() * 2),
        ys: Vec::with_capacity(2 + elements.len() * 2),
    };
    points.xs.extend([0.0, dimensions.width]);
    points.ys.extend([0.0, dimensions.height]);

    for el in elements.iter().filter(|el| Some(el.id) != exclude) {
        points.xs.extend([el.bounds.x, el.bounds.right()]);
        points.ys.extend([el.bounds.y, el.bounds.bottom()]);
    }
    points
}

/// First candidate within `threshold` of `value`, in candidate order.
///
/// This is a first-match scan, not a nearest-match search: with candidates
/// `[5.0, 5.1]` a query of `5.08` snaps to `5.0`.
pub fn snap_to(value: f64, targets: &[f64], threshold: f64) -> Option<f64> {
    targets.iter().copied().find(|t| (value - t).abs() <= threshold)
}

/// Snap each axis of `point` independently.
pub fn resolve_snap(point: Point, points: &SnapPoints, threshold: f64) -> SnapResult {
    let snapped_x = snap_to(point.x, &points.xs, threshold);
    let snapped_y = snap_to(point.y, &points.ys, threshold);
    SnapResult {
        point: Point::new(snapped_x.unwrap_or(point.x), snapped_y.unwrap_or(point.y)),
        snapped_x,
        snapped_y,
    }
}
