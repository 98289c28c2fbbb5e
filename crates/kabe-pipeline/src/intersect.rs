//! Pairwise line-segment intersection.
//!
//! Solves the 2x2 system for the intersection of the infinite-line
//! extensions of every unordered segment pair using the standard
//! determinant form, then accepts the point only when it lies within
//! both segments' bounding ranges. Near-parallel pairs (denominator
//! magnitude below the tolerance) and out-of-range intersections are
//! silently excluded.
//!
//! O(n^2) in segment count by design: floorplans yield at most a few
//! hundred segments, so no spatial index is warranted.

use crate::types::{Junction, JunctionKind, LineSegment, Point};

/// Denominator magnitude below which two lines are treated as parallel.
const PARALLEL_TOLERANCE: f64 = 1e-6;

/// Slack on the within-segment bounding test, per coordinate.
const BETWEEN_TOLERANCE: f64 = 1e-6;

/// Find every in-segment intersection between pairs of segments.
///
/// Returned points are tagged [`JunctionKind::Intersection`] so they can
/// be fed back into clustering alongside first-pass centroids.
#[must_use = "returns the intersection points"]
pub fn intersections(segments: &[LineSegment]) -> Vec<Junction> {
    let mut points = Vec::new();
    for (i, a) in segments.iter().enumerate() {
        for b in &segments[i + 1..] {
            if let Some(point) = segment_intersection(a, b) {
                points.push(Junction::new(point, JunctionKind::Intersection));
            }
        }
    }
    points
}

/// Intersection of two segments, or `None` when their supporting lines
/// are near-parallel or the crossing falls outside either segment.
#[must_use]
pub fn segment_intersection(a: &LineSegment, b: &LineSegment) -> Option<Point> {
    let (x1, y1, x2, y2) = (a.start.x, a.start.y, a.end.x, a.end.y);
    let (x3, y3, x4, y4) = (b.start.x, b.start.y, b.end.x, b.end.y);

    let denominator = (x1 - x2).mul_add(y3 - y4, -((y1 - y2) * (x3 - x4)));
    if denominator.abs() < PARALLEL_TOLERANCE {
        return None;
    }

    let det_a = x1.mul_add(y2, -(y1 * x2));
    let det_b = x3.mul_add(y4, -(y3 * x4));
    let px = (det_a.mul_add(x3 - x4, -((x1 - x2) * det_b))) / denominator;
    let py = (det_a.mul_add(y3 - y4, -((y1 - y2) * det_b))) / denominator;

    let point = Point::new(px, py);
    if within_segment(point, a) && within_segment(point, b) {
        Some(point)
    } else {
        None
    }
}

/// Whether a point lies within the segment's bounding range, with a
/// small per-coordinate tolerance for endpoint crossings.
fn within_segment(p: Point, seg: &LineSegment) -> bool {
    between(p.x, seg.start.x, seg.end.x) && between(p.y, seg.start.y, seg.end.y)
}

fn between(value: f64, a: f64, b: f64) -> bool {
    let (low, high) = if a <= b { (a, b) } else { (b, a) };
    value >= low - BETWEEN_TOLERANCE && value <= high + BETWEEN_TOLERANCE
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn segment(x1: f64, y1: f64, x2: f64, y2: f64) -> LineSegment {
        LineSegment::new(Point::new(x1, y1), Point::new(x2, y2))
    }

    #[test]
    fn perpendicular_cross_intersects_at_center() {
        let a = segment(0.0, 5.0, 10.0, 5.0);
        let b = segment(5.0, 0.0, 5.0, 10.0);
        let p = segment_intersection(&a, &b).unwrap();
        assert!(p.distance(Point::new(5.0, 5.0)) < 1e-3);
    }

    #[test]
    fn oblique_cross_matches_analytic_point() {
        // y = x and y = -x + 10 cross at (5, 5).
        let a = segment(0.0, 0.0, 10.0, 10.0);
        let b = segment(0.0, 10.0, 10.0, 0.0);
        let p = segment_intersection(&a, &b).unwrap();
        assert!(p.distance(Point::new(5.0, 5.0)) < 1e-3);
    }

    #[test]
    fn parallel_segments_yield_nothing() {
        let a = segment(0.0, 0.0, 10.0, 0.0);
        let b = segment(0.0, 3.0, 10.0, 3.0);
        assert!(segment_intersection(&a, &b).is_none());
    }

    #[test]
    fn near_parallel_segments_yield_nothing() {
        // Slopes differ by ~1e-9: the denominator falls under the
        // parallel tolerance.
        let a = segment(0.0, 0.0, 1.0, 0.0);
        let b = segment(0.0, 1.0, 1.0, 1.0 + 1e-9);
        assert!(segment_intersection(&a, &b).is_none());
    }

    #[test]
    fn lines_crossing_outside_segments_yield_nothing() {
        // Supporting lines cross at (5, 5), but segment b stops short.
        let a = segment(0.0, 5.0, 10.0, 5.0);
        let b = segment(5.0, 0.0, 5.0, 4.0);
        assert!(segment_intersection(&a, &b).is_none());
    }

    #[test]
    fn endpoint_touch_is_accepted() {
        // b ends exactly on a: the tolerance admits the shared point.
        let a = segment(0.0, 5.0, 10.0, 5.0);
        let b = segment(5.0, 0.0, 5.0, 5.0);
        let p = segment_intersection(&a, &b).unwrap();
        assert!(p.distance(Point::new(5.0, 5.0)) < 1e-6);
    }

    #[test]
    fn collinear_overlap_yields_nothing() {
        // Same supporting line: denominator is exactly zero.
        let a = segment(0.0, 0.0, 10.0, 0.0);
        let b = segment(5.0, 0.0, 15.0, 0.0);
        assert!(segment_intersection(&a, &b).is_none());
    }

    #[test]
    fn all_pairs_are_checked() {
        // A grid of 2 horizontal and 2 vertical segments: 4 crossings.
        let segments = [
            segment(0.0, 2.0, 10.0, 2.0),
            segment(0.0, 8.0, 10.0, 8.0),
            segment(3.0, 0.0, 3.0, 10.0),
            segment(7.0, 0.0, 7.0, 10.0),
        ];
        let points = intersections(&segments);
        assert_eq!(points.len(), 4);
        assert!(points.iter().all(|j| j.kind == JunctionKind::Intersection));
    }

    #[test]
    fn empty_and_single_inputs_yield_nothing() {
        assert!(intersections(&[]).is_empty());
        assert!(intersections(&[segment(0.0, 0.0, 5.0, 5.0)]).is_empty());
    }
}
