//! Line extraction: candidate wall segments from the skeleton.
//!
//! Two independent strategies sit behind the [`LineStrategy`] trait,
//! selected at runtime through [`LineStrategyKind`]:
//!
//! - **Junction connection** — tests every pair of clustered points by
//!   sampling the straight segment between them against the skeleton.
//!   Preferred when at least two points exist; produces segments anchored
//!   at semantic junctions.
//! - **Hough transform** — votes skeleton pixels into a (rho, theta)
//!   accumulator and extracts maximal collinear runs. Works without any
//!   prior point detection; see [`crate::hough`].
//!
//! Both strategies deduplicate by endpoint-distance sum and never emit
//! zero-length or out-of-bounds segments.

use serde::{Deserialize, Serialize};

use crate::hough;
use crate::mask::Mask;
use crate::types::{ClusterPoint, LineConfig, LineSegment, Point};

/// Selects which line extraction strategy to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineStrategyKind {
    /// Junction connection when at least two clustered points exist,
    /// falling back to the Hough transform when it produces no segments.
    #[default]
    Auto,
    /// Junction connection only.
    JunctionConnect,
    /// Hough transform only.
    HoughTransform,
}

/// Trait for line extraction strategies.
///
/// Input: the skeleton mask and the clustered junction points (ignored
/// by the Hough strategy). Output: deduplicated candidate wall segments.
pub trait LineStrategy {
    /// Extract candidate wall segments.
    fn extract(
        &self,
        skeleton: &Mask,
        points: &[ClusterPoint],
        config: &LineConfig,
    ) -> Vec<LineSegment>;
}

impl LineStrategy for LineStrategyKind {
    fn extract(
        &self,
        skeleton: &Mask,
        points: &[ClusterPoint],
        config: &LineConfig,
    ) -> Vec<LineSegment> {
        match *self {
            Self::Auto => {
                let segments = connect_junctions(skeleton, points, config);
                if segments.is_empty() {
                    hough::extract_lines(skeleton, config)
                } else {
                    segments
                }
            }
            Self::JunctionConnect => connect_junctions(skeleton, points, config),
            Self::HoughTransform => hough::extract_lines(skeleton, config),
        }
    }
}

/// Coverage fraction required for short pairs (under 20 px).
const SHORT_SEGMENT_COVERAGE: f64 = 0.9;
/// Coverage fraction required for longer pairs.
const LONG_SEGMENT_COVERAGE: f64 = 0.7;
/// Pair distance below which the stricter coverage applies.
const SHORT_SEGMENT_LENGTH: f64 = 20.0;

/// Junction-connection strategy: accept a pair of points as a wall
/// segment when enough of the straight line between them lies on the
/// skeleton.
///
/// Fewer than two points yields an empty list rather than an error.
#[must_use = "returns the extracted wall segments"]
pub fn connect_junctions(
    skeleton: &Mask,
    points: &[ClusterPoint],
    config: &LineConfig,
) -> Vec<LineSegment> {
    let mut candidates = Vec::new();

    for (i, a) in points.iter().enumerate() {
        for b in &points[i + 1..] {
            let distance = a.position.distance(b.position);
            if distance <= 0.0 || distance > config.max_connection_distance {
                continue;
            }
            let coverage = skeleton_coverage(skeleton, a.position, b.position, distance);
            let required = if distance < SHORT_SEGMENT_LENGTH {
                SHORT_SEGMENT_COVERAGE
            } else {
                LONG_SEGMENT_COVERAGE
            };
            if coverage >= required {
                candidates.push(LineSegment::new(a.position, b.position));
            }
        }
    }

    dedup_first_encountered(candidates, 2.0 * config.max_line_gap)
}

/// Fraction of evenly spaced samples along `a -> b` (endpoints included)
/// that land on a foreground skeleton pixel.
fn skeleton_coverage(skeleton: &Mask, a: Point, b: Point, distance: f64) -> f64 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let samples = ((distance / 2.0).floor() as usize).max(10);

    let mut on_skeleton = 0;
    for k in 0..samples {
        #[allow(clippy::cast_precision_loss)]
        let t = k as f64 / (samples - 1) as f64;
        let x = t.mul_add(b.x - a.x, a.x).round();
        let y = t.mul_add(b.y - a.y, a.y).round();
        #[allow(clippy::cast_possible_truncation)]
        if skeleton.get(x as i64, y as i64) {
            on_skeleton += 1;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    let fraction = f64::from(on_skeleton) / samples as f64;
    fraction
}

/// Keep the first-encountered segment of each duplicate group: a later
/// segment is a duplicate when its endpoint-distance sum to a kept one
/// (cheaper pairing) is at most `tolerance`.
fn dedup_first_encountered(candidates: Vec<LineSegment>, tolerance: f64) -> Vec<LineSegment> {
    let mut kept: Vec<LineSegment> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !kept
            .iter()
            .any(|k| k.endpoint_distance_sum(&candidate) <= tolerance)
        {
            kept.push(candidate);
        }
    }
    kept
}

/// Greedy longest-first dedup used by the Hough strategy: sort by length
/// descending, keep a segment, and suppress any later one within
/// `tolerance` endpoint-distance sum.
pub(crate) fn dedup_longest_first(
    mut candidates: Vec<LineSegment>,
    tolerance: f64,
) -> Vec<LineSegment> {
    candidates.sort_by(|a, b| b.length().total_cmp(&a.length()));
    dedup_first_encountered(candidates, tolerance)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::JunctionKind;

    fn point(x: f64, y: f64) -> ClusterPoint {
        ClusterPoint {
            position: Point::new(x, y),
            kind: JunctionKind::Endpoint,
            member_count: 1,
        }
    }

    /// A skeleton with a single horizontal line on row `y`.
    fn horizontal_skeleton(width: u32, height: u32, y: u32, x0: u32, x1: u32) -> Mask {
        let mut mask = Mask::new(width, height).unwrap();
        for x in x0..x1 {
            mask.set(x, y, true);
        }
        mask
    }

    #[test]
    fn default_strategy_is_auto() {
        assert_eq!(LineStrategyKind::default(), LineStrategyKind::Auto);
    }

    #[test]
    fn fewer_than_two_points_yields_no_segments() {
        let skeleton = horizontal_skeleton(50, 10, 5, 5, 45);
        let config = LineConfig::default();
        assert!(connect_junctions(&skeleton, &[], &config).is_empty());
        assert!(connect_junctions(&skeleton, &[point(5.0, 5.0)], &config).is_empty());
    }

    #[test]
    fn pair_along_skeleton_is_accepted() {
        let skeleton = horizontal_skeleton(50, 10, 5, 5, 45);
        let points = [point(5.0, 5.0), point(44.0, 5.0)];
        let segments = connect_junctions(&skeleton, &points, &LineConfig::default());
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].start, Point::new(5.0, 5.0));
        assert_eq!(segments[0].end, Point::new(44.0, 5.0));
    }

    #[test]
    fn pair_off_skeleton_is_rejected() {
        let skeleton = horizontal_skeleton(50, 20, 5, 5, 45);
        // Both points on an empty row: zero coverage.
        let points = [point(5.0, 15.0), point(44.0, 15.0)];
        let segments = connect_junctions(&skeleton, &points, &LineConfig::default());
        assert!(segments.is_empty());
    }

    #[test]
    fn pair_beyond_connection_distance_is_skipped() {
        let skeleton = horizontal_skeleton(200, 10, 5, 0, 200);
        let points = [point(0.0, 5.0), point(150.0, 5.0)];
        let segments = connect_junctions(&skeleton, &points, &LineConfig::default());
        assert!(segments.is_empty(), "150 px exceeds the default 100 px cap");
    }

    #[test]
    fn coincident_points_are_skipped() {
        let skeleton = horizontal_skeleton(50, 10, 5, 5, 45);
        let points = [point(10.0, 5.0), point(10.0, 5.0)];
        let segments = connect_junctions(&skeleton, &points, &LineConfig::default());
        assert!(segments.is_empty());
    }

    #[test]
    fn short_pairs_require_stricter_coverage() {
        // A 15 px pair with a 4 px hole: coverage 0.7, below the 0.9
        // bar for short segments.
        let mut skeleton = horizontal_skeleton(30, 10, 5, 5, 21);
        for x in 12..16 {
            skeleton.set(x, 5, false);
        }
        let points = [point(5.0, 5.0), point(20.0, 5.0)];
        let segments = connect_junctions(&skeleton, &points, &LineConfig::default());
        assert!(segments.is_empty());
    }

    #[test]
    fn long_pairs_tolerate_small_gaps() {
        // A 39 px pair with the same 4 px hole: coverage ~0.9, above the
        // 0.7 bar for long segments.
        let mut skeleton = horizontal_skeleton(60, 10, 5, 5, 45);
        for x in 20..24 {
            skeleton.set(x, 5, false);
        }
        let points = [point(5.0, 5.0), point(44.0, 5.0)];
        let segments = connect_junctions(&skeleton, &points, &LineConfig::default());
        assert_eq!(segments.len(), 1);
    }

    #[test]
    fn duplicates_keep_first_encountered() {
        let a = LineSegment::new(Point::new(0.0, 0.0), Point::new(40.0, 0.0));
        let near = LineSegment::new(Point::new(1.0, 1.0), Point::new(41.0, 1.0));
        let far = LineSegment::new(Point::new(0.0, 30.0), Point::new(40.0, 30.0));
        let result = dedup_first_encountered(vec![a, near, far], 10.0);
        assert_eq!(result, vec![a, far]);
    }

    #[test]
    fn dedup_is_symmetric_under_endpoint_swap() {
        let a = LineSegment::new(Point::new(0.0, 0.0), Point::new(40.0, 0.0));
        let swapped = LineSegment::new(Point::new(41.0, 1.0), Point::new(1.0, 1.0));
        let result = dedup_first_encountered(vec![a, swapped], 10.0);
        assert_eq!(result.len(), 1, "swapped duplicate must still be suppressed");
    }

    #[test]
    fn longest_first_dedup_prefers_longer_segment() {
        let short = LineSegment::new(Point::new(0.0, 0.0), Point::new(30.0, 0.0));
        let long = LineSegment::new(Point::new(1.0, 1.0), Point::new(41.0, 1.0));
        let result = dedup_longest_first(vec![short, long], 25.0);
        assert_eq!(result, vec![long]);
    }

    #[test]
    fn auto_falls_back_to_hough_without_points() {
        // No clustered points, but a strong 40 px skeleton line: Auto
        // must fall through to the Hough strategy.
        let skeleton = horizontal_skeleton(60, 20, 10, 10, 50);
        let segments =
            LineStrategyKind::Auto.extract(&skeleton, &[], &LineConfig::default());
        assert!(
            !segments.is_empty(),
            "expected Hough fallback to find the line",
        );
    }

    #[test]
    fn auto_prefers_junction_connection() {
        let skeleton = horizontal_skeleton(50, 10, 5, 5, 45);
        let points = [point(5.0, 5.0), point(44.0, 5.0)];
        let auto = LineStrategyKind::Auto.extract(&skeleton, &points, &LineConfig::default());
        let junction =
            LineStrategyKind::JunctionConnect.extract(&skeleton, &points, &LineConfig::default());
        assert_eq!(auto, junction);
    }
}
