//! Hough-transform line extraction.
//!
//! Works directly on the skeleton without requiring prior point
//! detection. Every foreground pixel votes for every quantized
//! `(rho, theta)` line passing through it (`rho = x*cos(theta) +
//! y*sin(theta)`, 1 px rho bins spanning the image diagonal, theta in
//! `[0, pi)`). Bins that clear the vote threshold are turned into
//! segments by filtering their contributors to a perpendicular band
//! around the exact line, sorting them by projection along the line
//! direction, and splitting at along-line gaps.
//!
//! The accumulator and contributor lists are local buffers owned by a
//! single call; nothing is shared between invocations.

use crate::lines::dedup_longest_first;
use crate::mask::Mask;
use crate::types::{LineConfig, LineSegment, Point};

/// Bounds on the adaptive theta step count.
const MIN_THETA_STEPS: usize = 90;
const MAX_THETA_STEPS: usize = 180;

/// Extract line segments from the skeleton via a (rho, theta)
/// accumulator. An empty skeleton yields an empty list.
#[must_use = "returns the extracted wall segments"]
pub fn extract_lines(skeleton: &Mask, config: &LineConfig) -> Vec<LineSegment> {
    let width = skeleton.width();
    let height = skeleton.height();

    let pixels = foreground_pixels(skeleton);
    if pixels.is_empty() {
        return Vec::new();
    }

    let num_thetas = theta_steps(width.max(height));
    #[allow(clippy::cast_precision_loss)]
    let theta_step = std::f64::consts::PI / num_thetas as f64;

    let mut cos_table = Vec::with_capacity(num_thetas);
    let mut sin_table = Vec::with_capacity(num_thetas);
    for i in 0..num_thetas {
        #[allow(clippy::cast_precision_loss)]
        let theta = i as f64 * theta_step;
        cos_table.push(theta.cos());
        sin_table.push(theta.sin());
    }

    // Rho spans [-diagonal, +diagonal] at 1 px resolution.
    let diagonal = f64::from(width).hypot(f64::from(height));
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let num_rhos = (2.0 * diagonal).ceil() as usize + 1;

    // Vote, recording contributing pixel indices per bin.
    let mut accumulator = vec![0u32; num_thetas * num_rhos];
    let mut contributors: Vec<Vec<u32>> = vec![Vec::new(); num_thetas * num_rhos];
    for (pixel_idx, &(x, y)) in pixels.iter().enumerate() {
        for theta_idx in 0..num_thetas {
            let rho = f64::from(x).mul_add(cos_table[theta_idx], f64::from(y) * sin_table[theta_idx]);
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let rho_idx = (rho + diagonal).round() as usize;
            if rho_idx < num_rhos {
                let bin = theta_idx * num_rhos + rho_idx;
                accumulator[bin] += 1;
                #[allow(clippy::cast_possible_truncation)]
                contributors[bin].push(pixel_idx as u32);
            }
        }
    }

    // Scan qualifying bins and split contributor runs into segments.
    let mut candidates = Vec::new();
    for theta_idx in 0..num_thetas {
        for rho_idx in 0..num_rhos {
            let bin = theta_idx * num_rhos + rho_idx;
            if accumulator[bin] < config.threshold {
                continue;
            }
            #[allow(clippy::cast_precision_loss)]
            let rho = rho_idx as f64 - diagonal;
            segments_from_bin(
                &pixels,
                &contributors[bin],
                cos_table[theta_idx],
                sin_table[theta_idx],
                rho,
                config,
                &mut candidates,
            );
        }
    }

    dedup_longest_first(candidates, 3.0 * config.max_line_gap)
}

/// Adaptive theta resolution: coarser for large images, finer for small,
/// bounded to [`MIN_THETA_STEPS`]..=[`MAX_THETA_STEPS`].
fn theta_steps(max_dimension: u32) -> usize {
    MAX_THETA_STEPS
        .saturating_sub(max_dimension as usize / 16)
        .clamp(MIN_THETA_STEPS, MAX_THETA_STEPS)
}

/// Collect foreground pixel coordinates in row-major order.
fn foreground_pixels(mask: &Mask) -> Vec<(u32, u32)> {
    let mut pixels = Vec::new();
    for y in 0..mask.height() {
        for x in 0..mask.width() {
            if mask.get(i64::from(x), i64::from(y)) {
                pixels.push((x, y));
            }
        }
    }
    pixels
}

/// Turn one qualifying bin's contributors into zero or more segments.
///
/// Contributors farther than `max_point_distance` perpendicular from the
/// bin's exact line are discarded; survivors are projected onto the line
/// direction `(-sin, cos)`, sorted, and split into maximal runs whose
/// consecutive gaps stay within `max_line_gap`.
fn segments_from_bin(
    pixels: &[(u32, u32)],
    contributor_indices: &[u32],
    cos_t: f64,
    sin_t: f64,
    rho: f64,
    config: &LineConfig,
    out: &mut Vec<LineSegment>,
) {
    // (projection along the line, position) for in-band contributors.
    let mut projected: Vec<(f64, Point)> = contributor_indices
        .iter()
        .filter_map(|&idx| {
            let (x, y) = pixels[idx as usize];
            let (xf, yf) = (f64::from(x), f64::from(y));
            let perpendicular = xf.mul_add(cos_t, yf * sin_t) - rho;
            if perpendicular.abs() > config.max_point_distance {
                return None;
            }
            let projection = yf.mul_add(cos_t, -(xf * sin_t));
            Some((projection, Point::new(xf, yf)))
        })
        .collect();
    if projected.len() < 2 {
        return;
    }
    projected.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut run_start = 0;
    for i in 1..=projected.len() {
        let run_ends = i == projected.len()
            || projected[i].1.distance(projected[i - 1].1) > config.max_line_gap;
        if !run_ends {
            continue;
        }
        if i - run_start >= 2 {
            let start = projected[run_start].1;
            let end = projected[i - 1].1;
            let length = start.distance(end);
            if length >= config.min_line_length && length > 0.0 {
                out.push(LineSegment::new(start, end));
            }
        }
        run_start = i;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::PipelineError;

    fn line_mask(
        width: u32,
        height: u32,
        points: impl IntoIterator<Item = (u32, u32)>,
    ) -> Result<Mask, PipelineError> {
        let mut mask = Mask::new(width, height)?;
        for (x, y) in points {
            mask.set(x, y, true);
        }
        Ok(mask)
    }

    #[test]
    fn theta_steps_are_bounded() {
        assert_eq!(theta_steps(0), MAX_THETA_STEPS);
        assert_eq!(theta_steps(160), 170);
        assert_eq!(theta_steps(10_000), MIN_THETA_STEPS);
    }

    #[test]
    fn empty_skeleton_yields_no_lines() {
        let mask = Mask::new(50, 50).unwrap();
        assert!(extract_lines(&mask, &LineConfig::default()).is_empty());
    }

    #[test]
    fn sparse_noise_below_threshold_yields_no_lines() {
        let mask = line_mask(50, 50, [(3, 7), (20, 31), (41, 12), (9, 44)]).unwrap();
        assert!(extract_lines(&mask, &LineConfig::default()).is_empty());
    }

    #[test]
    fn horizontal_line_is_detected() {
        let mask = line_mask(60, 20, (10..50).map(|x| (x, 10))).unwrap();
        let segments = extract_lines(&mask, &LineConfig::default());
        assert_eq!(segments.len(), 1, "expected one deduplicated segment");
        let seg = segments[0];
        assert!((seg.start.y - 10.0).abs() < 1.0);
        assert!((seg.end.y - 10.0).abs() < 1.0);
        assert!(seg.length() >= 35.0, "length {} too short", seg.length());
    }

    #[test]
    fn vertical_line_is_detected() {
        let mask = line_mask(20, 60, (10..50).map(|y| (10, y))).unwrap();
        let segments = extract_lines(&mask, &LineConfig::default());
        assert!(!segments.is_empty());
        let seg = segments[0];
        assert!((seg.start.x - 10.0).abs() < 1.0);
        assert!((seg.end.x - 10.0).abs() < 1.0);
        assert!(seg.length() >= 35.0);
    }

    #[test]
    fn diagonal_line_is_detected() {
        let mask = line_mask(60, 60, (10..50).map(|i| (i, i))).unwrap();
        let segments = extract_lines(&mask, &LineConfig::default());
        assert!(!segments.is_empty());
        assert!(segments[0].length() >= 35.0);
    }

    #[test]
    fn gap_splits_line_into_two_segments() {
        // Two 25 px collinear runs separated by a 10 px hole (beyond the
        // 5 px gap tolerance).
        let mask = line_mask(80, 20, (5..30).chain(40..65).map(|x| (x, 10))).unwrap();
        let segments = extract_lines(&mask, &LineConfig::default());
        assert_eq!(segments.len(), 2, "got {segments:?}");
        for seg in &segments {
            assert!(seg.length() >= 20.0);
        }
    }

    #[test]
    fn short_runs_are_dropped() {
        // 15 px is below the default 20 px minimum length, even though
        // the bin clears the vote threshold.
        let config = LineConfig {
            threshold: 10,
            ..LineConfig::default()
        };
        let mask = line_mask(40, 20, (5..20).map(|x| (x, 10))).unwrap();
        let segments = extract_lines(&mask, &config);
        assert!(segments.is_empty(), "got {segments:?}");
    }

    #[test]
    fn segments_stay_within_mask_bounds() {
        let mask = line_mask(60, 20, (0..60).map(|x| (x, 10))).unwrap();
        let segments = extract_lines(&mask, &LineConfig::default());
        assert!(!segments.is_empty());
        for seg in &segments {
            for p in [seg.start, seg.end] {
                assert!(p.x >= 0.0 && p.x < 60.0);
                assert!(p.y >= 0.0 && p.y < 20.0);
                assert!(p.x.is_finite() && p.y.is_finite());
            }
            assert!(seg.length() > 0.0);
        }
    }

    #[test]
    fn cross_produces_both_lines() {
        let mask = line_mask(
            61,
            61,
            (5..56).map(|i| (i, 30)).chain((5..56).map(|i| (30, i))),
        )
        .unwrap();
        let segments = extract_lines(&mask, &LineConfig::default());
        assert!(
            segments.len() >= 2,
            "expected both bars of the cross, got {segments:?}",
        );
        let has_horizontal = segments
            .iter()
            .any(|s| (s.start.y - s.end.y).abs() < 2.0 && s.length() >= 40.0);
        let has_vertical = segments
            .iter()
            .any(|s| (s.start.x - s.end.x).abs() < 2.0 && s.length() >= 40.0);
        assert!(has_horizontal && has_vertical, "got {segments:?}");
    }
}

