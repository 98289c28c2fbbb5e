//! Junction classification from 8-neighborhood patterns.
//!
//! Every interior foreground pixel of the skeleton is classified from its
//! 8 neighbor flags (clockwise from north). Border pixels never have a
//! full 3x3 neighborhood and are excluded. The classification is a pure
//! per-pixel map with no inter-pixel dependency.
//!
//! Rules, in priority order:
//!
//! 1. one neighbor -> endpoint
//! 2. two non-adjacent neighbors matching an exact 90-degree corner
//!    pattern -> corner
//! 3. three neighbors with two transitions, or a canonical T window in
//!    the cyclic pattern -> T-junction
//! 4. at least `min_neighbors` neighbors and `min_transitions`
//!    transitions -> intersection
//!
//! Anything else is unclassified and not emitted.

use crate::mask::{Mask, neighbor_count, transitions};
use crate::types::{ClassifyConfig, Junction, JunctionKind, Point};

/// The four canonical 90-degree corner patterns as 8-bit masks, bit `i`
/// being neighbor `p(2+i)` (clockwise from north). Exactly two cardinals
/// set: north+east, east+south, south+west, west+north.
const CORNER_PATTERNS: [u8; 4] = [0b0000_0101, 0b0001_0100, 0b0101_0000, 0b0100_0001];

/// Cardinal positions (N, E, S, W) in the neighbor cycle.
const CARDINALS: [usize; 4] = [0, 2, 4, 6];

/// Classify every interior foreground pixel of the skeleton.
///
/// Returns only the classified points; unclassified pixels (mid-line
/// pixels and unrecognized patterns) are discarded.
#[must_use = "returns the classified junction points"]
pub fn classify(skeleton: &Mask, config: &ClassifyConfig) -> Vec<Junction> {
    let mut junctions = Vec::new();

    for y in 1..i64::from(skeleton.height()) - 1 {
        for x in 1..i64::from(skeleton.width()) - 1 {
            if !skeleton.get(x, y) {
                continue;
            }
            let neighborhood = skeleton.neighborhood(x, y);
            if let Some(kind) = classify_neighborhood(&neighborhood, config) {
                #[allow(clippy::cast_precision_loss)]
                junctions.push(Junction::new(Point::new(x as f64, y as f64), kind));
            }
        }
    }

    junctions
}

/// Classify a single 8-neighborhood. Returns `None` for unclassified
/// patterns.
#[must_use]
pub fn classify_neighborhood(
    neighborhood: &[bool; 8],
    config: &ClassifyConfig,
) -> Option<JunctionKind> {
    let neighbors = neighbor_count(neighborhood);
    let transition_count = transitions(neighborhood);

    if neighbors == 1 {
        return Some(JunctionKind::Endpoint);
    }

    if neighbors == 2 {
        // Two adjacent flags are a mid-line pixel, not a true corner.
        if has_adjacent_pair(neighborhood) {
            return None;
        }
        let bits = pattern_bits(neighborhood);
        if CORNER_PATTERNS.contains(&bits) {
            return Some(JunctionKind::Corner);
        }
        return None;
    }

    if (neighbors == 3 && transition_count == 2) || has_t_pattern(neighborhood) {
        return Some(JunctionKind::TJunction);
    }

    if neighbors >= config.min_neighbors && transition_count >= config.min_transitions {
        return Some(JunctionKind::Intersection);
    }

    None
}

/// Whether any two set flags are adjacent in the cycle (wrap included).
fn has_adjacent_pair(neighborhood: &[bool; 8]) -> bool {
    (0..8).any(|i| neighborhood[i] && neighborhood[(i + 1) % 8])
}

/// Pack a neighborhood into an 8-bit pattern, bit `i` = `p(2+i)`.
fn pattern_bits(neighborhood: &[bool; 8]) -> u8 {
    neighborhood
        .iter()
        .enumerate()
        .fold(0, |bits, (i, &flag)| bits | (u8::from(flag) << i))
}

/// Whether the cyclic pattern contains a canonical T window: three
/// consecutive cardinals set with the two intervening diagonals clear.
///
/// The window is anchored at a cardinal, giving exactly four patterns
/// (stem pointing north, east, south, or west). The remaining three
/// positions outside the window are unconstrained; this is the one place
/// the substring interpretation survives.
fn has_t_pattern(neighborhood: &[bool; 8]) -> bool {
    CARDINALS.iter().any(|&start| {
        neighborhood[start]
            && !neighborhood[(start + 1) % 8]
            && neighborhood[(start + 2) % 8]
            && !neighborhood[(start + 3) % 8]
            && neighborhood[(start + 4) % 8]
    })
}
