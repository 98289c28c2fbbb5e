//! Zhang-Suen morphological thinning.
//!
//! Reduces wall regions to 1-pixel-wide centerlines by repeatedly peeling
//! boundary pixels in two ordered sub-iterations until a full pass removes
//! nothing or the pass cap is reached. Deletion candidates are collected
//! against a snapshot of the mask and cleared only after the sub-iteration
//! scan completes, so decisions never see deletions made earlier in the
//! same pass.
//!
//! Non-convergence within the cap is not an error: the partial skeleton is
//! returned with `converged = false`.

use crate::mask::{Mask, neighbor_count, transitions};
use crate::types::ThinningConfig;

/// Outcome of a thinning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThinningResult {
    /// The thinned skeleton, same dimensions as the input.
    pub skeleton: Mask,
    /// Full passes executed, including the final pass that removed nothing.
    pub iterations: usize,
    /// Whether a fixed point was reached within the pass cap.
    pub converged: bool,
}

/// Thin a mask to its skeleton. The input mask is not mutated.
#[must_use = "returns the thinned skeleton"]
pub fn thin(mask: &Mask, config: &ThinningConfig) -> ThinningResult {
    let mut current = mask.clone();
    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iterations {
        iterations += 1;
        let removed_first = sub_iteration(&mut current, SubIteration::First);
        let removed_second = sub_iteration(&mut current, SubIteration::Second);
        if removed_first == 0 && removed_second == 0 {
            converged = true;
            break;
        }
    }

    ThinningResult {
        skeleton: current,
        iterations,
        converged,
    }
}

/// Which of the two ordered sub-iterations is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubIteration {
    First,
    Second,
}

impl SubIteration {
    /// The directional condition distinguishing the two sub-iterations.
    ///
    /// Neighbors are `p2..p9` clockwise from north, so indices 0, 2, 4, 6
    /// are N, E, S, W. A product like `p2*p4*p6 == 0` holds when at least
    /// one of the named cardinals is background.
    fn directional_ok(self, n: &[bool; 8]) -> bool {
        let (north, east, south, west) = (n[0], n[2], n[4], n[6]);
        match self {
            Self::First => !(north && east && south) && !(east && south && west),
            Self::Second => !(north && east && west) && !(north && south && west),
        }
    }
}

/// Run one sub-iteration: scan against a snapshot, then apply the
/// deferred deletions. Returns the number of pixels cleared.
fn sub_iteration(mask: &mut Mask, which: SubIteration) -> usize {
    let snapshot = mask.clone();
    let mut candidates = Vec::new();

    for y in 0..snapshot.height() {
        for x in 0..snapshot.width() {
            let (xi, yi) = (i64::from(x), i64::from(y));
            if !snapshot.get(xi, yi) {
                continue;
            }
            let n = snapshot.neighborhood(xi, yi);
            let b = neighbor_count(&n);
            if !(2..=6).contains(&b) {
                continue;
            }
            if transitions(&n) != 1 {
                continue;
            }
            if which.directional_ok(&n) {
                candidates.push((x, y));
            }
        }
    }

    for &(x, y) in &candidates {
        mask.set(x, y, false);
    }
    candidates.len()
}
