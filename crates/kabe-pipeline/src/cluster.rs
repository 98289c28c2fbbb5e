//! Point clustering: merge near-duplicate junction detections.
//!
//! Thinning artifacts commonly produce several detections a few pixels
//! apart for the same physical junction (an endpoint and a corner, or a
//! ring of intersections around a crossing). Clustering collapses them
//! into one representative centroid.
//!
//! Two phases bound the quadratic cost while staying order-independent:
//!
//! 1. **Tight pass** — connected components of the proximity graph at
//!    radius `max(8, max_distance/2)`, found with an R-tree radius query
//!    per point and a union-find over point indices.
//! 2. **Iterative merge** — repeated pairwise scans merging clusters
//!    whenever any cross-pair of members is within `max_distance`, until
//!    a pass merges nothing or the pass cap is hit. Transitive chaining
//!    is intentional: clusters may grow along a chain of nearby points.
//!
//! The centroid is the rounded arithmetic mean of member coordinates and
//! the resolved kind is the highest-priority kind present, not the most
//! frequent one.

use petgraph::unionfind::UnionFind;
use rstar::RTree;
use rstar::primitives::GeomWithData;

use crate::types::{ClusterConfig, ClusterPoint, Junction, JunctionKind, PipelineError, Point};

/// An R-tree entry: a position tagged with its input index.
type IndexedPoint = GeomWithData<[f64; 2], usize>;

/// Cluster classified points into representative centroids.
///
/// Points whose kind is not in `preserve_kinds` are dropped before
/// grouping. Empty input yields empty output.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if `max_distance` is not
/// finite and positive.
pub fn cluster(
    junctions: &[Junction],
    config: &ClusterConfig,
) -> Result<Vec<ClusterPoint>, PipelineError> {
    if !(config.max_distance.is_finite() && config.max_distance > 0.0) {
        return Err(PipelineError::InvalidConfig(format!(
            "cluster.max_distance must be finite and positive, got {}",
            config.max_distance,
        )));
    }

    let kept: Vec<&Junction> = junctions
        .iter()
        .filter(|j| config.preserve_kinds.contains(&j.kind))
        .collect();
    if kept.is_empty() {
        return Ok(Vec::new());
    }

    let mut clusters = tight_pass(&kept, config.tight_radius());
    merge_pass(&mut clusters, &kept, config);

    let mut points: Vec<ClusterPoint> = clusters
        .into_iter()
        .filter(|members| members.len() >= config.min_cluster_size)
        .map(|members| resolve(&members, &kept))
        .collect();

    // Deterministic output order regardless of union-find labeling.
    points.sort_by(|a, b| {
        (a.position.y, a.position.x).partial_cmp(&(b.position.y, b.position.x))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    Ok(points)
}

/// Phase 1: connected components of the tight-radius proximity graph.
fn tight_pass(points: &[&Junction], radius: f64) -> Vec<Vec<usize>> {
    let entries: Vec<IndexedPoint> = points
        .iter()
        .enumerate()
        .map(|(i, j)| GeomWithData::new([j.position.x, j.position.y], i))
        .collect();
    let tree = RTree::bulk_load(entries);

    let mut uf = UnionFind::<usize>::new(points.len());
    for (i, junction) in points.iter().enumerate() {
        let query = [junction.position.x, junction.position.y];
        for neighbor in tree.locate_within_distance(query, radius * radius) {
            uf.union(i, neighbor.data);
        }
    }

    let labels = uf.into_labeling();
    let mut by_root: std::collections::HashMap<usize, Vec<usize>> =
        std::collections::HashMap::new();
    for (i, root) in labels.into_iter().enumerate() {
        by_root.entry(root).or_default().push(i);
    }
    let mut clusters: Vec<Vec<usize>> = by_root.into_values().collect();
    // Stable order for the merge phase.
    clusters.sort_by_key(|members| members.first().copied().unwrap_or(0));
    clusters
}

/// Phase 2: iterative single-linkage merge at the full radius.
fn merge_pass(clusters: &mut Vec<Vec<usize>>, points: &[&Junction], config: &ClusterConfig) {
    let max_distance_sq = config.max_distance * config.max_distance;

    for _ in 0..config.max_merge_passes {
        let mut merged_any = false;
        let mut i = 0;
        while i < clusters.len() {
            let mut j = i + 1;
            while j < clusters.len() {
                if clusters_touch(&clusters[i], &clusters[j], points, max_distance_sq) {
                    let absorbed = clusters.swap_remove(j);
                    clusters[i].extend(absorbed);
                    merged_any = true;
                } else {
                    j += 1;
                }
            }
            i += 1;
        }
        if !merged_any {
            break;
        }
    }
}

/// Whether any cross-pair of members is within the merge radius.
fn clusters_touch(
    a: &[usize],
    b: &[usize],
    points: &[&Junction],
    max_distance_sq: f64,
) -> bool {
    a.iter().any(|&ia| {
        b.iter().any(|&ib| {
            points[ia]
                .position
                .distance_squared(points[ib].position)
                <= max_distance_sq
        })
    })
}

/// Compute the centroid and resolved kind for a cluster.
fn resolve(members: &[usize], points: &[&Junction]) -> ClusterPoint {
    #[allow(clippy::cast_precision_loss)]
    let count = members.len() as f64;
    let (sum_x, sum_y) = members.iter().fold((0.0, 0.0), |(sx, sy), &i| {
        (sx + points[i].position.x, sy + points[i].position.y)
    });

    let kind = members
        .iter()
        .map(|&i| points[i].kind)
        .max_by_key(|kind| kind.priority())
        // members is never empty: clusters are built from at least one point.
        .unwrap_or(JunctionKind::Unclassified);

    ClusterPoint {
        position: Point::new((sum_x / count).round(), (sum_y / count).round()),
        kind,
        member_count: members.len(),
    }
}
