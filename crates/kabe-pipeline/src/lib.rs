//! kabe-pipeline: floorplan raster to vector conversion (sans-IO).
//!
//! Converts a rasterized floorplan into wall junction points and wall
//! segments through: binarization -> Zhang-Suen thinning -> junction
//! classification -> point clustering -> line extraction -> segment
//! intersection.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! pixel buffers and returns structured data. Image decoding, encoding,
//! and export serialization live in the caller and in `kabe-export`.

pub mod binarize;
pub mod classify;
pub mod cluster;
pub mod diagnostics;
pub mod hough;
pub mod intersect;
pub mod lines;
pub mod mask;
pub mod thin;
pub mod types;

pub use diagnostics::{PipelineDiagnostics, PipelineSummary, StageDiagnostics, StageMetrics};
pub use lines::{LineStrategy, LineStrategyKind};
pub use mask::Mask;
pub use thin::ThinningResult;
pub use types::{
    BinarizeConfig, ClassifyConfig, ClusterConfig, ClusterPoint, Dimensions, Junction,
    JunctionKind, LineConfig, LineSegment, PipelineConfig, PipelineError, Point, StagedResult,
    ThinningConfig, VectorizeResult,
};

use std::time::Instant;

use diagnostics::{classification_metrics, line_metrics};

/// Run the full vectorization pipeline.
///
/// Takes a packed RGBA buffer (4 bytes per pixel, row-major) and a
/// configuration, then produces a [`VectorizeResult`] containing the
/// skeleton, the clustered junction points, and the extracted wall
/// segments. The dimensions are needed by export serializers to set
/// coordinate spaces (e.g., SVG `viewBox`).
///
/// # Pipeline steps
///
/// 1. Binarize into a foreground mask
/// 2. Zhang-Suen thinning to 1-pixel centerlines
/// 3. Junction classification from 8-neighborhood patterns
/// 4. Point clustering into representative centroids
/// 5. Line extraction (pluggable strategy)
/// 6. Pairwise segment intersection, optionally re-clustered into the
///    point set when `config.merge_intersections` is enabled
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if the configuration fails
/// validation, [`PipelineError::ZeroDimensions`] if either dimension is
/// zero, or [`PipelineError::BufferSizeMismatch`] if the buffer length
/// does not match the stated dimensions. Data problems (blank images,
/// non-convergent thinning, too few points) degrade to empty output
/// instead of failing.
pub fn vectorize(
    rgba: &[u8],
    width: u32,
    height: u32,
    config: &PipelineConfig,
) -> Result<VectorizeResult, PipelineError> {
    let staged = vectorize_staged(rgba, width, height, config)?;
    Ok(VectorizeResult {
        skeleton: staged.skeleton,
        points: staged.points,
        segments: staged.segments,
        dimensions: staged.dimensions,
    })
}

/// Run the pipeline keeping every intermediate stage output, for review
/// tooling and parameter tuning.
///
/// # Errors
///
/// Same conditions as [`vectorize`].
pub fn vectorize_staged(
    rgba: &[u8],
    width: u32,
    height: u32,
    config: &PipelineConfig,
) -> Result<StagedResult, PipelineError> {
    vectorize_staged_with_diagnostics(rgba, width, height, config).map(|(staged, _)| staged)
}

/// Run the pipeline keeping intermediate stage outputs and collecting
/// per-stage timing and metrics.
///
/// # Errors
///
/// Same conditions as [`vectorize`].
#[allow(clippy::too_many_lines)]
pub fn vectorize_staged_with_diagnostics(
    rgba: &[u8],
    width: u32,
    height: u32,
    config: &PipelineConfig,
) -> Result<(StagedResult, PipelineDiagnostics), PipelineError> {
    config.validate()?;
    let pipeline_start = Instant::now();

    // 1. Binarize.
    let stage_start = Instant::now();
    let mask = binarize::binarize(rgba, width, height, &config.binarize)?;
    let binarize_diag = StageDiagnostics {
        duration: stage_start.elapsed(),
        metrics: StageMetrics::Binarize {
            threshold: config.binarize.threshold,
            inverse: config.binarize.inverse,
            foreground_pixel_count: mask.foreground_count(),
            total_pixel_count: u64::from(width) * u64::from(height),
        },
    };

    // 2. Thin to 1-pixel centerlines.
    let stage_start = Instant::now();
    let thinning = thin::thin(&mask, &config.thinning);
    let thinning_diag = StageDiagnostics {
        duration: stage_start.elapsed(),
        metrics: StageMetrics::Thinning {
            iterations: thinning.iterations,
            converged: thinning.converged,
            pixels_before: mask.foreground_count(),
            pixels_after: thinning.skeleton.foreground_count(),
        },
    };

    // 3. Classify junction pixels.
    let stage_start = Instant::now();
    let junctions = classify::classify(&thinning.skeleton, &config.classify);
    let classification_diag = StageDiagnostics {
        duration: stage_start.elapsed(),
        metrics: classification_metrics(&junctions),
    };

    // 4. Cluster nearby detections.
    let stage_start = Instant::now();
    let clusters = cluster::cluster(&junctions, &config.cluster)?;
    let clustering_diag = StageDiagnostics {
        duration: stage_start.elapsed(),
        metrics: StageMetrics::Clustering {
            input_point_count: junctions.len(),
            cluster_count: clusters.len(),
            largest_cluster: clusters.iter().map(|c| c.member_count).max().unwrap_or(0),
        },
    };

    // 5. Extract wall segments. The Auto strategy prefers junction
    // connection and falls back to the Hough transform when it produces
    // nothing; the diagnostics record which strategy actually ran.
    let stage_start = Instant::now();
    let (segments, strategy_name) = match config.lines.strategy {
        LineStrategyKind::Auto => {
            let connected = lines::connect_junctions(&thinning.skeleton, &clusters, &config.lines);
            if connected.is_empty() {
                (
                    hough::extract_lines(&thinning.skeleton, &config.lines),
                    "hough-transform",
                )
            } else {
                (connected, "junction-connect")
            }
        }
        LineStrategyKind::JunctionConnect => (
            lines::connect_junctions(&thinning.skeleton, &clusters, &config.lines),
            "junction-connect",
        ),
        LineStrategyKind::HoughTransform => (
            hough::extract_lines(&thinning.skeleton, &config.lines),
            "hough-transform",
        ),
    };
    let line_diag = StageDiagnostics {
        duration: stage_start.elapsed(),
        metrics: line_metrics(strategy_name, &segments),
    };

    // 6. Pairwise segment intersection.
    let stage_start = Instant::now();
    let intersections = intersect::intersections(&segments);
    let intersection_diag = StageDiagnostics {
        duration: stage_start.elapsed(),
        metrics: StageMetrics::Intersection {
            pair_count: segments.len() * segments.len().saturating_sub(1) / 2,
            intersection_count: intersections.len(),
        },
    };

    // 7. Optional intersection merge: re-cluster the centroids together
    // with the raw intersection points as unit-weight detections.
    let (points, recluster_diag) = if config.merge_intersections && !intersections.is_empty() {
        let stage_start = Instant::now();
        let combined: Vec<Junction> = clusters
            .iter()
            .map(|c| Junction::new(c.position, c.kind))
            .chain(intersections.iter().copied())
            .collect();
        let merged = cluster::cluster(&combined, &config.cluster)?;
        let diag = StageDiagnostics {
            duration: stage_start.elapsed(),
            metrics: StageMetrics::Clustering {
                input_point_count: combined.len(),
                cluster_count: merged.len(),
                largest_cluster: merged.iter().map(|c| c.member_count).max().unwrap_or(0),
            },
        };
        (merged, Some(diag))
    } else {
        (clusters.clone(), None)
    };

    let diagnostics = PipelineDiagnostics {
        binarize: binarize_diag,
        thinning: thinning_diag,
        classification: classification_diag,
        clustering: clustering_diag,
        line_extraction: line_diag,
        intersection: intersection_diag,
        recluster: recluster_diag,
        total_duration: pipeline_start.elapsed(),
        summary: PipelineSummary {
            image_width: width,
            image_height: height,
            pixel_count: u64::from(width) * u64::from(height),
            point_count: points.len(),
            segment_count: segments.len(),
        },
    };

    let staged = StagedResult {
        mask,
        skeleton: thinning.skeleton,
        thinning_iterations: thinning.iterations,
        thinning_converged: thinning.converged,
        junctions,
        clusters,
        segments,
        intersections,
        points,
        dimensions: Dimensions { width, height },
    };
    Ok((staged, diagnostics))
}
