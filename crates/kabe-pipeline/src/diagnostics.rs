//! Pipeline diagnostics: timing, counts, and other metrics for each stage.
//!
//! These diagnostics are permanent instrumentation intended for
//! algorithm tuning and parameter experimentation. Every call to
//! [`vectorize_staged_with_diagnostics`](crate::vectorize_staged_with_diagnostics)
//! collects diagnostics alongside the pipeline results.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::{JunctionKind, LineSegment};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from a single pipeline run.
///
/// Each field captures metrics for one logical stage of the pipeline.
/// The re-cluster stage only runs when `config.merge_intersections` is
/// enabled and is `None` otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDiagnostics {
    /// Stage 1: binarization.
    pub binarize: StageDiagnostics,
    /// Stage 2: Zhang-Suen thinning.
    pub thinning: StageDiagnostics,
    /// Stage 3: junction classification.
    pub classification: StageDiagnostics,
    /// Stage 4: point clustering.
    pub clustering: StageDiagnostics,
    /// Stage 5: line extraction.
    pub line_extraction: StageDiagnostics,
    /// Stage 6: segment intersection.
    pub intersection: StageDiagnostics,
    /// Stage 7: intersection re-clustering (only when
    /// `config.merge_intersections == true`).
    pub recluster: Option<StageDiagnostics>,
    /// Total wall-clock duration of the entire pipeline (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across all stages.
    pub summary: PipelineSummary,
}

/// Diagnostics for a single pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics (counts, sizes, etc.).
    pub metrics: StageMetrics,
}

/// Stage-specific metrics that vary by pipeline stage.
///
/// Each variant captures the counts and sizes meaningful for that
/// particular processing step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Binarization metrics.
    Binarize {
        /// Luminance threshold used.
        threshold: u8,
        /// Whether dark pixels were treated as foreground.
        inverse: bool,
        /// Number of foreground pixels in the mask.
        foreground_pixel_count: u64,
        /// Total pixel count for computing foreground density.
        total_pixel_count: u64,
    },
    /// Thinning metrics.
    Thinning {
        /// Full passes executed (including the final quiet pass).
        iterations: usize,
        /// Whether a fixed point was reached within the pass cap.
        converged: bool,
        /// Foreground pixels before thinning.
        pixels_before: u64,
        /// Foreground pixels in the skeleton.
        pixels_after: u64,
    },
    /// Junction classification metrics.
    Classification {
        /// Total classified points.
        junction_count: usize,
        /// Endpoint detections.
        endpoint_count: usize,
        /// Corner detections.
        corner_count: usize,
        /// T-junction detections.
        t_junction_count: usize,
        /// Intersection detections.
        intersection_count: usize,
    },
    /// Point clustering metrics (first pass or re-cluster).
    Clustering {
        /// Points fed into clustering.
        input_point_count: usize,
        /// Clusters produced.
        cluster_count: usize,
        /// Members in the largest cluster.
        largest_cluster: usize,
    },
    /// Line extraction metrics.
    LineExtraction {
        /// Which extraction strategy actually produced the segments.
        strategy: String,
        /// Segments extracted.
        segment_count: usize,
        /// Sum of segment lengths in pixels.
        total_length: f64,
        /// Mean segment length in pixels.
        mean_length: f64,
    },
    /// Segment intersection metrics.
    Intersection {
        /// Segment pairs tested.
        pair_count: usize,
        /// In-segment intersection points found.
        intersection_count: usize,
    },
}

/// High-level summary counts for the entire pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Source image width in pixels.
    pub image_width: u32,
    /// Source image height in pixels.
    pub image_height: u32,
    /// Total pixel count.
    pub pixel_count: u64,
    /// Final junction point count.
    pub point_count: usize,
    /// Final wall segment count.
    pub segment_count: usize,
}

impl PipelineDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Pipeline Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Image: {}x{} ({} pixels)",
            self.summary.image_width, self.summary.image_height, self.summary.pixel_count,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        // Per-stage breakdown.
        lines.push(format!(
            "{:<24} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);

        let stages: Vec<(&str, &StageDiagnostics)> = {
            let mut s = vec![
                ("Binarize", &self.binarize),
                ("Thinning", &self.thinning),
                ("Classification", &self.classification),
                ("Clustering", &self.clustering),
                ("Line Extraction", &self.line_extraction),
                ("Intersection", &self.intersection),
            ];
            if let Some(ref re) = self.recluster {
                s.push(("Re-cluster", re));
            }
            s
        };

        for (name, diag) in &stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<24} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!(
            "Points: {}  |  Segments: {}",
            self.summary.point_count, self.summary.segment_count,
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Binarize {
            threshold,
            inverse,
            foreground_pixel_count,
            total_pixel_count,
        } => {
            #[allow(clippy::cast_precision_loss)]
            let density = if *total_pixel_count > 0 {
                *foreground_pixel_count as f64 / *total_pixel_count as f64 * 100.0
            } else {
                0.0
            };
            format!(
                "threshold={threshold} inverse={inverse} fg={foreground_pixel_count} ({density:.1}%)",
            )
        }
        StageMetrics::Thinning {
            iterations,
            converged,
            pixels_before,
            pixels_after,
        } => {
            format!(
                "{iterations} passes ({}) {pixels_before}->{pixels_after} px",
                if *converged { "converged" } else { "capped" },
            )
        }
        StageMetrics::Classification {
            junction_count,
            endpoint_count,
            corner_count,
            t_junction_count,
            intersection_count,
        } => {
            format!(
                "{junction_count} pts (end={endpoint_count} corner={corner_count} t={t_junction_count} cross={intersection_count})",
            )
        }
        StageMetrics::Clustering {
            input_point_count,
            cluster_count,
            largest_cluster,
        } => {
            format!("{input_point_count}->{cluster_count} clusters (largest={largest_cluster})")
        }
        StageMetrics::LineExtraction {
            strategy,
            segment_count,
            total_length,
            mean_length,
        } => {
            format!(
                "{strategy} {segment_count} segments, {total_length:.1}px total (mean={mean_length:.1}px)",
            )
        }
        StageMetrics::Intersection {
            pair_count,
            intersection_count,
        } => {
            format!("{pair_count} pairs -> {intersection_count} crossings")
        }
    }
}

/// Per-kind detection counts for the classification stage.
pub(crate) fn classification_metrics(junctions: &[crate::types::Junction]) -> StageMetrics {
    let count_of = |kind: JunctionKind| junctions.iter().filter(|j| j.kind == kind).count();
    StageMetrics::Classification {
        junction_count: junctions.len(),
        endpoint_count: count_of(JunctionKind::Endpoint),
        corner_count: count_of(JunctionKind::Corner),
        t_junction_count: count_of(JunctionKind::TJunction),
        intersection_count: count_of(JunctionKind::Intersection),
    }
}

/// Segment count and length statistics for the line extraction stage.
pub(crate) fn line_metrics(strategy: &str, segments: &[LineSegment]) -> StageMetrics {
    let total_length: f64 = segments.iter().map(LineSegment::length).sum();
    #[allow(clippy::cast_precision_loss)]
    let mean_length = if segments.is_empty() {
        0.0
    } else {
        total_length / segments.len() as f64
    };
    StageMetrics::LineExtraction {
        strategy: strategy.to_string(),
        segment_count: segments.len(),
        total_length,
        mean_length,
    }
}
