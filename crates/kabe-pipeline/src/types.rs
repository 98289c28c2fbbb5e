//! Shared types for the kabe vectorization pipeline.

use serde::{Deserialize, Serialize};

use crate::lines::LineStrategyKind;
use crate::mask::Mask;

/// Re-export `GrayImage` so downstream crates can reference skeleton
/// raster data without depending on `image` directly.
pub use image::GrayImage;

/// Re-export `RgbaImage` so downstream crates can reference annotated
/// overlay rasters without depending on `image` directly.
pub use image::RgbaImage;

/// A 2D point in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (pixels from left edge).
    pub x: f64,
    /// Vertical position (pixels from top edge).
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Avoids the square root for comparison purposes.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Semantic class of a skeleton junction pixel.
///
/// Assigned by the classifier from the pixel's 8-neighborhood pattern.
/// Once assigned, a point's kind is only reinterpreted by clustering's
/// priority-based type resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JunctionKind {
    /// A wall centerline terminates here (exactly one foreground neighbor).
    Endpoint,
    /// Two walls meet at a right angle.
    Corner,
    /// Three wall directions meet (a wall abuts another).
    TJunction,
    /// Four or more wall directions cross.
    Intersection,
    /// No recognized pattern. Never emitted by the classifier; present so
    /// cluster inputs from external sources can carry an explicit "no type".
    Unclassified,
}

impl JunctionKind {
    /// Priority used by clustering's type resolution.
    ///
    /// A cluster resolves to the highest-priority kind present among its
    /// members, not the most frequent one.
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Self::Intersection => 4,
            Self::TJunction => 3,
            Self::Corner => 2,
            Self::Endpoint => 1,
            Self::Unclassified => 0,
        }
    }

    /// All four classified kinds, in priority order.
    pub const CLASSIFIED: [Self; 4] = [
        Self::Intersection,
        Self::TJunction,
        Self::Corner,
        Self::Endpoint,
    ];
}

/// A classified skeleton point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Junction {
    /// Pixel position on the skeleton.
    pub position: Point,
    /// Semantic class assigned from the 8-neighborhood pattern.
    pub kind: JunctionKind,
}

impl Junction {
    /// Create a new classified point.
    #[must_use]
    pub const fn new(position: Point, kind: JunctionKind) -> Self {
        Self { position, kind }
    }
}

/// A cluster centroid: several nearby detections merged into one
/// representative point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClusterPoint {
    /// Rounded arithmetic mean of the member positions.
    pub position: Point,
    /// Highest-priority kind present among the members.
    pub kind: JunctionKind,
    /// Number of source points merged into this centroid.
    pub member_count: usize,
}

/// An undirected straight wall segment.
///
/// Endpoint order carries no meaning, but it is preserved so duplicate
/// comparisons can consider both pairings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    /// One endpoint.
    pub start: Point,
    /// The other endpoint.
    pub end: Point,
}

impl LineSegment {
    /// Create a new segment.
    #[must_use]
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Euclidean length of the segment.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    /// Sum of endpoint distances to another segment, taken in the cheaper
    /// of the two pairing orders.
    ///
    /// Symmetric under endpoint swap of either segment; used by both line
    /// extraction strategies to judge duplicates.
    #[must_use]
    pub fn endpoint_distance_sum(&self, other: &Self) -> f64 {
        let direct = self.start.distance(other.start) + self.end.distance(other.end);
        let crossed = self.start.distance(other.end) + self.end.distance(other.start);
        direct.min(crossed)
    }
}

/// Binarization parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinarizeConfig {
    /// Luminance threshold (0-255).
    pub threshold: u8,
    /// When `true`, pixels darker than the threshold are foreground
    /// (walls drawn dark on a light plan). When `false`, brighter pixels
    /// are foreground.
    pub inverse: bool,
}

impl BinarizeConfig {
    /// Default luminance threshold.
    pub const DEFAULT_THRESHOLD: u8 = 100;
    /// Default polarity: dark pixels are walls.
    pub const DEFAULT_INVERSE: bool = true;
}

impl Default for BinarizeConfig {
    fn default() -> Self {
        Self {
            threshold: Self::DEFAULT_THRESHOLD,
            inverse: Self::DEFAULT_INVERSE,
        }
    }
}

/// Zhang-Suen thinning parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThinningConfig {
    /// Hard cap on full passes (both sub-iterations). Non-convergence
    /// within the cap is not an error; the partial skeleton is returned.
    pub max_iterations: usize,
}

impl ThinningConfig {
    /// Default pass cap.
    pub const DEFAULT_MAX_ITERATIONS: usize = 100;
}

impl Default for ThinningConfig {
    fn default() -> Self {
        Self {
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// Junction classification parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifyConfig {
    /// Minimum foreground-neighbor count for the intersection rule.
    pub min_neighbors: u8,
    /// Minimum 0-to-1 transition count for the intersection rule.
    pub min_transitions: u8,
}

impl ClassifyConfig {
    /// Default neighbor floor for intersections.
    pub const DEFAULT_MIN_NEIGHBORS: u8 = 4;
    /// Default transition floor for intersections.
    pub const DEFAULT_MIN_TRANSITIONS: u8 = 2;
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            min_neighbors: Self::DEFAULT_MIN_NEIGHBORS,
            min_transitions: Self::DEFAULT_MIN_TRANSITIONS,
        }
    }
}

/// Point clustering parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Single-linkage merge radius for the iterative merge phase.
    pub max_distance: f64,
    /// Clusters with fewer members than this are dropped.
    pub min_cluster_size: usize,
    /// Cap on iterative merge passes.
    pub max_merge_passes: usize,
    /// Which point kinds participate in clustering. Points of other
    /// kinds are dropped before grouping.
    pub preserve_kinds: Vec<JunctionKind>,
}

impl ClusterConfig {
    /// Default merge radius in pixels.
    pub const DEFAULT_MAX_DISTANCE: f64 = 20.0;
    /// Default minimum cluster size.
    pub const DEFAULT_MIN_CLUSTER_SIZE: usize = 1;
    /// Default merge pass cap.
    pub const DEFAULT_MAX_MERGE_PASSES: usize = 10;

    /// Radius for the initial tight grouping pass: `max(8, max_distance/2)`.
    #[must_use]
    pub fn tight_radius(&self) -> f64 {
        (self.max_distance / 2.0).max(8.0)
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            max_distance: Self::DEFAULT_MAX_DISTANCE,
            min_cluster_size: Self::DEFAULT_MIN_CLUSTER_SIZE,
            max_merge_passes: Self::DEFAULT_MAX_MERGE_PASSES,
            preserve_kinds: JunctionKind::CLASSIFIED.to_vec(),
        }
    }
}

/// Line extraction parameters, shared by both strategies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineConfig {
    /// Which extraction strategy to run.
    pub strategy: LineStrategyKind,
    /// Hough accumulator vote threshold.
    pub threshold: u32,
    /// Minimum end-to-end extent for a Hough run to become a segment.
    pub min_line_length: f64,
    /// Maximum along-line gap between consecutive contributing pixels
    /// within one Hough run. Also scales the duplicate-suppression
    /// distances of both strategies.
    pub max_line_gap: f64,
    /// Maximum perpendicular distance from a bin's exact line for a
    /// contributing pixel to count toward a run.
    pub max_point_distance: f64,
    /// Maximum pair distance considered by the junction-connection
    /// strategy.
    pub max_connection_distance: f64,
}

impl LineConfig {
    /// Default Hough vote threshold.
    pub const DEFAULT_THRESHOLD: u32 = 20;
    /// Default minimum segment length in pixels.
    pub const DEFAULT_MIN_LINE_LENGTH: f64 = 20.0;
    /// Default along-line gap tolerance in pixels.
    pub const DEFAULT_MAX_LINE_GAP: f64 = 5.0;
    /// Default perpendicular distance tolerance in pixels.
    pub const DEFAULT_MAX_POINT_DISTANCE: f64 = 5.0;
    /// Default junction-connection pair distance cap in pixels.
    pub const DEFAULT_MAX_CONNECTION_DISTANCE: f64 = 100.0;
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            strategy: LineStrategyKind::default(),
            threshold: Self::DEFAULT_THRESHOLD,
            min_line_length: Self::DEFAULT_MIN_LINE_LENGTH,
            max_line_gap: Self::DEFAULT_MAX_LINE_GAP,
            max_point_distance: Self::DEFAULT_MAX_POINT_DISTANCE,
            max_connection_distance: Self::DEFAULT_MAX_CONNECTION_DISTANCE,
        }
    }
}

/// Configuration for the full vectorization pipeline.
///
/// Every field has a sensible default and every sub-struct deserializes
/// missing fields to those defaults, so a partial JSON config is always
/// valid input.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Binarization parameters.
    pub binarize: BinarizeConfig,
    /// Thinning parameters.
    pub thinning: ThinningConfig,
    /// Junction classification parameters.
    pub classify: ClassifyConfig,
    /// Point clustering parameters.
    pub cluster: ClusterConfig,
    /// Line extraction parameters.
    pub lines: LineConfig,
    /// When `true`, segment intersection points are fed back and
    /// re-clustered together with the first-pass centroids.
    pub merge_intersections: bool,
}

impl PipelineConfig {
    /// Validate the configuration, rejecting values that would produce
    /// nonsensical output (negative or non-finite distances, a zero
    /// iteration cap).
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] naming the offending field.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.thinning.max_iterations == 0 {
            return Err(PipelineError::InvalidConfig(
                "thinning.max_iterations must be at least 1".to_string(),
            ));
        }
        check_positive("cluster.max_distance", self.cluster.max_distance)?;
        check_positive(
            "lines.max_connection_distance",
            self.lines.max_connection_distance,
        )?;
        check_non_negative("lines.min_line_length", self.lines.min_line_length)?;
        check_non_negative("lines.max_line_gap", self.lines.max_line_gap)?;
        check_non_negative("lines.max_point_distance", self.lines.max_point_distance)?;
        Ok(())
    }
}

/// Reject non-finite or non-positive distance parameters.
fn check_positive(name: &str, value: f64) -> Result<(), PipelineError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PipelineError::InvalidConfig(format!(
            "{name} must be finite and positive, got {value}",
        )))
    }
}

/// Reject non-finite or negative distance parameters.
fn check_non_negative(name: &str, value: f64) -> Result<(), PipelineError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(PipelineError::InvalidConfig(format!(
            "{name} must be finite and non-negative, got {value}",
        )))
    }
}

/// Result of running the full vectorization pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorizeResult {
    /// The thinned wall skeleton.
    pub skeleton: Mask,
    /// Final clustered junction points (after intersection merging when
    /// enabled).
    pub points: Vec<ClusterPoint>,
    /// Extracted wall segments.
    pub segments: Vec<LineSegment>,
    /// Source image dimensions in pixels.
    pub dimensions: Dimensions,
}

/// Result of running the pipeline with all intermediate stage outputs
/// preserved, for review tooling and parameter tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagedResult {
    /// Stage 1: binarized foreground mask.
    pub mask: Mask,
    /// Stage 2: thinned skeleton.
    pub skeleton: Mask,
    /// Full thinning passes executed (including the final quiet pass).
    pub thinning_iterations: usize,
    /// Whether thinning reached a fixed point within the pass cap.
    pub thinning_converged: bool,
    /// Stage 3: raw classified junction pixels.
    pub junctions: Vec<Junction>,
    /// Stage 4: first-pass cluster centroids.
    pub clusters: Vec<ClusterPoint>,
    /// Stage 5: extracted wall segments.
    pub segments: Vec<LineSegment>,
    /// Stage 6: raw pairwise segment intersection points.
    pub intersections: Vec<Junction>,
    /// Final points: re-clustered with intersections when
    /// `merge_intersections` is enabled, otherwise equal to `clusters`.
    pub points: Vec<ClusterPoint>,
    /// Source image dimensions in pixels.
    pub dimensions: Dimensions,
}

/// Errors that can occur during pipeline processing.
///
/// All variants are caller programming errors; data problems (noisy
/// input, non-convergent thinning, too few points for line extraction)
/// degrade gracefully instead of failing.
#[derive(Debug, thiserror::Error, Serialize, Deserialize)]
pub enum PipelineError {
    /// Input width or height was zero.
    #[error("input dimensions must be nonzero, got {width}x{height}")]
    ZeroDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// The pixel buffer length does not match the stated dimensions.
    #[error("buffer length {actual} does not match expected {expected}")]
    BufferSizeMismatch {
        /// Expected byte length for the stated dimensions.
        expected: usize,
        /// Actual byte length supplied.
        actual: usize,
    },

    /// Pipeline configuration is internally inconsistent.
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),
}
