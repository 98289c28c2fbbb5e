//! kabe-bench: CLI tool for pipeline parameter experimentation and diagnostics.
//!
//! Runs the vectorization pipeline on a given floorplan image with
//! configurable parameters, printing detailed per-stage diagnostics.
//! Useful for:
//!
//! - Comparing line extraction strategies (junction connection vs Hough)
//! - Tuning the binarization threshold, cluster radius, Hough thresholds
//! - Measuring per-stage durations to identify bottlenecks
//! - Understanding how parameter changes affect point/segment counts
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin kabe-bench -- [OPTIONS] <IMAGE_PATH>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use kabe_pipeline::diagnostics::PipelineDiagnostics;
use kabe_pipeline::types::{
    BinarizeConfig, ClassifyConfig, ClusterConfig, LineConfig, StagedResult, ThinningConfig,
};
use kabe_pipeline::{LineStrategyKind, PipelineConfig};

/// Pipeline parameter experimentation and diagnostics for kabe.
///
/// Runs the vectorization pipeline on a given floorplan image with
/// configurable parameters and prints detailed per-stage timing and
/// count diagnostics.
#[derive(Parser)]
#[command(name = "kabe-bench", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    image_path: PathBuf,

    /// Binarization luminance threshold (0-255).
    #[arg(long, default_value_t = BinarizeConfig::DEFAULT_THRESHOLD)]
    threshold: u8,

    /// Treat bright pixels as walls (default: dark pixels are walls).
    #[arg(long)]
    no_inverse: bool,

    /// Thinning pass cap.
    #[arg(long, default_value_t = ThinningConfig::DEFAULT_MAX_ITERATIONS, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    max_iterations: usize,

    /// Minimum neighbor count for the intersection rule.
    #[arg(long, default_value_t = ClassifyConfig::DEFAULT_MIN_NEIGHBORS)]
    min_neighbors: u8,

    /// Minimum transition count for the intersection rule.
    #[arg(long, default_value_t = ClassifyConfig::DEFAULT_MIN_TRANSITIONS)]
    min_transitions: u8,

    /// Cluster merge radius in pixels.
    #[arg(long, default_value_t = ClusterConfig::DEFAULT_MAX_DISTANCE)]
    max_distance: f64,

    /// Drop clusters smaller than this.
    #[arg(long, default_value_t = ClusterConfig::DEFAULT_MIN_CLUSTER_SIZE)]
    min_cluster_size: usize,

    /// Line extraction strategy.
    #[arg(long, value_enum, default_value_t = Strategy::Auto)]
    strategy: Strategy,

    /// Hough accumulator vote threshold.
    #[arg(long, default_value_t = LineConfig::DEFAULT_THRESHOLD)]
    line_threshold: u32,

    /// Minimum segment length in pixels.
    #[arg(long, default_value_t = LineConfig::DEFAULT_MIN_LINE_LENGTH)]
    min_line_length: f64,

    /// Along-line gap tolerance in pixels.
    #[arg(long, default_value_t = LineConfig::DEFAULT_MAX_LINE_GAP)]
    max_line_gap: f64,

    /// Junction-connection pair distance cap in pixels.
    #[arg(long, default_value_t = LineConfig::DEFAULT_MAX_CONNECTION_DISTANCE)]
    max_connection_distance: f64,

    /// Re-cluster segment intersections into the point set.
    #[arg(long)]
    merge_intersections: bool,

    /// Write review artifacts (skeletonized.png, clustered_points.png,
    /// features.svg) into this directory.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Number of runs for averaging.
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    runs: usize,

    /// Output diagnostics as JSON instead of human-readable report.
    #[arg(long)]
    json: bool,

    /// Full pipeline config as a JSON string.
    ///
    /// When provided, all other pipeline parameter flags are ignored.
    /// The JSON must be a valid `PipelineConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,
}

/// Line extraction strategy selection.
#[derive(Clone, Copy, ValueEnum)]
enum Strategy {
    /// Junction connection with Hough fallback.
    Auto,
    /// Junction connection only.
    JunctionConnect,
    /// Hough transform only.
    Hough,
}

/// Build a [`PipelineConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual parameter flags are ignored.  Otherwise, a config is
/// assembled from the individual flags.
fn config_from_cli(cli: &Cli) -> Result<PipelineConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    Ok(PipelineConfig {
        binarize: BinarizeConfig {
            threshold: cli.threshold,
            inverse: !cli.no_inverse,
        },
        thinning: ThinningConfig {
            max_iterations: cli.max_iterations,
        },
        classify: ClassifyConfig {
            min_neighbors: cli.min_neighbors,
            min_transitions: cli.min_transitions,
        },
        cluster: ClusterConfig {
            max_distance: cli.max_distance,
            min_cluster_size: cli.min_cluster_size,
            ..ClusterConfig::default()
        },
        lines: LineConfig {
            strategy: match cli.strategy {
                Strategy::Auto => LineStrategyKind::Auto,
                Strategy::JunctionConnect => LineStrategyKind::JunctionConnect,
                Strategy::Hough => LineStrategyKind::HoughTransform,
            },
            threshold: cli.line_threshold,
            min_line_length: cli.min_line_length,
            max_line_gap: cli.max_line_gap,
            max_connection_distance: cli.max_connection_distance,
            ..LineConfig::default()
        },
        merge_intersections: cli.merge_intersections,
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let image_bytes = match std::fs::read(&cli.image_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error reading {}: {e}", cli.image_path.display());
            return ExitCode::FAILURE;
        }
    };

    let rgba = match image::load_from_memory(&image_bytes) {
        Ok(decoded) => decoded.to_rgba8(),
        Err(e) => {
            eprintln!("Error decoding {}: {e}", cli.image_path.display());
            return ExitCode::FAILURE;
        }
    };

    eprintln!(
        "Image: {} ({} bytes, {}x{})",
        cli.image_path.display(),
        image_bytes.len(),
        rgba.width(),
        rgba.height(),
    );
    eprintln!("Config: {config:#?}");
    eprintln!("Runs: {}", cli.runs);
    eprintln!();

    let mut all_diagnostics = Vec::with_capacity(cli.runs);

    for run in 0..cli.runs {
        if cli.runs > 1 {
            eprintln!("--- Run {}/{} ---", run + 1, cli.runs);
        }

        match kabe_pipeline::vectorize_staged_with_diagnostics(
            rgba.as_raw(),
            rgba.width(),
            rgba.height(),
            &config,
        ) {
            Ok((staged, diagnostics)) => {
                if cli.json {
                    match serde_json::to_string_pretty(&diagnostics) {
                        Ok(json) => println!("{json}"),
                        Err(e) => {
                            eprintln!("Error serializing diagnostics: {e}");
                            return ExitCode::FAILURE;
                        }
                    }
                } else {
                    println!("{}", diagnostics.report());
                }

                // Write review artifacts on the first run only.
                if run == 0
                    && let Some(ref output_dir) = cli.output_dir
                {
                    write_artifacts(output_dir, &cli.image_path, &config, &staged);
                }

                all_diagnostics.push(diagnostics);
            }
            Err(e) => {
                eprintln!("Pipeline error: {e}");
                return ExitCode::FAILURE;
            }
        }

        if cli.runs > 1 {
            eprintln!();
        }
    }

    // Print summary when multiple runs.
    if cli.runs > 1 {
        print_multi_run_summary(&all_diagnostics);
    }

    ExitCode::SUCCESS
}

/// Write the review artifacts: the bare skeleton, the annotated overlay,
/// and the SVG feature export. Failures are reported but not fatal; the
/// diagnostics output is the primary product.
fn write_artifacts(
    output_dir: &Path,
    image_path: &Path,
    config: &PipelineConfig,
    staged: &StagedResult,
) {
    if let Err(e) = std::fs::create_dir_all(output_dir) {
        eprintln!("Error creating {}: {e}", output_dir.display());
        return;
    }

    let skeleton_path = output_dir.join("skeletonized.png");
    match staged.skeleton.to_gray_image().save(&skeleton_path) {
        Ok(()) => eprintln!("Skeleton written to {}", skeleton_path.display()),
        Err(e) => eprintln!("Error writing {}: {e}", skeleton_path.display()),
    }

    let overlay = kabe_export::annotate(&staged.skeleton, &staged.points, &staged.segments);
    let overlay_path = output_dir.join("clustered_points.png");
    match overlay.save(&overlay_path) {
        Ok(()) => eprintln!("Overlay written to {}", overlay_path.display()),
        Err(e) => eprintln!("Error writing {}: {e}", overlay_path.display()),
    }

    let title = image_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("bench");
    let desc = format!("{config:#?}");
    let config_json = serde_json::to_string(config).ok();
    let metadata = kabe_export::SvgMetadata {
        title: Some(title),
        description: Some(&desc),
        config_json: config_json.as_deref(),
    };
    let svg = kabe_export::to_svg(
        &staged.segments,
        &staged.points,
        staged.dimensions,
        &metadata,
    );
    let svg_path = output_dir.join("features.svg");
    match std::fs::write(&svg_path, &svg) {
        Ok(()) => eprintln!("SVG written to {} ({} bytes)", svg_path.display(), svg.len()),
        Err(e) => eprintln!("Error writing {}: {e}", svg_path.display()),
    }
}

/// Function pointer type for extracting a stage duration from diagnostics.
type StageExtractor = fn(&PipelineDiagnostics) -> Option<std::time::Duration>;

/// Print aggregated statistics across multiple runs.
#[allow(clippy::cast_precision_loss)]
fn print_multi_run_summary(all_diagnostics: &[PipelineDiagnostics]) {
    debug_assert!(!all_diagnostics.is_empty(), "no diagnostics to summarize");

    println!();
    println!(
        "Summary ({} runs)\n{}",
        all_diagnostics.len(),
        "=".repeat(60),
    );

    if all_diagnostics.is_empty() {
        println!("Warning: no diagnostics to summarize");
        return;
    }

    let durations: Vec<f64> = all_diagnostics
        .iter()
        .map(|d| d.total_duration.as_secs_f64() * 1000.0)
        .collect();

    let min = durations.iter().copied().reduce(f64::min).unwrap_or(0.0);
    let max = durations.iter().copied().reduce(f64::max).unwrap_or(0.0);
    let mean = durations.iter().sum::<f64>() / durations.len() as f64;

    println!("Total duration: min={min:.3}ms  mean={mean:.3}ms  max={max:.3}ms");

    // Per-stage means.
    println!();
    println!("{:<24} {:>12}", "Stage", "Mean (ms)");
    println!("{}", "-".repeat(40));

    let stage_extractors: &[(&str, StageExtractor)] = &[
        ("Binarize", |d| Some(d.binarize.duration)),
        ("Thinning", |d| Some(d.thinning.duration)),
        ("Classification", |d| Some(d.classification.duration)),
        ("Clustering", |d| Some(d.clustering.duration)),
        ("Line Extraction", |d| Some(d.line_extraction.duration)),
        ("Intersection", |d| Some(d.intersection.duration)),
        ("Re-cluster", |d| d.recluster.as_ref().map(|s| s.duration)),
    ];

    for (name, extractor) in stage_extractors {
        let stage_durations: Vec<f64> = all_diagnostics
            .iter()
            .filter_map(extractor)
            .map(|dur| dur.as_secs_f64() * 1000.0)
            .collect();

        if stage_durations.is_empty() {
            continue;
        }

        let stage_mean = stage_durations.iter().sum::<f64>() / stage_durations.len() as f64;
        println!("{name:<24} {stage_mean:>10.3}ms");
    }
}
