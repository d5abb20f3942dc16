//! scatterview entrypoint: parses arguments, loads the tables and renders
//! the requested figure.

use anyhow::{Context, Result};
use clap::Parser;
use scatterview::{viz, Args, Centroids, ClusterPoints, ColorSamples, Command, PlotOptions};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = match args.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let start_time = Instant::now();

    match &args.command {
        Command::Colors {
            original,
            segmented,
            output,
            figure,
        } => {
            let options = figure.plot_options(PlotOptions::color_comparison())?;
            run_colors(original, segmented, output, &options)?;
        }
        Command::Clusters {
            data,
            centroids,
            output,
            figure,
        } => {
            let options = figure.plot_options(PlotOptions::clusters())?;
            run_clusters(data, centroids, output, &options)?;
        }
    }

    info!(elapsed = ?start_time.elapsed(), "done");
    Ok(())
}

/// Render the original/segmented color comparison
fn run_colors(original: &Path, segmented: &Path, output: &Path, options: &PlotOptions) -> Result<()> {
    info!(original = %original.display(), segmented = %segmented.display(), "loading color tables");

    let original = ColorSamples::load(original)?;
    let segmented = ColorSamples::load(segmented)?;
    debug!(
        original = original.len(),
        segmented = segmented.len(),
        "color tables loaded"
    );

    viz::plot_color_comparison(&original, &segmented, output, options)
        .with_context(|| format!("Failed to render {}", output.display()))?;

    println!("✓ Color comparison saved to: {}", output.display());
    viz::print_color_statistics(&original, &segmented);
    Ok(())
}

/// Render clustered points and their centroids
fn run_clusters(data: &Path, centroids: &Path, output: &Path, options: &PlotOptions) -> Result<()> {
    info!(data = %data.display(), centroids = %centroids.display(), "loading cluster tables");

    let points = ClusterPoints::load(data)?;
    let centroids = Centroids::load(centroids)?;
    debug!(
        points = points.len(),
        clusters = points.distinct_labels().len(),
        centroids = centroids.len(),
        "cluster tables loaded"
    );

    viz::plot_clusters(&points, &centroids, output, options)
        .with_context(|| format!("Failed to render {}", output.display()))?;

    println!("✓ Cluster plot saved to: {}", output.display());
    viz::print_cluster_statistics(&points, &centroids);
    Ok(())
}
