//! 3D scatter rendering of color tables and cluster results using Plotters

use crate::data::{Centroids, ClusterPoints, ColorSamples};
use plotters::coord::cartesian::Cartesian3d;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::ops::Range;
use std::path::Path;
use tracing::{info, warn};

/// Series colors for clusters, reused in order when there are more labels
const CLUSTER_COLORS: [RGBColor; 6] = [RED, GREEN, BLUE, CYAN, MAGENTA, YELLOW];

const CLUSTER_ALPHA: f64 = 0.6;
const CLUSTER_POINT_RADIUS: i32 = 3;
const CENTROID_STAR_RADIUS: i32 = 12;

/// Camera orientation in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewAngle {
    /// Angle above the x-y plane
    pub elevation: f64,
    /// Rotation around the z axis
    pub azimuth: f64,
}

impl Default for ViewAngle {
    fn default() -> Self {
        Self {
            elevation: 20.0,
            azimuth: 45.0,
        }
    }
}

/// Figure size in pixels and camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotOptions {
    pub width: u32,
    pub height: u32,
    pub view: ViewAngle,
}

impl PlotOptions {
    /// Two panels side by side, viewed from 20° up and 45° around
    pub fn color_comparison() -> Self {
        Self {
            width: 1500,
            height: 700,
            view: ViewAngle::default(),
        }
    }

    pub fn clusters() -> Self {
        Self {
            width: 1000,
            height: 800,
            view: ViewAngle {
                elevation: 30.0,
                azimuth: -60.0,
            },
        }
    }
}

/// Image encoding picked from the output file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    /// PNG, BMP or JPEG, depending on the extension
    Bitmap,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("svg") => Self::Svg,
            _ => Self::Bitmap,
        }
    }
}

/// Color used for the series of `label`
pub fn cluster_color(label: usize) -> RGBColor {
    CLUSTER_COLORS[label % CLUSTER_COLORS.len()]
}

/// Axis range covering `values` with 5% padding on both ends.
///
/// A constant axis is widened by 0.5 each way; no values gives `0..1`.
/// Fails when the padded extent no longer fits in an `f64`.
pub fn axis_range<I: IntoIterator<Item = f64>>(values: I) -> crate::Result<Range<f64>> {
    let (min, max) = values
        .into_iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    if min > max {
        return Ok(0.0..1.0);
    }

    let span = max - min;
    let pad = if span > 0.0 { span * 0.05 } else { 0.5 };
    let range = (min - pad)..(max + pad);
    if !(range.end - range.start).is_finite() {
        anyhow::bail!(
            "Values from {:e} to {:e} span too wide a range to plot",
            min,
            max
        );
    }
    Ok(range)
}

fn color_ranges(samples: &ColorSamples) -> crate::Result<[Range<f64>; 3]> {
    Ok([
        axis_range(samples.iter().map(|s| s.x))?,
        axis_range(samples.iter().map(|s| s.y))?,
        axis_range(samples.iter().map(|s| s.color_sum))?,
    ])
}

fn cluster_ranges(points: &ClusterPoints, centroids: &Centroids) -> crate::Result<[Range<f64>; 3]> {
    let all = || {
        points
            .coords
            .outer_iter()
            .chain(centroids.coords.outer_iter())
    };
    Ok([
        axis_range(all().map(|p| p[0]))?,
        axis_range(all().map(|p| p[1]))?,
        axis_range(all().map(|p| p[2]))?,
    ])
}

/// Warn once per table about channels that had to be clamped
fn warn_clamped_colors(name: &str, samples: &ColorSamples) {
    let clamped = samples.out_of_gamut();
    if clamped > 0 {
        warn!(table = name, rows = clamped, "colors outside [0, 1] were clamped");
    }
}

/// Vertices of a five-pointed star centred on the origin, in pixel offsets
fn star_vertices(radius: i32) -> Vec<(i32, i32)> {
    let outer = radius as f64;
    let inner = outer * 0.4;
    (0..10)
        .map(|i| {
            let r = if i % 2 == 0 { outer } else { inner };
            // Start at the top; screen y grows downwards.
            let angle = std::f64::consts::FRAC_PI_2 + i as f64 * std::f64::consts::PI / 5.0;
            (
                (r * angle.cos()).round() as i32,
                -(r * angle.sin()).round() as i32,
            )
        })
        .collect()
}

fn render<F, G>(output: &Path, options: &PlotOptions, draw_svg: F, draw_bitmap: G) -> crate::Result<()>
where
    F: FnOnce(&DrawingArea<SVGBackend, Shift>) -> crate::Result<()>,
    G: FnOnce(&DrawingArea<BitMapBackend, Shift>) -> crate::Result<()>,
{
    if options.width == 0 || options.height == 0 {
        anyhow::bail!(
            "Figure size must be non-zero, got {}x{}",
            options.width,
            options.height
        );
    }

    let size = (options.width, options.height);
    match OutputFormat::from_path(output) {
        OutputFormat::Svg => {
            let root = SVGBackend::new(output, size).into_drawing_area();
            root.fill(&WHITE)?;
            draw_svg(&root)?;
            root.present()?;
        }
        OutputFormat::Bitmap => {
            let root = BitMapBackend::new(output, size).into_drawing_area();
            root.fill(&WHITE)?;
            draw_bitmap(&root)?;
            root.present()?;
        }
    }
    Ok(())
}

/// Label the far end of each axis
fn draw_axis_titles<DB>(
    chart: &mut ChartContext<'_, DB, Cartesian3d<RangedCoordf64, RangedCoordf64, RangedCoordf64>>,
    ranges: &[Range<f64>; 3],
    titles: [&str; 3],
) -> crate::Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let [x, y, z] = ranges;
    let anchors = [
        (x.end, y.start, z.start),
        (x.start, y.end, z.start),
        (x.start, y.start, z.end),
    ];

    chart.draw_series(anchors.into_iter().zip(titles).map(|(at, title)| {
        Text::new(
            title.to_string(),
            at,
            ("sans-serif", 14).into_font().color(&BLACK),
        )
    }))?;
    Ok(())
}

fn draw_color_panel<DB>(
    area: &DrawingArea<DB, Shift>,
    samples: &ColorSamples,
    ranges: &[Range<f64>; 3],
    title: &str,
    view: ViewAngle,
) -> crate::Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 24))
        .margin(20)
        .build_cartesian_3d(ranges[0].clone(), ranges[1].clone(), ranges[2].clone())?;

    chart.with_projection(|mut pb| {
        pb.pitch = view.elevation.to_radians();
        pb.yaw = view.azimuth.to_radians();
        pb.scale = 0.8;
        pb.into_matrix()
    });

    chart
        .configure_axes()
        .light_grid_style(BLACK.mix(0.1))
        .max_light_lines(3)
        .draw()?;

    chart.draw_series(samples.iter().map(|sample| {
        let (r, g, b) = sample.rgb8();
        Circle::new(
            (sample.x, sample.y, sample.color_sum),
            1,
            RGBColor(r, g, b).filled(),
        )
    }))?;

    draw_axis_titles(
        &mut chart,
        ranges,
        ["X (Image Width)", "Y (Image Height)", "Color Sum (R+G+B)"],
    )
}

fn draw_color_comparison<DB>(
    root: &DrawingArea<DB, Shift>,
    panels: [(&ColorSamples, &[Range<f64>; 3], &str); 2],
    options: &PlotOptions,
) -> crate::Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let (left, right) = root.split_horizontally(options.width / 2);
    for (area, (samples, ranges, title)) in [left, right].iter().zip(panels) {
        draw_color_panel(area, samples, ranges, title, options.view)?;
    }
    Ok(())
}

/// Render original and segmented color tables side by side.
///
/// Each panel plots pixel position against color sum, with every point
/// filled in its own color.
pub fn plot_color_comparison(
    original: &ColorSamples,
    segmented: &ColorSamples,
    output: &Path,
    options: &PlotOptions,
) -> crate::Result<()> {
    warn_clamped_colors("original", original);
    warn_clamped_colors("segmented", segmented);

    let original_ranges = color_ranges(original)?;
    let segmented_ranges = color_ranges(segmented)?;
    let panels = [
        (original, &original_ranges, "Original Image Colors"),
        (segmented, &segmented_ranges, "Segmented Image Colors"),
    ];

    render(
        output,
        options,
        |root| draw_color_comparison(root, panels, options),
        |root| draw_color_comparison(root, panels, options),
    )?;

    info!(path = %output.display(), "color comparison written");
    Ok(())
}

fn draw_clusters<DB>(
    root: &DrawingArea<DB, Shift>,
    points: &ClusterPoints,
    centroids: &Centroids,
    ranges: &[Range<f64>; 3],
    view: ViewAngle,
) -> crate::Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let mut chart = ChartBuilder::on(root)
        .caption("K-means Clustering Results", ("sans-serif", 30))
        .margin(20)
        .build_cartesian_3d(ranges[0].clone(), ranges[1].clone(), ranges[2].clone())?;

    chart.with_projection(|mut pb| {
        pb.pitch = view.elevation.to_radians();
        pb.yaw = view.azimuth.to_radians();
        pb.scale = 0.8;
        pb.into_matrix()
    });

    chart
        .configure_axes()
        .light_grid_style(BLACK.mix(0.1))
        .max_light_lines(3)
        .draw()?;

    for label in points.distinct_labels() {
        let color = cluster_color(label).mix(CLUSTER_ALPHA);
        chart
            .draw_series(
                points
                    .points_in(label)
                    .into_iter()
                    .map(|p| Circle::new(p, CLUSTER_POINT_RADIUS, color.filled())),
            )?
            .label(format!("Cluster {}", label))
            .legend(move |(x, y)| Circle::new((x, y), 4, color.filled()));
    }

    chart
        .draw_series(centroids.points().into_iter().map(|c| {
            EmptyElement::at(c) + Polygon::new(star_vertices(CENTROID_STAR_RADIUS), BLACK.filled())
        }))?
        .label("Centroids")
        .legend(|(x, y)| EmptyElement::at((x, y)) + Polygon::new(star_vertices(6), BLACK.filled()));

    draw_axis_titles(&mut chart, ranges, ["X", "Y", "Z"])?;

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .position(SeriesLabelPosition::UpperRight)
        .draw()?;

    Ok(())
}

/// Render clustered points, one colored series per label, with the
/// centroids drawn as black stars.
pub fn plot_clusters(
    points: &ClusterPoints,
    centroids: &Centroids,
    output: &Path,
    options: &PlotOptions,
) -> crate::Result<()> {
    let labels = points.distinct_labels().len();
    if labels > CLUSTER_COLORS.len() {
        warn!(
            labels,
            palette = CLUSTER_COLORS.len(),
            "more clusters than palette colors, colors repeat"
        );
    }

    let ranges = cluster_ranges(points, centroids)?;
    render(
        output,
        options,
        |root| draw_clusters(root, points, centroids, &ranges, options.view),
        |root| draw_clusters(root, points, centroids, &ranges, options.view),
    )?;

    info!(path = %output.display(), "cluster plot written");
    Ok(())
}

/// Print cluster statistics to console
pub fn print_cluster_statistics(points: &ClusterPoints, centroids: &Centroids) {
    println!("\n=== Cluster Statistics ===");
    println!("Total points: {}", points.len());

    let total = points.len().max(1) as f64;
    for (label, size) in points.cluster_sizes() {
        let percentage = size as f64 / total * 100.0;
        println!("  Cluster {}: {} points ({:.1}%)", label, size, percentage);
    }

    println!("\nCentroids:");
    println!("  #   |        X |        Y |        Z");
    println!("  ----|----------|----------|---------");
    for (i, (x, y, z)) in centroids.points().into_iter().enumerate() {
        println!("  {:3} | {:8.3} | {:8.3} | {:8.3}", i, x, y, z);
    }
}

/// Print a one-line summary of each color table
pub fn print_color_statistics(original: &ColorSamples, segmented: &ColorSamples) {
    println!("\n=== Color Tables ===");
    for (name, samples) in [("Original", original), ("Segmented", segmented)] {
        let mean_sum = samples.iter().map(|s| s.color_sum).sum::<f64>() / samples.len().max(1) as f64;
        println!(
            "  {}: {} pixels, mean color sum {:.3}",
            name,
            samples.len(),
            mean_sum
        );
    }
}
