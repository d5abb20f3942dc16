//! Command-line interface definitions and argument parsing

use crate::viz::{PlotOptions, ViewAngle};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// 3D scatter plots of pixel color tables and k-means cluster results
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compare original and segmented image colors side by side
    Colors {
        /// Color table of the original image (x y color_sum r g b)
        #[arg(long, default_value = "original_colors.txt")]
        original: PathBuf,

        /// Color table of the segmented image (x y color_sum r g b)
        #[arg(long, default_value = "segmented_colors.txt")]
        segmented: PathBuf,

        /// Output image; an .svg extension renders SVG, anything else a bitmap
        #[arg(short, long, default_value = "color_comparison.png")]
        output: PathBuf,

        #[command(flatten)]
        figure: FigureArgs,
    },

    /// Show points colored by cluster together with the centroids
    Clusters {
        /// Clustered points (x y z cluster_label)
        #[arg(long, default_value = "cluster_data.txt")]
        data: PathBuf,

        /// Cluster centroids (x y z)
        #[arg(long, default_value = "centroids.txt")]
        centroids: PathBuf,

        /// Output image; an .svg extension renders SVG, anything else a bitmap
        #[arg(short, long, default_value = "cluster_plot.png")]
        output: PathBuf,

        #[command(flatten)]
        figure: FigureArgs,
    },
}

/// Figure size and camera; unset fields fall back to the command's defaults
#[derive(ClapArgs, Debug, Clone, Copy, Default)]
pub struct FigureArgs {
    /// Figure width in pixels [default: 1500 for colors, 1000 for clusters]
    #[arg(long)]
    pub width: Option<u32>,

    /// Figure height in pixels [default: 700 for colors, 800 for clusters]
    #[arg(long)]
    pub height: Option<u32>,

    /// Camera elevation in degrees [default: 20 for colors, 30 for clusters]
    #[arg(long, allow_negative_numbers = true)]
    pub elevation: Option<f64>,

    /// Camera azimuth in degrees [default: 45 for colors, -60 for clusters]
    #[arg(long, allow_negative_numbers = true)]
    pub azimuth: Option<f64>,
}

impl FigureArgs {
    /// Overlay the given flags on `defaults`
    pub fn plot_options(&self, defaults: PlotOptions) -> crate::Result<PlotOptions> {
        let options = PlotOptions {
            width: self.width.unwrap_or(defaults.width),
            height: self.height.unwrap_or(defaults.height),
            view: ViewAngle {
                elevation: self.elevation.unwrap_or(defaults.view.elevation),
                azimuth: self.azimuth.unwrap_or(defaults.view.azimuth),
            },
        };

        if options.width == 0 || options.height == 0 {
            anyhow::bail!("Figure width and height must be positive");
        }
        if !options.view.elevation.is_finite() || !options.view.azimuth.is_finite() {
            anyhow::bail!("View angles must be finite numbers");
        }

        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colors_defaults() {
        let args = Args::try_parse_from(["scatterview", "colors"]).unwrap();
        match args.command {
            Command::Colors {
                original,
                segmented,
                output,
                figure,
            } => {
                assert_eq!(original, PathBuf::from("original_colors.txt"));
                assert_eq!(segmented, PathBuf::from("segmented_colors.txt"));
                assert_eq!(output, PathBuf::from("color_comparison.png"));
                assert_eq!(
                    figure.plot_options(PlotOptions::color_comparison()).unwrap(),
                    PlotOptions::color_comparison()
                );
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_clusters_overrides() {
        let args = Args::try_parse_from([
            "scatterview",
            "-vv",
            "clusters",
            "--data",
            "points.txt",
            "--azimuth",
            "-30",
            "-o",
            "out.svg",
        ])
        .unwrap();
        assert_eq!(args.verbose, 2);

        match args.command {
            Command::Clusters {
                data,
                centroids,
                output,
                figure,
            } => {
                assert_eq!(data, PathBuf::from("points.txt"));
                assert_eq!(centroids, PathBuf::from("centroids.txt"));
                assert_eq!(output, PathBuf::from("out.svg"));
                let options = figure.plot_options(PlotOptions::clusters()).unwrap();
                assert_eq!(options.width, 1000);
                assert_eq!(options.view.elevation, 30.0);
                assert_eq!(options.view.azimuth, -30.0);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_zero_width_rejected() {
        let args = Args::try_parse_from(["scatterview", "colors", "--width", "0"]).unwrap();
        let Command::Colors { figure, .. } = args.command else {
            panic!("expected colors command");
        };
        assert!(figure
            .plot_options(PlotOptions::color_comparison())
            .is_err());
    }

    #[test]
    fn test_missing_subcommand() {
        assert!(Args::try_parse_from(["scatterview"]).is_err());
    }
}
