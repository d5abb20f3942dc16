//! scatterview: 3D scatter plots of precomputed image-segmentation and
//! k-means results.
//!
//! Inputs are whitespace-delimited numeric tables written by external tools;
//! this crate only loads them and renders figures with Plotters.

pub mod cli;
pub mod data;
pub mod error;
pub mod viz;

// Re-export public items for easier access
pub use cli::{Args, Command};
pub use data::{load_table, parse_table, Centroids, ClusterPoints, ColorSample, ColorSamples, Table};
pub use error::TableError;
pub use viz::{plot_clusters, plot_color_comparison, PlotOptions, ViewAngle};

/// Common result type used throughout the application
pub type Result<T> = anyhow::Result<T>;
