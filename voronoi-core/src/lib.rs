//! Core Voronoi rasterization library.
//!
//! Fills a fixed-size canvas with Voronoi cells around a set of seed points,
//! using either a direct nearest-seed scan (Euclidean or Manhattan) or an
//! incremental depth-buffer relaxation, and writes the result as a binary
//! pixel map.

mod canvas;
mod color;
mod cpu;
mod markers;
mod ppm;
mod site;
mod voronoi;

pub use canvas::{Canvas, PixelSource, ShiftedView};
pub use color::{palette, Color, PackedPoint, Rgb};
pub use cpu::{
    render_point_gradient, render_voronoi_euclidean, render_voronoi_interesting,
    render_voronoi_manhattan, IncrementalBackend, NearestSeedBackend,
};
pub use markers::{render_seed_markers, SEED_MARKER_COLOR, SEED_MARKER_RADIUS};
pub use ppm::{encode_rgb, save_ppm, write_ppm};
pub use site::{generate_seeds, manhattan_distance, squared_euclidean_distance, Point, SeedSet};
pub use voronoi::{Metric, Rasterizer, RenderMode, VoronoiRenderer};

use std::path::PathBuf;

/// Error type for Voronoi operations
#[derive(Debug, thiserror::Error)]
pub enum VoronoiError {
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Coordinate ({x}, {y}) cannot be packed into 16 bits")]
    Range { x: i32, y: i32 },

    #[error("No seeds provided")]
    NoSeeds,

    #[error("Palette is empty")]
    EmptyPalette,

    #[error("Canvas has zero area")]
    EmptyCanvas,

    #[error("could not write file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, VoronoiError>;
