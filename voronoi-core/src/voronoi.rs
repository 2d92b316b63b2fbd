//! Rasterizer trait and render-mode dispatch.

use std::fmt;
use std::str::FromStr;

use crate::cpu::{IncrementalBackend, NearestSeedBackend};
use crate::{render_point_gradient, Canvas, Color, Point, Result};

/// Distance metric for the direct nearest-seed scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Euclidean,
    Manhattan,
}

impl Metric {
    #[inline]
    pub fn distance(self, a: Point, b: Point) -> i64 {
        match self {
            Metric::Euclidean => crate::squared_euclidean_distance(a, b),
            Metric::Manhattan => crate::manhattan_distance(a, b),
        }
    }
}

/// Trait for Voronoi rasterization backends
pub trait Rasterizer {
    /// Color `canvas` by nearest seed. Pixel color is
    /// `palette[seed_index % palette.len()]`; ties go to the lower index.
    fn rasterize(&mut self, canvas: &mut Canvas, seeds: &[Point], palette: &[Color]) -> Result<()>;
}

/// What to draw on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Euclidean,
    Manhattan,
    /// Depth-buffer relaxation, one seed at a time
    Incremental,
    /// Every pixel shows its own packed coordinate; seeds and palette unused
    Gradient,
}

impl RenderMode {
    /// Whether seed markers are drawn by default in this mode
    pub fn default_markers(self) -> bool {
        matches!(self, RenderMode::Incremental)
    }

    /// Gradient output holds packed coordinates, which markers must not mix with
    pub fn supports_markers(self) -> bool {
        !matches!(self, RenderMode::Gradient)
    }
}

impl FromStr for RenderMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "euclidean" => Ok(RenderMode::Euclidean),
            "manhattan" => Ok(RenderMode::Manhattan),
            "interesting" | "incremental" => Ok(RenderMode::Incremental),
            "gradient" => Ok(RenderMode::Gradient),
            other => Err(format!(
                "unknown render mode '{}' (expected euclidean, manhattan, interesting or gradient)",
                other
            )),
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RenderMode::Euclidean => "euclidean",
            RenderMode::Manhattan => "manhattan",
            RenderMode::Incremental => "interesting",
            RenderMode::Gradient => "gradient",
        };
        f.write_str(name)
    }
}

/// High-level renderer that picks a backend for a [`RenderMode`]
pub struct VoronoiRenderer {
    mode: RenderMode,
    backend: Option<Box<dyn Rasterizer>>,
}

impl VoronoiRenderer {
    pub fn new(mode: RenderMode) -> Self {
        let backend: Option<Box<dyn Rasterizer>> = match mode {
            RenderMode::Euclidean => Some(Box::new(NearestSeedBackend::new(Metric::Euclidean))),
            RenderMode::Manhattan => Some(Box::new(NearestSeedBackend::new(Metric::Manhattan))),
            RenderMode::Incremental => Some(Box::new(IncrementalBackend::new())),
            RenderMode::Gradient => None,
        };
        Self { mode, backend }
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn render(
        &mut self,
        canvas: &mut Canvas,
        seeds: &[Point],
        palette: &[Color],
    ) -> Result<()> {
        match self.backend.as_mut() {
            Some(backend) => backend.rasterize(canvas, seeds, palette),
            None => render_point_gradient(canvas),
        }
    }
}
