//! Seed markers drawn over a finished diagram.

use crate::{Canvas, Color, Point};

pub const SEED_MARKER_RADIUS: i32 = 5;
pub const SEED_MARKER_COLOR: Color = Color::BLACK;

/// Stamp a filled black disc at each seed. Draw this after rasterizing;
/// stamping the same seeds twice leaves the canvas unchanged.
pub fn render_seed_markers(canvas: &mut Canvas, seeds: &[Point]) {
    for &seed in seeds {
        canvas.stamp_circle(seed, SEED_MARKER_RADIUS, SEED_MARKER_COLOR);
    }
}
