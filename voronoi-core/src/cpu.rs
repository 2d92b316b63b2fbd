//! CPU rasterizers. Rows are processed in parallel with Rayon when the
//! `parallel` feature is enabled.

use log::debug;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::voronoi::{Metric, Rasterizer};
use crate::{squared_euclidean_distance, Canvas, Color, PackedPoint, Point, Result, VoronoiError};

fn validate(seeds: &[Point], palette: &[Color]) -> Result<()> {
    if seeds.is_empty() {
        return Err(VoronoiError::NoSeeds);
    }
    if palette.is_empty() {
        return Err(VoronoiError::EmptyPalette);
    }
    Ok(())
}

/// Run `f(y, row)` over every row of a row-major buffer
fn for_each_row<F>(pixels: &mut [Color], width: usize, f: F)
where
    F: Fn(usize, &mut [Color]) + Sync + Send,
{
    if width == 0 {
        return;
    }
    #[cfg(feature = "parallel")]
    pixels
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| f(y, row));

    #[cfg(not(feature = "parallel"))]
    pixels
        .chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| f(y, row));
}

/// Index of the nearest seed; strict `<` keeps the first of equal candidates.
#[inline]
fn nearest_seed(p: Point, seeds: &[Point], metric: Metric) -> usize {
    let mut nearest = 0;
    let mut min_dist = metric.distance(seeds[0], p);
    for (i, &seed) in seeds.iter().enumerate().skip(1) {
        let dist = metric.distance(seed, p);
        if dist < min_dist {
            min_dist = dist;
            nearest = i;
        }
    }
    nearest
}

/// Direct scan: every pixel checks every seed.
#[derive(Debug, Clone, Copy)]
pub struct NearestSeedBackend {
    pub metric: Metric,
}

impl NearestSeedBackend {
    pub fn new(metric: Metric) -> Self {
        Self { metric }
    }
}

impl Rasterizer for NearestSeedBackend {
    fn rasterize(&mut self, canvas: &mut Canvas, seeds: &[Point], palette: &[Color]) -> Result<()> {
        validate(seeds, palette)?;
        debug!(
            "{:?} pass: {} seeds over {}x{}",
            self.metric,
            seeds.len(),
            canvas.width(),
            canvas.height()
        );
        let width = canvas.width() as usize;
        let metric = self.metric;
        for_each_row(canvas.pixels_mut(), width, |y, row| {
            for (x, px) in row.iter_mut().enumerate() {
                let nearest = nearest_seed(Point::new(x as i32, y as i32), seeds, metric);
                *px = palette[nearest % palette.len()];
            }
        });
        Ok(())
    }
}

/// Incremental relaxation against a depth buffer.
///
/// Seeds are applied one at a time in index order; a pixel takes seed `i`
/// only when its squared distance to `i` is strictly below the best found so
/// far. Output is pixel-identical to `NearestSeedBackend` with
/// `Metric::Euclidean`.
#[derive(Debug, Default)]
pub struct IncrementalBackend {
    /// Per-pixel best squared distance; reset to `i64::MAX` on every pass
    depth: Vec<i64>,
}

impl IncrementalBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn apply_seed(canvas: &mut Canvas, depth: &mut [i64], seed: Point, color: Color) {
        let width = canvas.width() as usize;
        if width == 0 {
            return;
        }
        let relax_row = |y: usize, row: &mut [Color], depth_row: &mut [i64]| {
            for (x, (px, best)) in row.iter_mut().zip(depth_row.iter_mut()).enumerate() {
                let dist = squared_euclidean_distance(seed, Point::new(x as i32, y as i32));
                if dist < *best {
                    *best = dist;
                    *px = color;
                }
            }
        };

        #[cfg(feature = "parallel")]
        canvas
            .pixels_mut()
            .par_chunks_mut(width)
            .zip(depth.par_chunks_mut(width))
            .enumerate()
            .for_each(|(y, (row, depth_row))| relax_row(y, row, depth_row));

        #[cfg(not(feature = "parallel"))]
        canvas
            .pixels_mut()
            .chunks_mut(width)
            .zip(depth.chunks_mut(width))
            .enumerate()
            .for_each(|(y, (row, depth_row))| relax_row(y, row, depth_row));
    }
}

impl Rasterizer for IncrementalBackend {
    fn rasterize(&mut self, canvas: &mut Canvas, seeds: &[Point], palette: &[Color]) -> Result<()> {
        validate(seeds, palette)?;
        debug!(
            "incremental pass: {} seeds over {}x{}",
            seeds.len(),
            canvas.width(),
            canvas.height()
        );
        self.depth.clear();
        self.depth.resize(canvas.pixels().len(), i64::MAX);

        // Seed order is the tie-break; this loop must stay sequential.
        for (i, &seed) in seeds.iter().enumerate() {
            Self::apply_seed(canvas, &mut self.depth, seed, palette[i % palette.len()]);
        }
        Ok(())
    }
}

/// Nearest seed by squared Euclidean distance, scanning all seeds per pixel.
pub fn render_voronoi_euclidean(
    canvas: &mut Canvas,
    seeds: &[Point],
    palette: &[Color],
) -> Result<()> {
    NearestSeedBackend::new(Metric::Euclidean).rasterize(canvas, seeds, palette)
}

/// Nearest seed by Manhattan distance, scanning all seeds per pixel.
pub fn render_voronoi_manhattan(
    canvas: &mut Canvas,
    seeds: &[Point],
    palette: &[Color],
) -> Result<()> {
    NearestSeedBackend::new(Metric::Manhattan).rasterize(canvas, seeds, palette)
}

/// Nearest seed by squared Euclidean distance, via depth-buffer relaxation.
pub fn render_voronoi_interesting(
    canvas: &mut Canvas,
    seeds: &[Point],
    palette: &[Color],
) -> Result<()> {
    IncrementalBackend::new().rasterize(canvas, seeds, palette)
}

/// Fill every pixel with the packed encoding of its own coordinate.
///
/// Fails with `VoronoiError::Range` if the canvas is too large for the
/// 16-bit encoding.
pub fn render_point_gradient(canvas: &mut Canvas) -> Result<()> {
    let (w, h) = (canvas.width(), canvas.height());
    if w == 0 || h == 0 {
        return Ok(());
    }
    let far = |v: u32| i32::try_from(v - 1).unwrap_or(i32::MAX);
    PackedPoint::from_point(Point::new(far(w), far(h)))?;

    for_each_row(canvas.pixels_mut(), w as usize, |y, row| {
        for (x, px) in row.iter_mut().enumerate() {
            *px = PackedPoint { x: x as u16, y: y as u16 }.to_color();
        }
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    const RED: Color = Color::RED;
    const BLUE: Color = Color::BLUE;

    fn render(
        f: fn(&mut Canvas, &[Point], &[Color]) -> Result<()>,
        w: u32,
        h: u32,
        seeds: &[Point],
        palette: &[Color],
    ) -> Canvas {
        let mut canvas = Canvas::new(w, h);
        f(&mut canvas, seeds, palette).unwrap();
        canvas
    }

    /// Reference assignment computed independently of the backends
    fn brute_force(w: u32, h: u32, seeds: &[Point], palette: &[Color], metric: Metric) -> Canvas {
        let mut canvas = Canvas::new(w, h);
        for y in 0..h {
            for x in 0..w {
                let p = Point::new(x as i32, y as i32);
                let dists: Vec<i64> = seeds.iter().map(|&s| metric.distance(s, p)).collect();
                let min = *dists.iter().min().unwrap();
                let first = dists.iter().position(|&d| d == min).unwrap();
                canvas.set(x, y, palette[first % palette.len()]);
            }
        }
        canvas
    }

    #[test]
    fn test_euclidean_matches_incremental_small() {
        let seeds = [Point::new(0, 0), Point::new(7, 7)];
        let palette = [RED, BLUE];
        let direct = render(render_voronoi_euclidean, 8, 8, &seeds, &palette);
        let incremental = render(render_voronoi_interesting, 8, 8, &seeds, &palette);
        assert_eq!(direct, incremental);
        assert_eq!(direct.get(0, 0), Some(RED));
        assert_eq!(direct.get(7, 7), Some(BLUE));
        // Anti-diagonal is equidistant and goes to seed 0
        assert_eq!(direct.get(7, 0), Some(RED));
        assert_eq!(direct.get(0, 7), Some(RED));
    }

    #[test]
    fn test_euclidean_matches_incremental_random() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        for _ in 0..10 {
            let n = rng.gen_range(1..20);
            let seeds = crate::generate_seeds(n, 64, 40, &mut rng).unwrap();
            let palette = &crate::palette::CYBERPUNK[..rng.gen_range(1..10)];
            let direct = render(render_voronoi_euclidean, 64, 40, &seeds, palette);
            let incremental = render(render_voronoi_interesting, 64, 40, &seeds, palette);
            assert_eq!(direct, incremental);
            assert_eq!(direct, brute_force(64, 40, &seeds, palette, Metric::Euclidean));
        }
    }

    #[test]
    fn test_tie_goes_to_first_seed() {
        // (2, 0) is 2 away from both seeds under either metric
        let seeds = [Point::new(0, 0), Point::new(4, 0)];
        let palette = [RED, BLUE];
        for f in [
            render_voronoi_euclidean as fn(&mut Canvas, &[Point], &[Color]) -> Result<()>,
            render_voronoi_manhattan,
            render_voronoi_interesting,
        ] {
            let canvas = render(f, 5, 1, &seeds, &palette);
            assert_eq!(canvas.get(2, 0), Some(RED));
            assert_eq!(canvas.get(3, 0), Some(BLUE));
        }
    }

    #[test]
    fn test_manhattan_diagonal_scenario() {
        let seeds = [Point::new(0, 0), Point::new(4, 4)];
        let palette = [RED, BLUE];
        let canvas = render(render_voronoi_manhattan, 5, 5, &seeds, &palette);
        assert_eq!(canvas.get(2, 2), Some(RED));
        assert_eq!(canvas.get(1, 1), Some(RED));
        assert_eq!(canvas.get(3, 3), Some(BLUE));
        assert_eq!(canvas, brute_force(5, 5, &seeds, &palette, Metric::Manhattan));
    }

    #[test]
    fn test_manhattan_differs_from_euclidean() {
        let seeds = [Point::new(2, 2), Point::new(9, 6)];
        let palette = [RED, BLUE];
        let e = render(render_voronoi_euclidean, 12, 12, &seeds, &palette);
        let m = render(render_voronoi_manhattan, 12, 12, &seeds, &palette);
        assert_ne!(e, m);
        assert_eq!(m, brute_force(12, 12, &seeds, &palette, Metric::Manhattan));
    }

    #[test]
    fn test_palette_wraps() {
        let seeds = [Point::new(0, 0), Point::new(5, 0), Point::new(10, 0)];
        let palette = [RED, BLUE];
        let canvas = render(render_voronoi_interesting, 11, 1, &seeds, &palette);
        assert_eq!(canvas.get(10, 0), Some(RED));
        assert_eq!(canvas.get(5, 0), Some(BLUE));

        let single = render(render_voronoi_euclidean, 11, 1, &seeds, &[Color::GREEN]);
        assert!(single.pixels().iter().all(|&c| c == Color::GREEN));
    }

    #[test]
    fn test_duplicate_seeds_lower_index_wins() {
        let seeds = [Point::new(3, 3), Point::new(3, 3)];
        let palette = [RED, BLUE];
        for f in [
            render_voronoi_euclidean as fn(&mut Canvas, &[Point], &[Color]) -> Result<()>,
            render_voronoi_manhattan,
            render_voronoi_interesting,
        ] {
            let canvas = render(f, 6, 6, &seeds, &palette);
            assert!(canvas.pixels().iter().all(|&c| c == RED));
        }
    }

    #[test]
    fn test_full_overwrite() {
        let seeds = [Point::new(1, 1)];
        let mut canvas = Canvas::filled(4, 4, Color::BACKGROUND);
        render_voronoi_interesting(&mut canvas, &seeds, &[BLUE]).unwrap();
        assert!(canvas.pixels().iter().all(|&c| c == BLUE));
    }

    #[test]
    fn test_backend_reuse_resets_depth() {
        let mut backend = IncrementalBackend::new();
        let palette = [RED, BLUE];
        let mut first = Canvas::new(6, 6);
        backend
            .rasterize(&mut first, &[Point::new(0, 0), Point::new(5, 5)], &palette)
            .unwrap();
        let mut second = Canvas::new(6, 6);
        backend
            .rasterize(&mut second, &[Point::new(5, 5), Point::new(0, 0)], &palette)
            .unwrap();
        assert_eq!(second.get(5, 5), Some(RED));
        assert_eq!(second.get(0, 0), Some(BLUE));
    }

    #[test]
    fn test_empty_inputs_rejected() {
        let mut canvas = Canvas::new(4, 4);
        assert!(matches!(
            render_voronoi_euclidean(&mut canvas, &[], &[RED]),
            Err(VoronoiError::NoSeeds)
        ));
        assert!(matches!(
            render_voronoi_interesting(&mut canvas, &[Point::new(0, 0)], &[]),
            Err(VoronoiError::EmptyPalette)
        ));
    }

    #[test]
    fn test_point_gradient() {
        let mut canvas = Canvas::new(5, 3);
        render_point_gradient(&mut canvas).unwrap();
        for y in 0..3 {
            for x in 0..5 {
                let p = PackedPoint::from_color(canvas.get(x, y).unwrap()).to_point();
                assert_eq!(p, Point::new(x as i32, y as i32));
            }
        }
    }

    #[test]
    fn test_point_gradient_too_wide() {
        let mut canvas = Canvas::new(65536, 1);
        assert!(matches!(
            render_point_gradient(&mut canvas),
            Err(VoronoiError::Range { x: 65535, y: 0 })
        ));
    }
}
