//! Seed points and the distance metrics between them.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{Result, VoronoiError};

/// Integer pixel position
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point
    pub fn dist_sq(&self, other: &Point) -> i64 {
        squared_euclidean_distance(*self, *other)
    }

    /// Manhattan (taxicab) distance to another point
    pub fn dist_manhattan(&self, other: &Point) -> i64 {
        manhattan_distance(*self, *other)
    }
}

/// `(p1.x - p2.x)^2 + (p1.y - p2.y)^2`, widened to 64 bits.
pub fn squared_euclidean_distance(p1: Point, p2: Point) -> i64 {
    let dx = p1.x as i64 - p2.x as i64;
    let dy = p1.y as i64 - p2.y as i64;
    dx * dx + dy * dy
}

/// `|p1.x - p2.x| + |p1.y - p2.y|`, widened to 64 bits.
pub fn manhattan_distance(p1: Point, p2: Point) -> i64 {
    let dx = p1.x as i64 - p2.x as i64;
    let dy = p1.y as i64 - p2.y as i64;
    dx.abs() + dy.abs()
}

/// Draw `count` points with `x` in `[0, width)` and `y` in `[0, height)`.
///
/// Positions are not deduplicated; coincident seeds are legal and the
/// lower index wins every pixel they share.
pub fn generate_seeds<R: Rng>(
    count: usize,
    width: u32,
    height: u32,
    rng: &mut R,
) -> Result<Vec<Point>> {
    if width == 0 || height == 0 {
        return Err(VoronoiError::EmptyCanvas);
    }
    Ok((0..count)
        .map(|_| {
            Point::new(
                rng.gen_range(0..width) as i32,
                rng.gen_range(0..height) as i32,
            )
        })
        .collect())
}

/// Ordered, immutable set of seeds. Index decides palette color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedSet {
    seeds: Vec<Point>,
}

impl SeedSet {
    pub fn new(seeds: Vec<Point>) -> Self {
        Self { seeds }
    }

    /// Create seeds at random positions from a seeded RNG (reproducible)
    pub fn random(count: usize, width: u32, height: u32, seed: u64) -> Result<Self> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        generate_seeds(count, width, height, &mut rng).map(Self::new)
    }

    pub fn len(&self) -> usize {
        self.seeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seeds.is_empty()
    }

    pub fn points(&self) -> &[Point] {
        &self.seeds
    }
}

impl AsRef<[Point]> for SeedSet {
    fn as_ref(&self) -> &[Point] {
        &self.seeds
    }
}
