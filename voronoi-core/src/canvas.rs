//! Owned pixel buffer and read-only views over it.

use std::path::Path;

use crate::{Color, Point, Result};

/// Row-major grid of packed colors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl Canvas {
    /// Create a canvas with every pixel set to `Color::default()` (all zero bits)
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Color::default())
    }

    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Color] {
        &mut self.pixels
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Returns `None` outside the canvas
    pub fn get(&self, x: u32, y: u32) -> Option<Color> {
        if x < self.width && y < self.height {
            Some(self.pixels[self.index(x, y)])
        } else {
            None
        }
    }

    /// Silently ignores out-of-bounds coordinates.
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        if x < self.width && y < self.height {
            let idx = self.index(x, y);
            self.pixels[idx] = color;
        }
    }

    pub fn fill(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    /// Paint every pixel with `dx² + dy² <= radius²` around `center`,
    /// clipped to the canvas.
    pub fn stamp_circle(&mut self, center: Point, radius: i32, color: Color) {
        if radius < 0 {
            return;
        }
        let r_sq = radius as i64 * radius as i64;
        let x0 = (center.x as i64 - radius as i64).max(0);
        let y0 = (center.y as i64 - radius as i64).max(0);
        let x1 = (center.x as i64 + radius as i64).min(self.width as i64 - 1);
        let y1 = (center.y as i64 + radius as i64).min(self.height as i64 - 1);

        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x - center.x as i64;
                let dy = y - center.y as i64;
                if dx * dx + dy * dy <= r_sq {
                    let idx = self.index(x as u32, y as u32);
                    self.pixels[idx] = color;
                }
            }
        }
    }

    /// View of this canvas scrolled by `(dx, dy)`, wrapping at the edges:
    /// pixel `(x, y)` of the view is `((x + dx) mod width, (y + dy) mod height)`.
    pub fn shifted(&self, dx: u32, dy: u32) -> ShiftedView<'_> {
        ShiftedView { canvas: self, dx, dy }
    }

    /// Render to an image::RgbImage (alpha is dropped)
    pub fn to_image(&self) -> image::RgbImage {
        let mut image = image::RgbImage::new(self.width, self.height);
        for (dst, src) in image.pixels_mut().zip(self.pixels.iter()) {
            *dst = image::Rgb(src.to_rgb());
        }
        image
    }

    /// Encode as PNG through the `image` crate (alpha is dropped)
    pub fn save_png(&self, path: &Path) -> Result<()> {
        self.to_image().save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }
}

/// Read-only pixel access shared by the canvas and its views.
pub trait PixelSource {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Caller guarantees `x < width()` and `y < height()`.
    fn pixel(&self, x: u32, y: u32) -> Color;
}

impl PixelSource for Canvas {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn pixel(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }
}

/// Cyclically shifted view produced by [`Canvas::shifted`].
#[derive(Debug, Clone, Copy)]
pub struct ShiftedView<'a> {
    canvas: &'a Canvas,
    dx: u32,
    dy: u32,
}

impl PixelSource for ShiftedView<'_> {
    fn width(&self) -> u32 {
        self.canvas.width
    }

    fn height(&self) -> u32 {
        self.canvas.height
    }

    fn pixel(&self, x: u32, y: u32) -> Color {
        let sx = ((x as u64 + self.dx as u64) % self.canvas.width as u64) as u32;
        let sy = ((y as u64 + self.dy as u64) % self.canvas.height as u64) as u32;
        self.canvas.pixel(sx, sy)
    }
}
